//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; the subscriber installed
//! here forwards those records alongside `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from the `RUST_LOG` env var and default to `info`.
///
/// # Example
///
/// ```no_run
/// use wg_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log API request/response
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path` - Request path
/// * `status_code` - Response status code
/// * `session_id` - Session the request targeted, if any
pub fn log_api_request(method: &str, path: &str, status_code: u16, session_id: Option<&str>) {
    if status_code >= 500 {
        tracing::error!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            session_id = session_id,
            "API request failed"
        );
    } else {
        tracing::debug!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            session_id = session_id,
            "API request completed"
        );
    }
}
