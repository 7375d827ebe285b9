//! Werewolf session server using the async actor model.
//!
//! Spawns one session actor per game behind an HTTP/WebSocket API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use wg_server::{api, config::ServerConfig, logging};
use wolfgame::session::SessionManager;

const HELP: &str = "\
Run a werewolf session server

USAGE:
  wg_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --sessions   N           Number of sessions to create on startup  [default: env INITIAL_SESSIONS or 1]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                  Server bind address (e.g., 0.0.0.0:8080)
  INITIAL_SESSIONS             Sessions created on startup
  SESSION_PLAYER_COUNT         Seats per session [default: 12]
  SESSION_PHASE_TIMEOUT_SECS   Phase deadline, 0 disables [default: 120]
  SESSION_SINGLE_USE_POTIONS   Witch potions usable once per game [default: true]
  RUST_LOG                     Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let num_sessions: Option<usize> = pargs.opt_value_from_str("--sessions")?;

    logging::init();

    let config = ServerConfig::from_env(bind, num_sessions)?;
    config.validate()?;
    info!("Starting werewolf server at {}", config.bind);

    let session_manager = Arc::new(SessionManager::in_memory());

    info!("Creating {} initial session(s)...", config.num_sessions);
    for i in 0..config.num_sessions {
        let session_config = config
            .session_defaults
            .session_config(&format!("Village {}", i + 1), None);

        match session_manager.create_session(session_config).await {
            Ok(handle) => {
                info!("Created session {} with ID {}", i + 1, handle.session_id());
            }
            Err(e) => {
                log::error!("Failed to create session {}: {}", i + 1, e);
            }
        }
    }

    for session in session_manager.list_sessions().await {
        info!(
            "  - {} (ID: {}) - {} seats, {}",
            session.name, session.session_id, session.player_count, session.phase
        );
    }

    let api_state = api::AppState {
        session_manager,
        session_defaults: config.session_defaults.clone(),
    };
    let app = api::create_router(api_state);

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
