//! HTTP/WebSocket API for the werewolf server.
//!
//! # Modules
//!
//! - [`sessions`]: Session management (create, list, start, act, transfer, end)
//! - [`websocket`]: Live snapshot feed that also accepts actions
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                            - Health check
//! POST /api/v1/sessions                   - Create session
//! GET  /api/v1/sessions                   - List sessions
//! GET  /api/v1/sessions/{id}              - Current snapshot
//! POST /api/v1/sessions/{id}/start        - Deal roles and open night one
//! POST /api/v1/sessions/{id}/actions      - Submit an action
//! POST /api/v1/sessions/{id}/transfer     - Hand the policeman badge on
//! POST /api/v1/sessions/{id}/game-over    - End the game
//! GET  /ws/{id}                           - WebSocket feed
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wg_server::{api::{AppState, create_router}, config::SessionDefaultsConfig};
//! use wolfgame::session::SessionManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState {
//!     session_manager: Arc::new(SessionManager::in_memory()),
//!     session_defaults: SessionDefaultsConfig::default(),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod sessions;
pub mod websocket;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use wolfgame::session::SessionManager;

use crate::{config::SessionDefaultsConfig, logging};

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub session_manager: Arc<SessionManager>,
    pub session_defaults: SessionDefaultsConfig,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router();

    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws/{session_id}", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/sessions/{session_id}", get(sessions::get_session))
        .route("/sessions/{session_id}/start", post(sessions::start_session))
        .route("/sessions/{session_id}/actions", post(sessions::submit_action))
        .route(
            "/sessions/{session_id}/transfer",
            post(sessions::transfer_policeman),
        )
        .route(
            "/sessions/{session_id}/game-over",
            post(sessions::force_game_over),
        )
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let session_id = path
        .strip_prefix("/api/v1/sessions/")
        .or_else(|| path.strip_prefix("/ws/"))
        .and_then(|rest| rest.split('/').next());
    logging::log_api_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        session_id,
    );
    response
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","sessions":1,"timestamp":"2026-10-17T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let session_count = state.session_manager.session_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": session_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
