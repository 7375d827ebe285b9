//! Session management API handlers.
//!
//! Every handler forwards to the session's actor through its
//! [`SessionHandle`] and returns the resulting snapshot.
//!
//! # Examples
//!
//! Create and start a session:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/sessions \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Hamlet", "player_count": 8}'
//! curl -X POST http://localhost:6969/api/v1/sessions/SESSION_ID/start
//! ```
//!
//! Submit an action:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/sessions/SESSION_ID/actions \
//!   -H "Content-Type: application/json" \
//!   -d '{"player_id": "p0", "action": "kill", "target_id": "p5"}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wolfgame::{
    Action, ActionType, GameError, PlayerId, SessionSnapshot,
    session::{SessionError, SessionHandle, SessionMetadata},
};

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub player_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitActionRequest {
    pub player_id: PlayerId,
    pub action: ActionType,
    #[serde(default)]
    pub target_id: Option<PlayerId>,
}

impl From<SubmitActionRequest> for Action {
    fn from(request: SubmitActionRequest) -> Self {
        Action::new(request.player_id, request.action, request.target_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from: PlayerId,
    /// `None` retires the badge
    #[serde(default)]
    pub to: Option<PlayerId>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Map a session error onto a status code and a client-safe message.
pub fn error_response(err: SessionError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        SessionError::Game(GameError::GameOver) => StatusCode::CONFLICT,
        SessionError::Game(GameError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        SessionError::Game(_) | SessionError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        SessionError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::SessionClosed => StatusCode::GONE,
        SessionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        log::error!("Session request failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}

async fn session_handle(
    state: &AppState,
    session_id: Uuid,
) -> Result<SessionHandle, (StatusCode, Json<ErrorResponse>)> {
    state
        .session_manager
        .get_session(session_id)
        .await
        .ok_or_else(|| error_response(SessionError::SessionNotFound(session_id)))
}

/// Create a session from the server defaults.
///
/// # Response
///
/// Returns `201 Created` with the new session's metadata.
///
/// # Errors
///
/// - `400 Bad Request`: Name or seat count rejected
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionMetadata>), (StatusCode, Json<ErrorResponse>)> {
    let count = state.session_manager.session_count().await;
    let name = request
        .name
        .unwrap_or_else(|| format!("Village {}", count + 1));
    let config = state
        .session_defaults
        .session_config(&name, request.player_count);

    let handle = state
        .session_manager
        .create_session(config)
        .await
        .map_err(error_response)?;
    let metadata = handle.metadata().await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(metadata)))
}

/// List all live sessions.
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionMetadata>> {
    Json(state.session_manager.list_sessions().await)
}

/// Get the current snapshot of a session.
///
/// # Errors
///
/// - `404 Not Found`: Session doesn't exist
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let handle = session_handle(&state, session_id).await?;
    handle.snapshot().await.map(Json).map_err(error_response)
}

/// Deal roles and open the first night.
///
/// # Errors
///
/// - `404 Not Found`: Session doesn't exist
/// - `409 Conflict`: Already started or over
pub async fn start_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let handle = session_handle(&state, session_id).await?;
    handle.start().await.map(Json).map_err(error_response)
}

/// Submit a player action.
///
/// # Errors
///
/// - `400 Bad Request`: The action was rejected; the body carries the reason
/// - `404 Not Found`: Session doesn't exist
pub async fn submit_action(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SubmitActionRequest>,
) -> ApiResult<SessionSnapshot> {
    let handle = session_handle(&state, session_id).await?;
    handle
        .submit(request.into())
        .await
        .map(Json)
        .map_err(error_response)
}

/// Hand the policeman badge to another living player or retire it.
pub async fn transfer_policeman(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<TransferRequest>,
) -> ApiResult<SessionSnapshot> {
    let handle = session_handle(&state, session_id).await?;
    handle
        .transfer_policeman(request.from, request.to)
        .await
        .map(Json)
        .map_err(error_response)
}

/// End the game now. Ending a finished game is a no-op.
pub async fn force_game_over(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let handle = session_handle(&state, session_id).await?;
    handle.force_game_over().await.map(Json).map_err(error_response)
}
