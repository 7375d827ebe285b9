//! WebSocket handler for live session updates.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/{session_id}`
//! 2. Server subscribes the connection to the session actor
//! 3. A send task pushes every snapshot the actor broadcasts, plus
//!    responses to client commands
//! 4. On disconnect the subscription is dropped
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws/SESSION_ID');
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.type === "snapshot") {
//!     render(data.snapshot);
//!   }
//! };
//!
//! ws.send(JSON.stringify({
//!   type: "action",
//!   player_id: "p8",
//!   action: "check",
//!   target_id: "p3"
//! }));
//! ```

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wolfgame::{
    Action, ActionType, PlayerId, SessionSnapshot,
    session::{SessionError, SessionHandle, SessionResult},
};

use super::{AppState, sessions::error_response};

const FEED_BUFFER: usize = 32;

/// Client messages received via WebSocket
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit an action for a seat
    Action {
        player_id: PlayerId,
        action: ActionType,
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    /// Hand the policeman badge on
    Transfer {
        from: PlayerId,
        #[serde(default)]
        to: Option<PlayerId>,
    },
    /// Ask for the current snapshot
    Snapshot,
}

/// Messages sent to the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Snapshot { snapshot: SessionSnapshot },
    Error { message: String },
}

/// Upgrade HTTP connection to WebSocket for a session feed.
///
/// Returns `404 Not Found` before upgrading if the session doesn't exist.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Response {
    let handle = match state.session_manager.get_session(session_id).await {
        Some(handle) => handle,
        None => {
            return error_response(SessionError::SessionNotFound(session_id)).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, handle))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, handle: SessionHandle) {
    let session_id = handle.session_id();
    let subscriber_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    let mut feed = match handle.subscribe(subscriber_id, FEED_BUFFER).await {
        Ok(feed) => feed,
        Err(e) => {
            error!("Failed to subscribe to session {}: {}", session_id, e);
            return;
        }
    };
    info!(
        "WebSocket connected: session={}, subscriber={}",
        session_id, subscriber_id
    );

    let (response_tx, mut response_rx) = tokio::sync::mpsc::channel::<ServerMessage>(FEED_BUFFER);

    let send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                Some(snapshot) = feed.recv() => ServerMessage::Snapshot { snapshot },
                Some(response) = response_rx.recv() => response,
                else => break,
            };

            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => handle_client_message(client_msg, &handle).await,
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        Some(ServerMessage::Error {
                            message: "Invalid message format".to_string(),
                        })
                    }
                };

                if let Some(response) = response
                    && response_tx.send(response).await.is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: session={}", session_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    let _ = handle.unsubscribe(subscriber_id).await;

    info!(
        "WebSocket disconnected: session={}, subscriber={}",
        session_id, subscriber_id
    );
}

/// Process a client command. Successful changes reach the client through
/// the actor's broadcast, so only errors and explicit snapshot requests get
/// a direct response.
async fn handle_client_message(
    msg: ClientMessage,
    handle: &SessionHandle,
) -> Option<ServerMessage> {
    let result: SessionResult<SessionSnapshot> = match msg {
        ClientMessage::Action {
            player_id,
            action,
            target_id,
        } => handle.submit(Action::new(player_id, action, target_id)).await,
        ClientMessage::Transfer { from, to } => handle.transfer_policeman(from, to).await,
        ClientMessage::Snapshot => {
            return Some(match handle.snapshot().await {
                Ok(snapshot) => ServerMessage::Snapshot { snapshot },
                Err(e) => ServerMessage::Error {
                    message: e.client_message(),
                },
            });
        }
    };

    result.err().map(|e| ServerMessage::Error {
        message: e.client_message(),
    })
}
