//! Session error types.

use thiserror::Error;
use uuid::Uuid;

use crate::{game::GameError, store::StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    /// Rejected by the game rules
    #[error(transparent)]
    Game(#[from] GameError),

    /// No live or stored session with this id
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    /// The session actor has stopped
    #[error("Session is closed")]
    SessionClosed,

    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// A message safe to show to clients.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::SessionNotFound(_) => "Session not found".to_string(),
            SessionError::Store(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
