//! Store error types.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend refused or failed the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Stored record belongs to a different session
    #[error("Record mismatch: expected session {expected}, found {found}")]
    Mismatch { expected: Uuid, found: Uuid },
}

impl StoreError {
    /// A message safe to show to clients.
    pub fn client_message(&self) -> String {
        match self {
            StoreError::Serialization(_) | StoreError::Mismatch { .. } => {
                "Internal server error".to_string()
            }
            StoreError::Unavailable(_) => "Storage temporarily unavailable".to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
