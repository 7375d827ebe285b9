//! Session actor message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::game::{Action, GameError, Phase, PlayerId, SessionSnapshot};

pub type SessionReply = Result<SessionSnapshot, GameError>;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Deal roles and open the first night
    Start {
        response: oneshot::Sender<SessionReply>,
    },

    /// Player action
    SubmitAction {
        action: Action,
        response: oneshot::Sender<SessionReply>,
    },

    /// Hand the policeman badge on (or retire it)
    TransferPoliceman {
        from: PlayerId,
        to: Option<PlayerId>,
        response: oneshot::Sender<SessionReply>,
    },

    /// End the game immediately
    ForceGameOver {
        response: oneshot::Sender<SessionSnapshot>,
    },

    /// Resolve the open phase now with default actions
    ExpirePhase {
        response: oneshot::Sender<SessionSnapshot>,
    },

    GetSnapshot {
        response: oneshot::Sender<SessionSnapshot>,
    },

    GetMetadata {
        response: oneshot::Sender<SessionMetadata>,
    },

    /// Receive a snapshot after every change
    Subscribe {
        subscriber_id: Uuid,
        sender: mpsc::Sender<SessionSnapshot>,
    },

    Unsubscribe {
        subscriber_id: Uuid,
    },

    /// Stop the actor
    Close { response: oneshot::Sender<()> },
}

/// Session metadata for discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: Uuid,
    pub name: String,
    pub phase: Phase,
    pub round: u32,
    pub player_count: usize,
    pub alive_count: usize,
    pub subscriber_count: usize,
    pub created_at: DateTime<Utc>,
}
