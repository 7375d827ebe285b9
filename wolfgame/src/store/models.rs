//! Persisted record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    game::{Action, ActionType, Checkpoint, Phase, PlayerId},
    session::SessionConfig,
};

/// Full state of a session at its last checkpoint.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub config: SessionConfig,
    pub checkpoint: Checkpoint,
    pub updated_at: DateTime<Utc>,
}

/// One accepted action, kept for history only.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionRecord {
    pub session_id: Uuid,
    pub round: u32,
    pub phase: Phase,
    pub player_id: PlayerId,
    pub action_type: ActionType,
    pub target_id: Option<PlayerId>,
    pub recorded_at: DateTime<Utc>,
}

impl ActionRecord {
    pub fn new(session_id: Uuid, round: u32, phase: Phase, action: &Action) -> Self {
        Self {
            session_id,
            round,
            phase,
            player_id: action.player_id.clone(),
            action_type: action.action_type,
            target_id: action.target_id.clone(),
            recorded_at: Utc::now(),
        }
    }
}
