use serde::{Deserialize, Serialize};

use super::{
    entities::{Action, ActionType, PlayerId},
    errors::{GameError, GameResult},
    roster::Roster,
};

/// Ingress buffer of player intents for the current phase.
///
/// Holds at most one action per player. A later submission from the same
/// player replaces the earlier one and moves to the back of the queue.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionQueue {
    actions: Vec<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, mut action: Action, roster: &Roster) -> GameResult<()> {
        let actor = roster.get(&action.player_id)?;
        if !actor.is_alive() {
            return Err(GameError::DeadPlayer(action.player_id));
        }

        action.accepted = true;
        self.actions.retain(|a| a.player_id != action.player_id);
        self.actions.push(action);
        Ok(())
    }

    /// Returns accepted actions in insertion order and empties the queue.
    pub fn drain_all(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
            .into_iter()
            .filter(|a| a.accepted)
            .collect()
    }

    #[must_use]
    pub fn has(&self, action_type: ActionType) -> bool {
        self.actions.iter().any(|a| a.action_type == action_type)
    }

    #[must_use]
    pub fn has_acted(&self, player_id: &PlayerId) -> bool {
        self.actions.iter().any(|a| a.player_id == *player_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
