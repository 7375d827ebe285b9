//! Night resolution.
//!
//! The first `kill` target is the provisional victim and the first `heal`
//! and `poison` targets are taken likewise, in queue order. The victim
//! survives only when healed; the poison target always dies.

use serde::{Deserialize, Serialize};

use super::entities::{Action, ActionType, Inspection, PlayerId, StatusChange};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NightOutcome {
    pub killed: Option<PlayerId>,
    pub healed: Option<PlayerId>,
    pub poisoned: Option<PlayerId>,
    /// `(seer, target)` of the first `check`.
    pub checked: Option<(PlayerId, PlayerId)>,
    pub changes: Vec<StatusChange>,
}

impl NightOutcome {
    pub fn deaths(&self) -> impl Iterator<Item = &PlayerId> {
        self.changes.iter().map(|c| &c.player_id)
    }
}

/// The night as players see it once resolved.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NightReport {
    pub round: u32,
    pub killed: Option<PlayerId>,
    pub healed: Option<PlayerId>,
    pub poisoned: Option<PlayerId>,
    pub inspection: Option<Inspection>,
    pub deaths: Vec<PlayerId>,
}

fn first_target(actions: &[Action], action_type: ActionType) -> Option<&Action> {
    actions
        .iter()
        .find(|a| a.action_type == action_type && a.target_id.is_some())
}

#[must_use]
pub fn resolve(actions: &[Action]) -> NightOutcome {
    let target = |t| first_target(actions, t).and_then(|a| a.target_id.clone());
    let killed = target(ActionType::Kill);
    let healed = target(ActionType::Heal);
    let poisoned = target(ActionType::Poison);
    let checked = first_target(actions, ActionType::Check)
        .and_then(|a| Some((a.player_id.clone(), a.target_id.clone()?)));

    let mut changes = Vec::new();
    if let Some(victim) = &killed
        && healed.as_ref() != Some(victim)
    {
        changes.push(StatusChange::dead(victim));
    }
    if let Some(victim) = &poisoned
        && !changes.iter().any(|c| c.player_id == *victim)
    {
        changes.push(StatusChange::dead(victim));
    }

    NightOutcome {
        killed,
        healed,
        poisoned,
        checked,
        changes,
    }
}
