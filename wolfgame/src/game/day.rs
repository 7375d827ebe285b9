//! Day vote resolution: a unique plurality target is eliminated, a tie or
//! an empty ballot eliminates nobody.

use serde::{Deserialize, Serialize};

use super::entities::{Action, ActionType, PlayerId, StatusChange};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DayOutcome {
    pub round: u32,
    /// Vote counts per target, in order of first vote received.
    pub tally: Vec<(PlayerId, usize)>,
    pub eliminated: Option<PlayerId>,
    pub changes: Vec<StatusChange>,
}

#[must_use]
pub fn resolve(actions: &[Action]) -> DayOutcome {
    let mut tally: Vec<(PlayerId, usize)> = Vec::new();
    for target in actions
        .iter()
        .filter(|a| a.action_type == ActionType::Vote)
        .filter_map(|a| a.target_id.as_ref())
    {
        match tally.iter_mut().find(|(id, _)| id == target) {
            Some((_, count)) => *count += 1,
            None => tally.push((target.clone(), 1)),
        }
    }

    let max = tally.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let mut leaders = tally.iter().filter(|(_, count)| *count == max);
    let eliminated = match (leaders.next(), leaders.next()) {
        (Some((id, _)), None) => Some(id.clone()),
        _ => None,
    };
    let changes = eliminated.iter().map(StatusChange::dead).collect();

    DayOutcome {
        round: 0,
        tally,
        eliminated,
        changes,
    }
}
