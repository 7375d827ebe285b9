//! Per-phase rules of the session state machine.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use super::{
    election::ElectionManager,
    entities::{ActionType, Phase, Role, WitchPotions},
    queue::ActionQueue,
    roster::Roster,
};

/// Read-only view of controller state used to judge phase completion.
pub struct PhaseView<'a> {
    pub roster: &'a Roster,
    pub queue: &'a ActionQueue,
    pub potions: &'a WitchPotions,
}

#[enum_dispatch]
pub trait PhaseRules {
    fn phase(&self) -> Phase;

    /// Whether `action_type` may be submitted in this phase.
    fn permits(&self, action_type: ActionType) -> bool {
        action_type.phase() == self.phase()
    }

    /// Whether every required actor has acted.
    fn is_complete(&self, view: &PhaseView<'_>) -> bool;
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Setup;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Night;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PolicemanSelection {
    pub election: ElectionManager,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Day;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Voting;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameOver;

impl PhaseRules for Setup {
    fn phase(&self) -> Phase {
        Phase::Setup
    }

    fn is_complete(&self, _view: &PhaseView<'_>) -> bool {
        false
    }
}

/// Whether `role` no longer holds the night up.
fn night_duty_done(role: Role, view: &PhaseView<'_>) -> bool {
    let acted = |types: &[ActionType]| types.iter().any(|t| view.queue.has(*t));
    match role {
        Role::Werewolf => !view.roster.alive(role) || acted(&[ActionType::Kill]),
        Role::Seer => !view.roster.alive(role) || acted(&[ActionType::Check]),
        Role::Witch => {
            !view.roster.alive(role)
                || !view.potions.any_left()
                || acted(&[ActionType::Heal, ActionType::Poison])
        }
        Role::Villager | Role::Hunter | Role::Idiot => true,
    }
}

impl PhaseRules for Night {
    fn phase(&self) -> Phase {
        Phase::Night
    }

    fn is_complete(&self, view: &PhaseView<'_>) -> bool {
        Role::ALL.iter().all(|role| night_duty_done(*role, view))
    }
}

impl PhaseRules for PolicemanSelection {
    fn phase(&self) -> Phase {
        Phase::PolicemanSelection
    }

    fn is_complete(&self, view: &PhaseView<'_>) -> bool {
        view.roster
            .alive_players()
            .filter(|p| !self.election.is_candidate(&p.id))
            .all(|p| self.election.has_voted(&p.id))
    }
}

impl PhaseRules for Day {
    fn phase(&self) -> Phase {
        Phase::Day
    }

    fn is_complete(&self, view: &PhaseView<'_>) -> bool {
        view.roster
            .alive_players()
            .all(|p| view.queue.has_acted(&p.id))
    }
}

impl PhaseRules for Voting {
    fn phase(&self) -> Phase {
        Phase::Voting
    }

    fn permits(&self, _action_type: ActionType) -> bool {
        false
    }

    fn is_complete(&self, _view: &PhaseView<'_>) -> bool {
        false
    }
}

impl PhaseRules for GameOver {
    fn phase(&self) -> Phase {
        Phase::GameOver
    }

    fn permits(&self, _action_type: ActionType) -> bool {
        false
    }

    fn is_complete(&self, _view: &PhaseView<'_>) -> bool {
        false
    }
}

#[enum_dispatch(PhaseRules)]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PhaseState {
    Setup(Setup),
    Night(Night),
    PolicemanSelection(PolicemanSelection),
    Day(Day),
    Voting(Voting),
    GameOver(GameOver),
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::Setup(Setup)
    }
}

impl PhaseState {
    /// The running election, if the badge is being contested.
    pub fn election(&self) -> Option<&ElectionManager> {
        match self {
            Self::PolicemanSelection(state) => Some(&state.election),
            _ => None,
        }
    }

    pub fn election_mut(&mut self) -> Option<&mut ElectionManager> {
        match self {
            Self::PolicemanSelection(state) => Some(&mut state.election),
            _ => None,
        }
    }
}
