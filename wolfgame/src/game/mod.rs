//! Werewolf game engine - session state machine and action resolution.
//!
//! This module provides:
//! - The roster of seats and their dealt roles
//! - The per-phase action queue
//! - Night and day resolvers
//! - The policeman election
//! - `PhaseController`, the state machine tying them together

pub mod constants;
pub mod controller;
pub mod day;
pub mod election;
pub mod entities;
pub mod errors;
pub mod night;
pub mod phases;
pub mod queue;
pub mod roster;
pub mod settings;

pub use controller::{
    Checkpoint, GameSession, HookDecision, PhaseController, RosterObserver, SessionSnapshot,
};
pub use day::DayOutcome;
pub use election::ElectionManager;
pub use entities::{
    Action, ActionType, Inspection, Phase, Player, PlayerId, PlayerStatus, PlayerView, Role,
    StatusChange, WitchPotions,
};
pub use errors::{GameError, GameResult};
pub use night::{NightOutcome, NightReport};
pub use phases::{PhaseRules, PhaseState};
pub use queue::ActionQueue;
pub use roster::Roster;
pub use settings::GameSettings;
