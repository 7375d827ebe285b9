//! # Wolfgame
//!
//! A werewolf (mafia) session engine built around a finite state machine.
//!
//! One session seats a fixed roster, deals hidden roles and then alternates
//! nights and days. Players submit actions; the engine decides when every
//! required actor has acted, resolves the phase and moves on. The phase
//! states are dispatched with `enum_dispatch`.
//!
//! ## Architecture
//!
//! - **Setup**: seats filled, roles not yet dealt
//! - **Night**: werewolves kill, the seer checks, the witch heals or poisons
//! - **PolicemanSelection**: after the first night only, players elect a
//!   policeman
//! - **Day**: every living player votes someone out
//! - **GameOver**: terminal, reached through a roster observer or by force
//!
//! ## Core Modules
//!
//! - [`game`]: roster, action queue, resolvers, election and `PhaseController`
//! - [`session`]: one async actor per session plus the session registry
//! - [`store`]: checkpoint and action-history collaborators
//! - [`bot`]: scripted players
//!
//! ## Example
//!
//! ```
//! use wolfgame::{Action, ActionType, GameSettings, Phase, PhaseController};
//!
//! let mut controller = PhaseController::new(GameSettings::default());
//! let snapshot = controller.start().unwrap();
//! assert_eq!(snapshot.phase, Phase::Night);
//!
//! // Sleeping never finishes a night on its own.
//! let snapshot = controller
//!     .handle(Action::untargeted("p0", ActionType::Sleep))
//!     .unwrap();
//! assert!(!snapshot.advanced);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    Action, ActionType, GameError, GameSettings, Phase, PhaseController, PlayerId, Role,
    SessionSnapshot, constants,
};

/// Async session actors and their registry.
pub mod session;

/// Persistence collaborators.
pub mod store;

/// Scripted bot players.
pub mod bot;
