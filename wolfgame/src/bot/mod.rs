//! Bot module providing scripted players.
//!
//! This module implements:
//! - BotDecisionMaker: picks one seat's action from a snapshot
//! - BotManager: drives a set of seats through a live session
//!
//! Bots are used to fill tables in simulations and tests. They see every
//! role, so they are not meant to play fairly against humans.
//!
//! ## Example
//!
//! ```no_run
//! use wolfgame::bot::BotManager;
//! use wolfgame::session::{SessionConfig, SessionManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sessions = SessionManager::in_memory();
//!     let handle = sessions.create_session(SessionConfig::default()).await.unwrap();
//!
//!     let mut bots = BotManager::for_table(12, Some(7));
//!     let snapshot = bots.play(&handle, 10).await.unwrap();
//!     println!("Stopped in {:?} of round {}", snapshot.phase, snapshot.round);
//! }
//! ```

pub mod decision;
pub mod manager;
pub mod models;

pub use decision::BotDecisionMaker;
pub use manager::BotManager;
pub use models::BotConfig;
