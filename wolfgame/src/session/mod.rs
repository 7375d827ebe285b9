//! Session module running each game behind its own async actor.
//!
//! This module implements:
//! - SessionActor: Tokio task owning one `PhaseController`
//! - SessionManager: registry of live sessions
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Every mutating call goes through the actor's mpsc inbox, so concurrent
//! submissions for one session are applied one at a time in arrival order.
//! The actor ticks once a second to enforce the phase deadline, checkpoints
//! to the `SessionStore` after every change and pushes a snapshot to each
//! subscriber.
//!
//! ## Example
//!
//! ```no_run
//! use wolfgame::session::{SessionConfig, SessionManager};
//! use wolfgame::game::{Action, ActionType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = SessionManager::in_memory();
//!     let handle = manager.create_session(SessionConfig::default()).await?;
//!     handle.start().await?;
//!     let snapshot = handle
//!         .submit(Action::untargeted("p4", ActionType::Sleep))
//!         .await?;
//!     println!("{:?}", snapshot.phase);
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use config::SessionConfig;
pub use errors::{SessionError, SessionResult};
pub use manager::{ObserverFactory, SessionManager};
pub use messages::{SessionMessage, SessionMetadata, SessionReply};
