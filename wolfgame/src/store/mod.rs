//! Persistence collaborators: session checkpoints and action history.
//!
//! Both are consumed by the session actor. The game core never reads them
//! back to make decisions.

pub mod errors;
pub mod models;
pub mod repository;

pub use errors::{StoreError, StoreResult};
pub use models::{ActionRecord, SessionRecord};
pub use repository::{ActionLog, InMemoryActionLog, InMemorySessionStore, SessionStore};
