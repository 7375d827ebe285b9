//! Store traits and their in-memory implementations.
//!
//! Sessions talk to persistence only through these traits, so a real
//! backend can be swapped in without touching the game core.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    errors::{StoreError, StoreResult},
    models::{ActionRecord, SessionRecord},
};

/// Checkpoint storage for sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the latest record of a session
    async fn load(&self, session_id: Uuid) -> StoreResult<Option<SessionRecord>>;

    /// Overwrite the record of a session
    async fn save(&self, record: &SessionRecord) -> StoreResult<()>;

    /// Remove a session's record
    async fn delete(&self, session_id: Uuid) -> StoreResult<()>;

    /// Ids of every stored session
    async fn list(&self) -> StoreResult<Vec<Uuid>>;
}

/// Append-only action history
#[async_trait]
pub trait ActionLog: Send + Sync {
    async fn append(&self, record: ActionRecord) -> StoreResult<()>;

    /// History of a session, optionally restricted to one round
    async fn history(&self, session_id: Uuid, round: Option<u32>) -> StoreResult<Vec<ActionRecord>>;
}

/// Keeps records as JSON documents in memory.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    documents: RwLock<HashMap<Uuid, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: Uuid) -> StoreResult<Option<SessionRecord>> {
        let documents = self.documents.read().await;
        let Some(document) = documents.get(&session_id) else {
            return Ok(None);
        };

        let record: SessionRecord = serde_json::from_str(document)?;
        if record.session_id != session_id {
            return Err(StoreError::Mismatch {
                expected: session_id,
                found: record.session_id,
            });
        }
        Ok(Some(record))
    }

    async fn save(&self, record: &SessionRecord) -> StoreResult<()> {
        let document = serde_json::to_string(record)?;
        self.documents
            .write()
            .await
            .insert(record.session_id, document);
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> StoreResult<()> {
        self.documents.write().await.remove(&session_id);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Uuid>> {
        Ok(self.documents.read().await.keys().copied().collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryActionLog {
    records: RwLock<Vec<ActionRecord>>,
}

impl InMemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActionLog for InMemoryActionLog {
    async fn append(&self, record: ActionRecord) -> StoreResult<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn history(
        &self,
        session_id: Uuid,
        round: Option<u32>,
    ) -> StoreResult<Vec<ActionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.session_id == session_id)
            .filter(|r| round.is_none_or(|round| r.round == round))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        game::{Action, ActionType, GameSettings, Phase, PhaseController},
        session::SessionConfig,
    };

    fn record(session_id: Uuid) -> SessionRecord {
        let controller = PhaseController::new(GameSettings::default());
        SessionRecord {
            session_id,
            config: SessionConfig::default(),
            checkpoint: controller.checkpoint(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = InMemorySessionStore::new();
        let id = Uuid::new_v4();
        assert!(store.load(id).await.unwrap().is_none());

        let saved = record(id);
        store.save(&saved).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), Some(saved));
        assert_eq!(store.list().await.unwrap(), vec![id]);
    }

    #[tokio::test]
    async fn test_save_overwrites_and_delete_removes() {
        let store = InMemorySessionStore::new();
        let id = Uuid::new_v4();
        let mut first = record(id);
        store.save(&first).await.unwrap();
        first.config.name = "Renamed".to_string();
        store.save(&first).await.unwrap();

        assert_eq!(store.load(id).await.unwrap().unwrap().config.name, "Renamed");

        store.delete(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_filters_by_session_and_round() {
        let log = InMemoryActionLog::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let sleep = Action::untargeted("p0", ActionType::Sleep);
        let vote = Action::targeted("p0", ActionType::Vote, "p1");

        log.append(ActionRecord::new(a, 1, Phase::Night, &sleep)).await.unwrap();
        log.append(ActionRecord::new(b, 1, Phase::Night, &sleep)).await.unwrap();
        log.append(ActionRecord::new(a, 2, Phase::Day, &vote)).await.unwrap();

        assert_eq!(log.history(a, None).await.unwrap().len(), 2);
        let round_two = log.history(a, Some(2)).await.unwrap();
        assert_eq!(round_two.len(), 1);
        assert_eq!(round_two[0].action_type, ActionType::Vote);
        assert_eq!(round_two[0].target_id, Some("p1".into()));
    }
}
