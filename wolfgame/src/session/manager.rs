//! Session manager for spawning and tracking session actors.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    actor::{SessionActor, SessionHandle},
    config::SessionConfig,
    errors::{SessionError, SessionResult},
    messages::SessionMetadata,
};
use crate::{
    game::{PhaseController, RosterObserver},
    store::{ActionLog, InMemoryActionLog, InMemorySessionStore, SessionStore},
};

/// Builds the roster observer attached to every session this manager
/// spawns without one, restored sessions included.
pub type ObserverFactory = Arc<dyn Fn() -> Box<dyn RosterObserver> + Send + Sync>;

/// Registry of live sessions
pub struct SessionManager {
    /// Active session handles
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,

    store: Arc<dyn SessionStore>,

    action_log: Arc<dyn ActionLog>,

    observer_factory: Option<ObserverFactory>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, action_log: Arc<dyn ActionLog>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            store,
            action_log,
            observer_factory: None,
        }
    }

    #[must_use]
    pub fn with_observer_factory(mut self, factory: ObserverFactory) -> Self {
        self.observer_factory = Some(factory);
        self
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryActionLog::new()),
        )
    }

    pub fn action_log(&self) -> Arc<dyn ActionLog> {
        Arc::clone(&self.action_log)
    }

    /// Create a session with a freshly seated roster
    pub async fn create_session(&self, config: SessionConfig) -> SessionResult<SessionHandle> {
        let controller = PhaseController::new(config.settings.clone());
        self.create_session_with(config, controller).await
    }

    /// Create a session around a prepared controller, e.g. one with
    /// pre-dealt roles or a roster observer.
    pub async fn create_session_with(
        &self,
        config: SessionConfig,
        controller: PhaseController,
    ) -> SessionResult<SessionHandle> {
        config.validate().map_err(SessionError::InvalidConfig)?;
        let session_id = Uuid::new_v4();
        let handle = self.spawn(session_id, config, controller).await;
        log::info!("Created session {}", session_id);
        Ok(handle)
    }

    /// Revive a stored session. A live session is returned as is.
    pub async fn load_session(&self, session_id: Uuid) -> SessionResult<SessionHandle> {
        if let Some(handle) = self.get_session(session_id).await {
            return Ok(handle);
        }

        let record = self
            .store
            .load(session_id)
            .await?
            .ok_or(SessionError::SessionNotFound(session_id))?;
        let controller = PhaseController::from_checkpoint(record.checkpoint);
        let handle = self.spawn(session_id, record.config, controller).await;
        log::info!("Loaded session {} from store", session_id);
        Ok(handle)
    }

    /// Load every stored session that is not already live
    ///
    /// # Returns
    ///
    /// * `SessionResult<usize>` - Number of sessions loaded
    pub async fn load_existing_sessions(&self) -> SessionResult<usize> {
        let mut loaded = 0;
        for session_id in self.store.list().await? {
            if self.get_session(session_id).await.is_some() {
                continue;
            }
            self.load_session(session_id).await?;
            loaded += 1;
        }
        Ok(loaded)
    }

    async fn spawn(
        &self,
        session_id: Uuid,
        config: SessionConfig,
        mut controller: PhaseController,
    ) -> SessionHandle {
        if !controller.has_observer()
            && let Some(factory) = &self.observer_factory
        {
            controller.set_boxed_observer(factory());
        }

        let (actor, handle) = SessionActor::new(
            session_id,
            config,
            controller,
            Arc::clone(&self.store),
            Arc::clone(&self.action_log),
        );

        tokio::spawn(async move {
            actor.run().await;
        });

        self.sessions
            .write()
            .await
            .insert(session_id, handle.clone());
        handle
    }

    pub async fn get_session(&self, session_id: Uuid) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .filter(|handle| !handle.is_closed())
            .cloned()
    }

    pub async fn list_sessions(&self) -> Vec<SessionMetadata> {
        let handles: Vec<SessionHandle> = self.sessions.read().await.values().cloned().collect();

        let mut sessions = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.metadata().await {
                Ok(metadata) => sessions.push(metadata),
                Err(e) => log::debug!("Skipping session {}: {}", handle.session_id(), e),
            }
        }
        sessions.sort_by_key(|s| s.created_at);
        sessions
    }

    /// Stop a session's actor. Its last checkpoint stays in the store.
    pub async fn close_session(&self, session_id: Uuid) -> SessionResult<()> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(&session_id)
            .ok_or(SessionError::SessionNotFound(session_id))?;

        handle.close().await?;
        log::info!("Closed session {}", session_id);
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
