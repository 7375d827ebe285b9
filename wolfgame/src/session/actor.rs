//! Session actor implementation with async message handling.

use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, Instant, interval},
};
use uuid::Uuid;

use super::{
    config::SessionConfig,
    errors::{SessionError, SessionResult},
    messages::{SessionMessage, SessionMetadata, SessionReply},
};
use crate::{
    game::{Action, Phase, PhaseController, PlayerId, SessionSnapshot},
    store::{ActionLog, ActionRecord, SessionRecord, SessionStore},
};

const INBOX_CAPACITY: usize = 100;

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    session_id: Uuid,
}

impl SessionHandle {
    pub fn new(sender: mpsc::Sender<SessionMessage>, session_id: Uuid) -> Self {
        Self { sender, session_id }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Whether the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> SessionResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::SessionClosed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> SessionResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(message(tx)).await?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    pub async fn start(&self) -> SessionResult<SessionSnapshot> {
        Ok(self
            .request(|response| SessionMessage::Start { response })
            .await??)
    }

    pub async fn submit(&self, action: Action) -> SessionResult<SessionSnapshot> {
        Ok(self
            .request(|response| SessionMessage::SubmitAction { action, response })
            .await??)
    }

    pub async fn transfer_policeman(
        &self,
        from: PlayerId,
        to: Option<PlayerId>,
    ) -> SessionResult<SessionSnapshot> {
        Ok(self
            .request(|response| SessionMessage::TransferPoliceman { from, to, response })
            .await??)
    }

    pub async fn force_game_over(&self) -> SessionResult<SessionSnapshot> {
        self.request(|response| SessionMessage::ForceGameOver { response })
            .await
    }

    pub async fn expire_phase(&self) -> SessionResult<SessionSnapshot> {
        self.request(|response| SessionMessage::ExpirePhase { response })
            .await
    }

    pub async fn snapshot(&self) -> SessionResult<SessionSnapshot> {
        self.request(|response| SessionMessage::GetSnapshot { response })
            .await
    }

    pub async fn metadata(&self) -> SessionResult<SessionMetadata> {
        self.request(|response| SessionMessage::GetMetadata { response })
            .await
    }

    /// Registers a subscriber and returns the receiving end of its feed.
    pub async fn subscribe(
        &self,
        subscriber_id: Uuid,
        buffer: usize,
    ) -> SessionResult<mpsc::Receiver<SessionSnapshot>> {
        let (sender, receiver) = mpsc::channel(buffer);
        self.send(SessionMessage::Subscribe {
            subscriber_id,
            sender,
        })
        .await?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, subscriber_id: Uuid) -> SessionResult<()> {
        self.send(SessionMessage::Unsubscribe { subscriber_id })
            .await
    }

    pub async fn close(&self) -> SessionResult<()> {
        self.request(|response| SessionMessage::Close { response })
            .await
    }
}

/// Session actor owning one game
pub struct SessionActor {
    id: Uuid,

    config: SessionConfig,

    /// Game state machine
    controller: PhaseController,

    inbox: mpsc::Receiver<SessionMessage>,

    store: Arc<dyn SessionStore>,

    action_log: Arc<dyn ActionLog>,

    /// Snapshot feeds (WebSocket connections, bots)
    subscribers: HashMap<Uuid, mpsc::Sender<SessionSnapshot>>,

    /// When the open phase began, for the deadline
    phase_started: Instant,

    created_at: DateTime<Utc>,

    is_closed: bool,
}

impl SessionActor {
    /// Create a new session actor
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(
        id: Uuid,
        config: SessionConfig,
        controller: PhaseController,
        store: Arc<dyn SessionStore>,
        action_log: Arc<dyn ActionLog>,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Self {
            id,
            config,
            controller,
            inbox,
            store,
            action_log,
            subscribers: HashMap::new(),
            phase_started: Instant::now(),
            created_at: Utc::now(),
            is_closed: false,
        };

        (actor, SessionHandle::new(sender, id))
    }

    /// Run the session actor event loop
    pub async fn run(mut self) {
        log::info!("Session {} '{}' starting", self.id, self.config.name);
        self.persist().await;

        let mut tick_interval = interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        log::debug!("Session {}: all handles dropped", self.id);
                        break;
                    };
                    self.handle_message(message).await;

                    if self.is_closed {
                        break;
                    }
                }

                _ = tick_interval.tick() => {
                    self.tick().await;
                }
            }
        }

        log::info!("Session {} '{}' closed", self.id, self.config.name);
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Start { response } => {
                let result = self.controller.start();
                self.finish(&result).await;
                let _ = response.send(self.tag(result));
            }

            SessionMessage::SubmitAction { action, response } => {
                let result = self.handle_action(action).await;
                let _ = response.send(self.tag(result));
            }

            SessionMessage::TransferPoliceman { from, to, response } => {
                let result = self.controller.transfer_policeman(&from, to.as_ref());
                self.finish(&result).await;
                let _ = response.send(self.tag(result));
            }

            SessionMessage::ForceGameOver { response } => {
                let snapshot = self.controller.force_game_over();
                log::info!("Session {}: game over forced", self.id);
                self.after_change(&snapshot).await;
                let _ = response.send(self.with_id(snapshot));
            }

            SessionMessage::ExpirePhase { response } => {
                let snapshot = self.expire().await;
                let _ = response.send(snapshot);
            }

            SessionMessage::GetSnapshot { response } => {
                let _ = response.send(self.with_id(self.controller.snapshot()));
            }

            SessionMessage::GetMetadata { response } => {
                let _ = response.send(self.metadata());
            }

            SessionMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                self.subscribers.insert(subscriber_id, sender);
                log::debug!(
                    "Subscriber {} joined session {}",
                    subscriber_id,
                    self.id
                );
            }

            SessionMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!("Subscriber {} left session {}", subscriber_id, self.id);
            }

            SessionMessage::Close { response } => {
                self.is_closed = true;
                self.persist().await;
                let _ = response.send(());
            }
        }
    }

    async fn handle_action(&mut self, action: Action) -> SessionReply {
        let phase = self.controller.phase();
        let round = self.controller.round();
        let record = ActionRecord::new(self.id, round, phase, &action);

        let result = self.controller.handle(action);
        if result.is_ok()
            && let Err(e) = self.action_log.append(record).await
        {
            log::error!("Session {}: failed to log action: {}", self.id, e);
        }
        self.finish(&result).await;
        result
    }

    /// Persists and broadcasts after a fallible operation. Failures are
    /// broadcast too, carrying the error.
    async fn finish(&mut self, result: &SessionReply) {
        match result {
            Ok(snapshot) => self.after_change(snapshot).await,
            Err(e) => {
                log::debug!("Session {}: rejected: {}", self.id, e);
                let snapshot = self.controller.snapshot().with_error(e);
                self.broadcast(snapshot);
            }
        }
    }

    async fn after_change(&mut self, snapshot: &SessionSnapshot) {
        if snapshot.advanced {
            self.phase_started = Instant::now();
        }
        self.persist().await;
        self.broadcast(snapshot.clone());
    }

    async fn tick(&mut self) {
        if self.is_closed {
            return;
        }
        let Some(timeout) = self.config.phase_timeout() else {
            return;
        };
        let open = matches!(
            self.controller.phase(),
            Phase::Night | Phase::PolicemanSelection | Phase::Day
        );
        if open && self.phase_started.elapsed() >= timeout {
            log::warn!(
                "Session {}: {} deadline of {}s passed",
                self.id,
                self.controller.phase(),
                timeout.as_secs()
            );
            self.expire().await;
        }
    }

    async fn expire(&mut self) -> SessionSnapshot {
        let snapshot = self.controller.expire_phase();
        self.after_change(&snapshot).await;
        self.with_id(snapshot)
    }

    async fn persist(&self) {
        let record = SessionRecord {
            session_id: self.id,
            config: self.config.clone(),
            checkpoint: self.controller.checkpoint(),
            updated_at: Utc::now(),
        };
        if let Err(e) = self.store.save(&record).await {
            log::error!("Session {}: failed to persist: {}", self.id, e);
        }
    }

    /// Broadcast a snapshot to all subscribers
    fn broadcast(&mut self, snapshot: SessionSnapshot) {
        let snapshot = self.with_id(snapshot);
        self.subscribers.retain(|subscriber_id, sender| {
            match sender.try_send(snapshot.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping snapshot",
                        subscriber_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                    false
                }
            }
        });
    }

    fn with_id(&self, mut snapshot: SessionSnapshot) -> SessionSnapshot {
        snapshot.session_id = Some(self.id);
        snapshot
    }

    fn tag(&self, result: SessionReply) -> SessionReply {
        result.map(|snapshot| self.with_id(snapshot))
    }

    fn metadata(&self) -> SessionMetadata {
        let roster = self.controller.roster();
        SessionMetadata {
            session_id: self.id,
            name: self.config.name.clone(),
            phase: self.controller.phase(),
            round: self.controller.round(),
            player_count: roster.len(),
            alive_count: roster.alive_count(),
            subscriber_count: self.subscribers.len(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{ActionType, GameError, GameSettings},
        store::{InMemoryActionLog, InMemorySessionStore},
    };

    fn spawn(config: SessionConfig) -> (SessionHandle, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        let controller = PhaseController::new(config.settings.clone());
        let (actor, handle) = SessionActor::new(
            Uuid::new_v4(),
            config,
            controller,
            store.clone(),
            Arc::new(InMemoryActionLog::new()),
        );
        tokio::spawn(actor.run());
        (handle, store)
    }

    #[tokio::test]
    async fn test_start_and_snapshot_carry_session_id() {
        let (handle, _) = spawn(SessionConfig::default());
        let snapshot = handle.start().await.unwrap();
        assert_eq!(snapshot.session_id, Some(handle.session_id()));
        assert_eq!(snapshot.phase, Phase::Night);

        let again = handle.snapshot().await.unwrap();
        assert_eq!(again.phase, Phase::Night);
        assert!(!again.advanced);
    }

    #[tokio::test]
    async fn test_rejection_is_returned_and_broadcast() {
        let (handle, _) = spawn(SessionConfig::default());
        let mut feed = handle.subscribe(Uuid::new_v4(), 8).await.unwrap();

        let err = handle
            .submit(Action::untargeted("p0", ActionType::Sleep))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Game(GameError::ActionNotAllowed { .. })
        ));

        let broadcast = feed.recv().await.unwrap();
        assert!(broadcast.last_error.is_some());
        assert_eq!(broadcast.phase, Phase::Setup);
    }

    #[tokio::test]
    async fn test_changes_are_persisted() {
        let (handle, store) = spawn(SessionConfig::default());
        handle.start().await.unwrap();

        let record = store.load(handle.session_id()).await.unwrap().unwrap();
        assert_eq!(record.checkpoint.session.phase(), Phase::Night);
    }

    #[tokio::test]
    async fn test_close_stops_actor() {
        let (handle, _) = spawn(SessionConfig::default());
        handle.close().await.unwrap();
        assert!(matches!(
            handle.snapshot().await,
            Err(SessionError::SessionClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires_phase() {
        let config = SessionConfig {
            phase_timeout_secs: 5,
            settings: GameSettings::default(),
            ..SessionConfig::default()
        };
        let (handle, _) = spawn(config);
        handle.start().await.unwrap();

        tokio::time::sleep(Duration::from_secs(7)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, Phase::PolicemanSelection);
    }
}
