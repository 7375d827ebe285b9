//! Bot manager driving scripted seats through a live session.

use std::collections::HashSet;

use super::{decision::BotDecisionMaker, models::BotConfig};
use crate::{
    game::{Phase, PlayerId, SessionSnapshot},
    session::{SessionError, SessionHandle, SessionResult},
};

/// Bots for a single session
pub struct BotManager {
    /// Candidates first, so voters have someone to vote for
    bots: Vec<BotDecisionMaker>,

    /// Seats that already acted in the current stage
    acted: HashSet<PlayerId>,

    /// (phase, round) the `acted` set belongs to
    stage: Option<(Phase, u32)>,
}

impl BotManager {
    pub fn new(configs: Vec<BotConfig>) -> Self {
        let mut bots: Vec<BotDecisionMaker> =
            configs.into_iter().map(BotDecisionMaker::new).collect();
        bots.sort_by_key(|bot| !bot.runs_for_policeman());
        Self {
            bots,
            acted: HashSet::new(),
            stage: None,
        }
    }

    /// A bot in every seat of a `player_count` table.
    pub fn for_table(player_count: usize, seed: Option<u64>) -> Self {
        Self::new(BotConfig::for_table(player_count, seed))
    }

    pub fn bot_count(&self) -> usize {
        self.bots.len()
    }

    pub fn get_bot(&self, player_id: &PlayerId) -> Option<&BotDecisionMaker> {
        self.bots.iter().find(|bot| bot.player_id() == player_id)
    }

    fn sync_stage(&mut self, snapshot: &SessionSnapshot) {
        let stage = (snapshot.phase, snapshot.round);
        if self.stage != Some(stage) {
            self.stage = Some(stage);
            self.acted.clear();
        }
    }

    /// Lets every bot that still owes an action act once.
    ///
    /// # Returns
    ///
    /// * `SessionResult<(usize, SessionSnapshot)>` - Actions accepted and the latest snapshot
    pub async fn step(
        &mut self,
        handle: &SessionHandle,
    ) -> SessionResult<(usize, SessionSnapshot)> {
        let mut snapshot = handle.snapshot().await?;
        let mut accepted = 0;

        for i in 0..self.bots.len() {
            self.sync_stage(&snapshot);
            let bot = &mut self.bots[i];
            if self.acted.contains(bot.player_id()) {
                continue;
            }
            let Some(action) = bot.decide(&snapshot) else {
                continue;
            };
            let player_id = bot.player_id().clone();

            match handle.submit(action).await {
                Ok(next) => {
                    snapshot = next;
                    accepted += 1;
                }
                Err(SessionError::Game(e)) => {
                    log::warn!("Bot {} action rejected: {}", player_id, e);
                    snapshot = handle.snapshot().await?;
                }
                Err(e) => return Err(e),
            }
            self.acted.insert(player_id);
        }

        Ok((accepted, snapshot))
    }

    /// Plays the session until `GAME_OVER` or until `max_phases` phase
    /// changes, starting it first if needed. A stage nobody can finish is
    /// expired.
    pub async fn play(
        &mut self,
        handle: &SessionHandle,
        max_phases: usize,
    ) -> SessionResult<SessionSnapshot> {
        let mut snapshot = handle.snapshot().await?;
        if snapshot.phase == Phase::Setup {
            snapshot = handle.start().await?;
        }

        let mut phases = 0;
        while snapshot.phase != Phase::GameOver && phases < max_phases {
            let before = (snapshot.phase, snapshot.round);
            let (accepted, next) = self.step(handle).await?;
            snapshot = next;

            if accepted == 0 && (snapshot.phase, snapshot.round) == before {
                log::debug!("Bots stalled in {}, expiring", snapshot.phase);
                snapshot = handle.expire_phase().await?;
            }
            if (snapshot.phase, snapshot.round) != before {
                phases += 1;
            }
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionConfig, SessionManager};

    #[test]
    fn test_runners_are_ordered_first() {
        let manager = BotManager::for_table(12, Some(1));
        assert_eq!(manager.bot_count(), 12);
        assert!(manager.bots[0].runs_for_policeman());
        assert!(manager.bots[1].runs_for_policeman());
        assert!(!manager.bots[2].runs_for_policeman());
        assert!(manager.get_bot(&PlayerId::new("p11")).is_some());
    }

    #[tokio::test]
    async fn test_bots_elect_a_policeman() {
        let sessions = SessionManager::in_memory();
        let handle = sessions
            .create_session(SessionConfig::default())
            .await
            .unwrap();
        let mut bots = BotManager::for_table(12, Some(9));

        let snapshot = bots.play(&handle, 2).await.unwrap();
        assert_eq!(snapshot.phase, Phase::Day);
        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.players.iter().filter(|p| p.is_policeman).count(), 1);
    }
}
