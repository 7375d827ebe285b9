//! Scripted bot decisions.
//!
//! Bots read the full snapshot (roles included) and play a fixed script:
//! - the first living werewolf picks a villager-side victim, the others sleep
//! - the seer checks a random living player
//! - the witch spends heal first, then poison, then sleeps
//! - everyone else sleeps through the night
//! - designated runners stand for policeman, the rest vote among them
//! - by day werewolves vote out a villager-side player, others vote at random

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use super::models::BotConfig;
use crate::game::{Action, ActionType, Phase, PlayerId, PlayerView, Role, SessionSnapshot};

#[derive(Debug, Clone)]
pub struct BotDecisionMaker {
    config: BotConfig,
    rng: StdRng,
}

impl BotDecisionMaker {
    pub fn new(config: BotConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.config.player_id
    }

    #[must_use]
    pub fn runs_for_policeman(&self) -> bool {
        self.config.runs_for_policeman
    }

    /// The action this seat takes now, or `None` when it has nothing to do
    /// yet (dead, waiting for candidates, game not running).
    pub fn decide(&mut self, snapshot: &SessionSnapshot) -> Option<Action> {
        let me = snapshot.player(&self.config.player_id)?;
        if !me.is_alive() {
            return None;
        }

        match snapshot.phase {
            Phase::Night => Some(self.decide_night(me, snapshot)),
            Phase::PolicemanSelection => self.decide_election(me, snapshot),
            Phase::Day => self.decide_day(me, snapshot),
            Phase::Setup | Phase::Voting | Phase::GameOver => None,
        }
    }

    fn decide_night(&mut self, me: &PlayerView, snapshot: &SessionSnapshot) -> Action {
        let id = me.player_id.clone();
        let sleep = Action::new(id.clone(), ActionType::Sleep, None);

        match me.role {
            Some(Role::Werewolf) => {
                let leader = snapshot
                    .players
                    .iter()
                    .find(|p| p.is_alive() && p.role == Some(Role::Werewolf));
                if leader.is_some_and(|p| p.player_id == id) {
                    let victims = living(snapshot, |p| p.role != Some(Role::Werewolf));
                    self.targeted(id, ActionType::Kill, &victims).unwrap_or(sleep)
                } else {
                    sleep
                }
            }
            Some(Role::Seer) => {
                let others = living(snapshot, |p| p.player_id != id);
                self.targeted(id, ActionType::Check, &others).unwrap_or(sleep)
            }
            Some(Role::Witch) if snapshot.potions.heal => {
                let everyone = living(snapshot, |_| true);
                self.targeted(id, ActionType::Heal, &everyone).unwrap_or(sleep)
            }
            Some(Role::Witch) if snapshot.potions.poison => {
                let others = living(snapshot, |p| p.player_id != id);
                self.targeted(id, ActionType::Poison, &others).unwrap_or(sleep)
            }
            _ => sleep,
        }
    }

    fn decide_election(&mut self, me: &PlayerView, snapshot: &SessionSnapshot) -> Option<Action> {
        if me.is_candidate {
            return None;
        }
        if self.config.runs_for_policeman {
            return Some(Action::new(
                me.player_id.clone(),
                ActionType::RunForPoliceman,
                None,
            ));
        }
        let candidate = snapshot.candidates.choose(&mut self.rng)?;
        Some(Action::new(
            me.player_id.clone(),
            ActionType::VotePoliceman,
            Some(candidate.clone()),
        ))
    }

    fn decide_day(&mut self, me: &PlayerView, snapshot: &SessionSnapshot) -> Option<Action> {
        let id = me.player_id.clone();
        let mut targets = match me.role {
            Some(Role::Werewolf) => living(snapshot, |p| p.role != Some(Role::Werewolf)),
            _ => Vec::new(),
        };
        if targets.is_empty() {
            targets = living(snapshot, |p| p.player_id != id);
        }
        self.targeted(id, ActionType::Vote, &targets)
    }

    fn targeted(
        &mut self,
        player_id: PlayerId,
        action_type: ActionType,
        targets: &[PlayerId],
    ) -> Option<Action> {
        let target = targets.choose(&mut self.rng)?.clone();
        Some(Action::new(player_id, action_type, Some(target)))
    }
}

fn living(snapshot: &SessionSnapshot, keep: impl Fn(&PlayerView) -> bool) -> Vec<PlayerId> {
    snapshot
        .players
        .iter()
        .filter(|p| p.is_alive() && keep(p))
        .map(|p| p.player_id.clone())
        .collect()
}
