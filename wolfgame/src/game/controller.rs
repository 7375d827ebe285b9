//! The session state machine.
//!
//! [`PhaseController`] is the single entry point for everything that
//! mutates a game: it validates an action against the roster and the
//! current phase, queues it, and once the phase is complete drains the
//! queue through the matching resolver and advances.
//!
//! ```text
//! SETUP -> NIGHT -> POLICEMAN_SELECTION (round 1) -> DAY -> NIGHT -> ...
//!                \------------------------------> DAY
//! ```
//!
//! A failed call never leaves partial state behind: every check runs
//! before the first mutation.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    day::{self, DayOutcome},
    election::{self, ElectionManager},
    entities::{
        Action, ActionType, Inspection, Phase, Player, PlayerId, PlayerView, StatusChange,
        WitchPotions,
    },
    errors::{GameError, GameResult},
    night::{self, NightReport},
    phases::{Day, GameOver, Night, PhaseRules, PhaseState, PhaseView, PolicemanSelection},
    queue::ActionQueue,
    roster::Roster,
    settings::GameSettings,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HookDecision {
    Continue,
    EndGame,
}

/// Called after every roster mutation: role dealing, candidacy flags,
/// deaths and badge moves. Returning [`HookDecision::EndGame`] moves the
/// session to `GAME_OVER`.
pub trait RosterObserver: Send + Sync {
    fn on_roster_change(&mut self, phase: Phase, roster: &Roster) -> HookDecision;
}

impl<F> RosterObserver for F
where
    F: FnMut(Phase, &Roster) -> HookDecision + Send + Sync,
{
    fn on_roster_change(&mut self, phase: Phase, roster: &Roster) -> HookDecision {
        self(phase, roster)
    }
}

/// Phase, round and the few game-wide facts that outlive a phase.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSession {
    state: PhaseState,
    round: u32,
    potions: WitchPotions,
    policeman_vacated: bool,
    pending_transfer: Option<PlayerId>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            state: PhaseState::default(),
            round: 1,
            potions: WitchPotions::default(),
            policeman_vacated: false,
            pending_transfer: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn state(&self) -> &PhaseState {
        &self.state
    }

    #[must_use]
    pub fn potions(&self) -> WitchPotions {
        self.potions
    }

    #[must_use]
    pub fn policeman_vacated(&self) -> bool {
        self.policeman_vacated
    }

    pub fn pending_transfer(&self) -> Option<&PlayerId> {
        self.pending_transfer.as_ref()
    }
}

/// State broadcast to participants after every call that touches a
/// session.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub phase: Phase,
    pub round: u32,
    pub players: Vec<PlayerView>,
    pub candidates: Vec<PlayerId>,
    pub policeman_vacated: bool,
    /// A dead policeman who still has to hand the badge on.
    pub pending_transfer: Option<PlayerId>,
    pub potions: WitchPotions,
    pub last_night: Option<NightReport>,
    pub last_day: Option<DayOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Whether the call that produced this snapshot moved the phase on.
    pub advanced: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn with_error(mut self, error: &GameError) -> Self {
        self.last_error = Some(error.to_string());
        self
    }

    pub fn player(&self, player_id: &PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.player_id == *player_id)
    }
}

/// Everything needed to rebuild a controller, minus its observer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Checkpoint {
    pub settings: GameSettings,
    pub session: GameSession,
    pub roster: Roster,
    pub queue: ActionQueue,
    pub last_night: Option<NightReport>,
    pub last_day: Option<DayOutcome>,
}

pub struct PhaseController {
    settings: GameSettings,
    session: GameSession,
    roster: Roster,
    queue: ActionQueue,
    last_night: Option<NightReport>,
    last_day: Option<DayOutcome>,
    observer: Option<Box<dyn RosterObserver>>,
}

impl PhaseController {
    pub fn new(settings: GameSettings) -> Self {
        let roster = Roster::with_size(settings.player_count);
        Self::with_roster(settings, roster)
    }

    /// Uses `roster` as is. Roles already dealt are kept by [`Self::start`].
    pub fn with_roster(settings: GameSettings, roster: Roster) -> Self {
        Self {
            settings,
            session: GameSession::new(),
            roster,
            queue: ActionQueue::new(),
            last_night: None,
            last_day: None,
            observer: None,
        }
    }

    pub fn from_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            settings: checkpoint.settings,
            session: checkpoint.session,
            roster: checkpoint.roster,
            queue: checkpoint.queue,
            last_night: checkpoint.last_night,
            last_day: checkpoint.last_day,
            observer: None,
        }
    }

    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            settings: self.settings.clone(),
            session: self.session.clone(),
            roster: self.roster.clone(),
            queue: self.queue.clone(),
            last_night: self.last_night.clone(),
            last_day: self.last_day.clone(),
        }
    }

    pub fn set_observer(&mut self, observer: impl RosterObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn set_boxed_observer(&mut self, observer: Box<dyn RosterObserver>) {
        self.observer = Some(observer);
    }

    #[must_use]
    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.session.round
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn election(&self) -> Option<&ElectionManager> {
        self.session.state.election()
    }

    pub fn last_night(&self) -> Option<&NightReport> {
        self.last_night.as_ref()
    }

    /// Deals roles if needed and opens the first night.
    pub fn start(&mut self) -> GameResult<SessionSnapshot> {
        let from = self.session.phase();
        match from {
            Phase::Setup => {}
            Phase::GameOver => return Err(GameError::GameOver),
            _ => {
                return Err(GameError::InvalidTransition {
                    from,
                    to: Phase::Night,
                });
            }
        }

        let dealt = !self.roster.roles_assigned();
        if dealt {
            self.roster.assign_roles(&self.settings.distribution)?;
        }
        info!("Game starting with {} players", self.roster.len());
        self.enter(from, Night.into());
        if dealt && self.notify_observer() == HookDecision::EndGame {
            self.end_game();
        }
        Ok(self.snapshot_with(true))
    }

    /// Validates, queues and, once the phase is complete, resolves it.
    pub fn handle(&mut self, action: Action) -> GameResult<SessionSnapshot> {
        self.validate(&action)?;

        let player_id = action.player_id.clone();
        let mut candidacy_registered = false;
        match (action.action_type, self.session.state.election_mut()) {
            (ActionType::RunForPoliceman, Some(election)) => {
                election.register_candidacy(&mut self.roster, &player_id)?;
                candidacy_registered = true;
            }
            (ActionType::VotePoliceman, Some(election)) => {
                if let Some(candidate) = &action.target_id {
                    election.register_vote(&player_id, candidate)?;
                }
            }
            _ => {}
        }

        debug!(
            "Accepted '{action}' in {} of round {}",
            self.session.phase(),
            self.session.round
        );
        self.queue.submit(action, &self.roster)?;

        if candidacy_registered && self.notify_observer() == HookDecision::EndGame {
            self.end_game();
            return Ok(self.snapshot_with(true));
        }

        let advanced = self.is_complete();
        if advanced {
            self.advance();
        }
        Ok(self.snapshot_with(advanced))
    }

    fn validate(&self, action: &Action) -> GameResult<()> {
        let phase = self.session.phase();
        if phase == Phase::GameOver {
            return Err(GameError::GameOver);
        }

        let actor = self.roster.get(&action.player_id)?;
        if !actor.is_alive() {
            return Err(GameError::DeadPlayer(actor.id.clone()));
        }
        if !self.session.state.permits(action.action_type) {
            return Err(GameError::ActionNotAllowed {
                action: action.action_type,
                phase,
            });
        }
        if let Some(required) = action.action_type.required_role() {
            let role = actor.role().ok_or(GameError::RolesNotAssigned)?;
            if role != required {
                return Err(GameError::RoleCannotAct {
                    role,
                    action: action.action_type,
                });
            }
        }

        // Checked before the roster lookup so unregistered ids read as
        // unknown candidates.
        if action.action_type == ActionType::VotePoliceman
            && let (Some(election), Some(candidate)) = (self.election(), &action.target_id)
        {
            election.check_vote(&action.player_id, candidate)?;
        }

        match &action.target_id {
            Some(target) if !self.roster.get(target)?.is_alive() => {
                return Err(GameError::DeadTarget(target.clone()));
            }
            Some(_) => {}
            None if action.action_type.requires_target() => {
                return Err(GameError::MissingTarget(action.action_type));
            }
            None => {}
        }

        match action.action_type {
            ActionType::Heal | ActionType::Poison
                if self.settings.single_use_potions
                    && !self.session.potions.has(action.action_type) =>
            {
                Err(GameError::PotionUsed(action.action_type))
            }
            ActionType::RunForPoliceman => match self.election() {
                Some(election) => election.check_candidacy(&action.player_id),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn is_complete(&self) -> bool {
        let view = PhaseView {
            roster: &self.roster,
            queue: &self.queue,
            potions: &self.session.potions,
        };
        self.session.state.is_complete(&view)
    }

    /// Resolves the open phase with whatever is queued: missing night
    /// actors sleep, missing voters abstain and an election without
    /// candidates or votes is void.
    pub fn expire_phase(&mut self) -> SessionSnapshot {
        match self.session.phase() {
            Phase::Night | Phase::PolicemanSelection | Phase::Day => {
                warn!(
                    "{} of round {} expired with {} action(s) queued",
                    self.session.phase(),
                    self.session.round,
                    self.queue.len()
                );
                self.advance();
                self.snapshot_with(true)
            }
            Phase::Setup | Phase::Voting | Phase::GameOver => self.snapshot(),
        }
    }

    /// Hands the badge on, or retires it for the rest of the game when
    /// `to` is `None`.
    pub fn transfer_policeman(
        &mut self,
        from: &PlayerId,
        to: Option<&PlayerId>,
    ) -> GameResult<SessionSnapshot> {
        if self.session.phase() == Phase::GameOver {
            return Err(GameError::GameOver);
        }
        election::transfer(&mut self.roster, from, to)?;

        if self.session.pending_transfer.as_ref() == Some(from) {
            self.session.pending_transfer = None;
        }
        match to {
            Some(to) => info!("Policeman badge passed from {from} to {to}"),
            None => {
                self.session.policeman_vacated = true;
                info!("Policeman badge retired by {from}");
            }
        }

        if self.notify_observer() == HookDecision::EndGame {
            self.end_game();
        }
        Ok(self.snapshot())
    }

    pub fn force_game_over(&mut self) -> SessionSnapshot {
        let advanced = self.session.phase() != Phase::GameOver;
        self.end_game();
        self.snapshot_with(advanced)
    }

    fn end_game(&mut self) {
        let from = self.session.phase();
        if from == Phase::GameOver {
            return;
        }
        self.queue.clear();
        self.enter(from, GameOver.into());
    }

    fn advance(&mut self) {
        let actions = self.queue.drain_all();
        let from = self.session.phase();
        let round = self.session.round;

        let state = std::mem::take(&mut self.session.state);
        let (next, decision) = match state {
            PhaseState::Night(_) => {
                let decision = self.resolve_night(&actions);
                let next: PhaseState = if round == 1 {
                    PolicemanSelection::default().into()
                } else {
                    Day.into()
                };
                (next, decision)
            }
            PhaseState::PolicemanSelection(selection) => {
                let decision = self.close_election(&selection.election);
                (Day.into(), decision)
            }
            PhaseState::Day(_) => {
                let decision = self.resolve_day(&actions);
                if decision == HookDecision::Continue {
                    self.session.round += 1;
                }
                (Night.into(), decision)
            }
            other @ (PhaseState::Setup(_) | PhaseState::Voting(_) | PhaseState::GameOver(_)) => {
                self.session.state = other;
                return;
            }
        };

        let next = match decision {
            HookDecision::Continue => next,
            HookDecision::EndGame => GameOver.into(),
        };
        self.enter(from, next);
    }

    fn enter(&mut self, from: Phase, next: PhaseState) {
        let to = next.phase();
        debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
        self.session.state = next;
        info!("Round {}: {from} -> {to}", self.session.round);
    }

    fn resolve_night(&mut self, actions: &[Action]) -> HookDecision {
        let outcome = night::resolve(actions);
        if self.settings.single_use_potions {
            if outcome.healed.is_some() {
                self.session.potions.heal = false;
            }
            if outcome.poisoned.is_some() {
                self.session.potions.poison = false;
            }
        }

        let inspection = outcome.checked.as_ref().map(|(seer, target)| Inspection {
            seer: seer.clone(),
            target: target.clone(),
            role: self.roster.get(target).ok().and_then(Player::role),
        });
        let decision = self.apply_changes(&outcome.changes);
        info!(
            "Night {} resolved with {} death(s)",
            self.session.round,
            outcome.changes.len()
        );

        self.last_night = Some(NightReport {
            round: self.session.round,
            deaths: outcome.deaths().cloned().collect(),
            killed: outcome.killed,
            healed: outcome.healed,
            poisoned: outcome.poisoned,
            inspection,
        });
        decision
    }

    fn close_election(&mut self, election: &ElectionManager) -> HookDecision {
        match election.finalize(&mut self.roster) {
            Ok(winner) => {
                info!("{winner} elected policeman");
                self.notify_observer()
            }
            Err(err) => {
                warn!("Policeman election void: {err}");
                self.roster.clear_candidates();
                self.notify_observer()
            }
        }
    }

    fn resolve_day(&mut self, actions: &[Action]) -> HookDecision {
        let mut outcome = day::resolve(actions);
        outcome.round = self.session.round;
        let decision = self.apply_changes(&outcome.changes);
        match &outcome.eliminated {
            Some(id) => info!("Day {}: {id} voted out", self.session.round),
            None => info!("Day {}: nobody voted out", self.session.round),
        }
        self.last_day = Some(outcome);
        decision
    }

    fn apply_changes(&mut self, changes: &[StatusChange]) -> HookDecision {
        let mut changed = false;
        for change in changes {
            match self.roster.set_status(&change.player_id, change.status) {
                Ok(true) => {
                    changed = true;
                    if self
                        .roster
                        .get(&change.player_id)
                        .is_ok_and(|p| p.is_policeman)
                    {
                        self.session.pending_transfer = Some(change.player_id.clone());
                    }
                }
                Ok(false) => {}
                Err(err) => warn!("Skipping status change for {}: {err}", change.player_id),
            }
        }

        if changed {
            self.notify_observer()
        } else {
            HookDecision::Continue
        }
    }

    fn notify_observer(&mut self) -> HookDecision {
        let phase = self.session.phase();
        match self.observer.as_mut() {
            Some(observer) => observer.on_roster_change(phase, &self.roster),
            None => HookDecision::Continue,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_with(false)
    }

    fn snapshot_with(&self, advanced: bool) -> SessionSnapshot {
        SessionSnapshot {
            session_id: None,
            phase: self.session.phase(),
            round: self.session.round,
            players: self.roster.iter().map(PlayerView::from).collect(),
            candidates: self
                .election()
                .map(|e| e.candidates().to_vec())
                .unwrap_or_default(),
            policeman_vacated: self.session.policeman_vacated,
            pending_transfer: self.session.pending_transfer.clone(),
            potions: self.session.potions,
            last_night: self.last_night.clone(),
            last_day: self.last_day.clone(),
            last_error: None,
            advanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::game::entities::{PlayerStatus, Role};

    fn id(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    /// p0..p3 werewolves, p4..p7 villagers, then seer, witch, hunter, idiot.
    fn classic_roster() -> Roster {
        let roles = [
            Role::Werewolf,
            Role::Werewolf,
            Role::Werewolf,
            Role::Werewolf,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Seer,
            Role::Witch,
            Role::Hunter,
            Role::Idiot,
        ];
        Roster::from_assignments(
            roles
                .into_iter()
                .enumerate()
                .map(|(i, role)| (id(&format!("p{i}")), role))
                .collect(),
        )
    }

    fn started() -> PhaseController {
        let mut controller =
            PhaseController::with_roster(GameSettings::default(), classic_roster());
        controller.start().unwrap();
        controller
    }

    fn act(controller: &mut PhaseController, player: &str, action_type: ActionType, target: &str) {
        controller
            .handle(Action::targeted(player, action_type, target))
            .unwrap();
    }

    fn status(controller: &PhaseController, player: &str) -> PlayerStatus {
        controller.roster().get(&id(player)).unwrap().status()
    }

    // === Start Tests ===

    #[test]
    fn test_start_deals_roles_and_opens_night() {
        let mut controller = PhaseController::new(GameSettings::default());
        let snapshot = controller.start().unwrap();
        assert_eq!(snapshot.phase, Phase::Night);
        assert_eq!(snapshot.round, 1);
        assert!(snapshot.advanced);
        assert!(snapshot.players.iter().all(|p| p.role.is_some()));
    }

    #[test]
    fn test_start_twice() {
        let mut controller = started();
        assert_eq!(
            controller.start().unwrap_err(),
            GameError::InvalidTransition {
                from: Phase::Night,
                to: Phase::Night
            }
        );
    }

    #[test]
    fn test_actions_rejected_in_setup() {
        let mut controller =
            PhaseController::with_roster(GameSettings::default(), classic_roster());
        let err = controller
            .handle(Action::untargeted("p0", ActionType::Sleep))
            .unwrap_err();
        assert_eq!(
            err,
            GameError::ActionNotAllowed {
                action: ActionType::Sleep,
                phase: Phase::Setup
            }
        );
    }

    // === Validation Tests ===

    #[test]
    fn test_role_gating() {
        let mut controller = started();
        let err = controller
            .handle(Action::targeted("p4", ActionType::Kill, "p5"))
            .unwrap_err();
        assert_eq!(
            err,
            GameError::RoleCannotAct {
                role: Role::Villager,
                action: ActionType::Kill
            }
        );
        assert!(controller.queue().is_empty());
    }

    #[test]
    fn test_missing_and_unknown_targets() {
        let mut controller = started();
        assert_eq!(
            controller
                .handle(Action::untargeted("p0", ActionType::Kill))
                .unwrap_err(),
            GameError::MissingTarget(ActionType::Kill)
        );
        assert_eq!(
            controller
                .handle(Action::targeted("p0", ActionType::Kill, "p99"))
                .unwrap_err(),
            GameError::UnknownPlayer(id("p99"))
        );
    }

    #[test]
    fn test_wrong_phase_action() {
        let mut controller = started();
        assert_eq!(
            controller
                .handle(Action::targeted("p4", ActionType::Vote, "p0"))
                .unwrap_err(),
            GameError::ActionNotAllowed {
                action: ActionType::Vote,
                phase: Phase::Night
            }
        );
    }

    #[test]
    fn test_dead_targets_rejected() {
        let mut controller = started();
        act(&mut controller, "p8", ActionType::Check, "p0");
        act(&mut controller, "p9", ActionType::Poison, "p3");
        act(&mut controller, "p0", ActionType::Kill, "p5");
        controller.expire_phase();
        assert_eq!(controller.phase(), Phase::Day);

        let before = controller.checkpoint();
        assert_eq!(
            controller
                .handle(Action::targeted("p4", ActionType::Vote, "p5"))
                .unwrap_err(),
            GameError::DeadTarget(id("p5"))
        );
        assert_eq!(controller.checkpoint(), before);

        controller.expire_phase();
        assert_eq!(controller.phase(), Phase::Night);
        assert_eq!(
            controller
                .handle(Action::targeted("p0", ActionType::Kill, "p3"))
                .unwrap_err(),
            GameError::DeadTarget(id("p3"))
        );
        assert!(controller.queue().is_empty());
    }

    #[test]
    fn test_ballot_for_unregistered_id() {
        let mut controller = started();
        act(&mut controller, "p8", ActionType::Check, "p0");
        act(&mut controller, "p9", ActionType::Heal, "p8");
        act(&mut controller, "p0", ActionType::Kill, "p8");
        assert_eq!(controller.phase(), Phase::PolicemanSelection);

        assert_eq!(
            controller
                .handle(Action::targeted("p1", ActionType::VotePoliceman, "p99"))
                .unwrap_err(),
            GameError::UnknownCandidate(id("p99"))
        );
    }

    #[test]
    fn test_failed_handle_leaves_state_untouched() {
        let mut controller = started();
        act(&mut controller, "p0", ActionType::Kill, "p5");
        let before = controller.checkpoint();

        assert!(
            controller
                .handle(Action::targeted("p9", ActionType::Check, "p1"))
                .is_err()
        );
        assert_eq!(controller.checkpoint(), before);
    }

    // === Night Tests ===

    #[test]
    fn test_night_waits_for_werewolf_kill() {
        let mut controller = started();
        act(&mut controller, "p8", ActionType::Check, "p0");
        let snapshot = controller
            .handle(Action::targeted("p9", ActionType::Heal, "p4"))
            .unwrap();
        assert!(!snapshot.advanced);
        assert_eq!(snapshot.phase, Phase::Night);

        let snapshot = controller
            .handle(Action::targeted("p1", ActionType::Kill, "p4"))
            .unwrap();
        assert!(snapshot.advanced);
        assert_eq!(snapshot.phase, Phase::PolicemanSelection);
        assert_eq!(status(&controller, "p4"), PlayerStatus::Alive);
    }

    #[test]
    fn test_night_report_includes_inspection() {
        let mut controller = started();
        act(&mut controller, "p8", ActionType::Check, "p2");
        act(&mut controller, "p9", ActionType::Poison, "p3");
        act(&mut controller, "p0", ActionType::Kill, "p6");

        let report = controller.last_night().unwrap();
        assert_eq!(report.round, 1);
        assert_eq!(report.deaths, vec![id("p6"), id("p3")]);
        assert_eq!(
            report.inspection,
            Some(Inspection {
                seer: id("p8"),
                target: id("p2"),
                role: Some(Role::Werewolf),
            })
        );
        assert!(!controller.session().potions().poison);
        assert!(controller.session().potions().heal);
    }

    #[test]
    fn test_used_potion_is_rejected() {
        let mut controller = started();
        act(&mut controller, "p8", ActionType::Check, "p2");
        act(&mut controller, "p9", ActionType::Heal, "p5");
        act(&mut controller, "p0", ActionType::Kill, "p5");
        controller.expire_phase();
        controller.expire_phase();
        assert_eq!(controller.phase(), Phase::Night);
        assert_eq!(controller.round(), 2);

        assert_eq!(
            controller
                .handle(Action::targeted("p9", ActionType::Heal, "p5"))
                .unwrap_err(),
            GameError::PotionUsed(ActionType::Heal)
        );
    }

    // === Election Tests ===

    #[test]
    fn test_election_through_handle() {
        let mut controller = started();
        for p in ["p1", "p2", "p3", "p4", "p5", "p6", "p7", "p10", "p11"] {
            controller.roster.set_status(&id(p), PlayerStatus::Dead).unwrap();
        }
        act(&mut controller, "p8", ActionType::Check, "p0");
        act(&mut controller, "p9", ActionType::Heal, "p8");
        act(&mut controller, "p0", ActionType::Kill, "p8");
        assert_eq!(controller.phase(), Phase::PolicemanSelection);

        controller
            .handle(Action::untargeted("p8", ActionType::RunForPoliceman))
            .unwrap();
        assert_eq!(
            controller
                .handle(Action::targeted("p8", ActionType::VotePoliceman, "p8"))
                .unwrap_err(),
            GameError::IneligibleVoter(id("p8"))
        );
        act(&mut controller, "p0", ActionType::VotePoliceman, "p8");
        let snapshot = controller
            .handle(Action::targeted("p9", ActionType::VotePoliceman, "p8"))
            .unwrap();

        assert!(snapshot.advanced);
        assert_eq!(snapshot.phase, Phase::Day);
        assert!(snapshot.player(&id("p8")).unwrap().is_policeman);
        assert!(snapshot.players.iter().all(|p| !p.is_candidate));
    }

    #[test]
    fn test_void_election_still_reaches_day() {
        let mut controller = started();
        act(&mut controller, "p8", ActionType::Check, "p0");
        act(&mut controller, "p9", ActionType::Heal, "p8");
        act(&mut controller, "p0", ActionType::Kill, "p8");

        let snapshot = controller.expire_phase();
        assert_eq!(snapshot.phase, Phase::Day);
        assert!(controller.roster().policeman().is_none());
    }

    // === Day Tests ===

    #[test]
    fn test_day_vote_eliminates_and_starts_next_round() {
        let mut controller = started();
        act(&mut controller, "p8", ActionType::Check, "p0");
        act(&mut controller, "p9", ActionType::Heal, "p8");
        act(&mut controller, "p0", ActionType::Kill, "p8");
        controller.expire_phase();
        assert_eq!(controller.phase(), Phase::Day);

        let voters: Vec<PlayerId> = controller
            .roster()
            .alive_players()
            .map(|p| p.id.clone())
            .collect();
        for voter in &voters {
            let target = if voter.as_str() == "p0" { "p1" } else { "p0" };
            controller
                .handle(Action::new(voter.clone(), ActionType::Vote, Some(id(target))))
                .unwrap();
        }

        assert_eq!(controller.phase(), Phase::Night);
        assert_eq!(controller.round(), 2);
        assert_eq!(status(&controller, "p0"), PlayerStatus::Dead);
    }

    // === Transfer Tests ===

    #[test]
    fn test_dead_policeman_is_pending_transfer() {
        let mut controller = started();
        controller.roster.set_policeman(Some(&id("p5"))).unwrap();
        act(&mut controller, "p8", ActionType::Check, "p0");
        act(&mut controller, "p9", ActionType::Poison, "p1");
        act(&mut controller, "p0", ActionType::Kill, "p5");
        assert_eq!(controller.session().pending_transfer(), Some(&id("p5")));

        let snapshot = controller.transfer_policeman(&id("p5"), Some(&id("p6"))).unwrap();
        assert_eq!(snapshot.pending_transfer, None);
        assert!(snapshot.player(&id("p6")).unwrap().is_policeman);
        assert!(!snapshot.policeman_vacated);
    }

    #[test]
    fn test_transfer_without_target_vacates() {
        let mut controller = started();
        controller.roster.set_policeman(Some(&id("p5"))).unwrap();
        let snapshot = controller.transfer_policeman(&id("p5"), None).unwrap();
        assert!(snapshot.policeman_vacated);
        assert!(snapshot.players.iter().all(|p| !p.is_policeman));
    }

    // === Game Over Tests ===

    #[test]
    fn test_force_game_over_is_terminal() {
        let mut controller = started();
        let snapshot = controller.force_game_over();
        assert_eq!(snapshot.phase, Phase::GameOver);
        assert!(snapshot.advanced);
        assert_eq!(
            controller
                .handle(Action::untargeted("p4", ActionType::Sleep))
                .unwrap_err(),
            GameError::GameOver
        );
        assert_eq!(controller.expire_phase().phase, Phase::GameOver);
        assert!(!controller.force_game_over().advanced);
    }

    #[test]
    fn test_observer_can_end_game() {
        let mut controller = started();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        controller.set_observer(move |_phase: Phase, roster: &Roster| {
            seen.fetch_add(1, Ordering::SeqCst);
            if roster.alive_count() < 12 {
                HookDecision::EndGame
            } else {
                HookDecision::Continue
            }
        });

        act(&mut controller, "p8", ActionType::Check, "p0");
        act(&mut controller, "p9", ActionType::Heal, "p4");
        act(&mut controller, "p0", ActionType::Kill, "p5");

        assert_eq!(controller.phase(), Phase::GameOver);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn counting_observer(calls: &Arc<AtomicUsize>) -> impl RosterObserver + 'static {
        let seen = Arc::clone(calls);
        move |_phase: Phase, _roster: &Roster| {
            seen.fetch_add(1, Ordering::SeqCst);
            HookDecision::Continue
        }
    }

    #[test]
    fn test_observer_sees_dealing_and_candidacy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut controller = PhaseController::new(GameSettings::default());
        controller.set_observer(counting_observer(&calls));
        controller.start().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let calls = Arc::new(AtomicUsize::new(0));
        let mut controller = started();
        act(&mut controller, "p8", ActionType::Check, "p0");
        act(&mut controller, "p9", ActionType::Heal, "p8");
        act(&mut controller, "p0", ActionType::Kill, "p8");
        controller.set_observer(counting_observer(&calls));

        controller
            .handle(Action::untargeted("p8", ActionType::RunForPoliceman))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Nobody voted: the void election clears the candidacy flag.
        controller.expire_phase();
        assert_eq!(controller.phase(), Phase::Day);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_checkpoint_restores_state() {
        let mut controller = started();
        act(&mut controller, "p0", ActionType::Kill, "p5");
        let restored = PhaseController::from_checkpoint(controller.checkpoint());
        assert_eq!(restored.snapshot(), controller.snapshot());
        assert_eq!(restored.queue().len(), 1);
    }
}
