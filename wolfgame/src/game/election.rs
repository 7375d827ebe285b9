use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    entities::PlayerId,
    errors::{GameError, GameResult},
    roster::Roster,
};

/// Candidacy and vote tally for the policeman badge.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElectionManager {
    /// Registration order; ties are broken by it.
    candidates: Vec<PlayerId>,
    votes: HashMap<PlayerId, PlayerId>,
}

impl ElectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn candidates(&self) -> &[PlayerId] {
        &self.candidates
    }

    #[must_use]
    pub fn is_candidate(&self, player_id: &PlayerId) -> bool {
        self.candidates.contains(player_id)
    }

    #[must_use]
    pub fn has_voted(&self, voter: &PlayerId) -> bool {
        self.votes.contains_key(voter)
    }

    #[must_use]
    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn check_candidacy(&self, player_id: &PlayerId) -> GameResult<()> {
        if self.is_candidate(player_id) {
            return Err(GameError::AlreadyCandidate(player_id.clone()));
        }
        Ok(())
    }

    pub fn check_vote(&self, voter: &PlayerId, candidate: &PlayerId) -> GameResult<()> {
        if self.is_candidate(voter) {
            return Err(GameError::IneligibleVoter(voter.clone()));
        }
        if !self.is_candidate(candidate) {
            return Err(GameError::UnknownCandidate(candidate.clone()));
        }
        Ok(())
    }

    /// Registers `player_id` and withdraws any vote they had cast.
    pub fn register_candidacy(
        &mut self,
        roster: &mut Roster,
        player_id: &PlayerId,
    ) -> GameResult<()> {
        self.check_candidacy(player_id)?;
        roster.set_candidate(player_id, true)?;
        self.votes.remove(player_id);
        self.candidates.push(player_id.clone());
        Ok(())
    }

    /// Records `voter -> candidate`, returning the vote it replaced.
    pub fn register_vote(
        &mut self,
        voter: &PlayerId,
        candidate: &PlayerId,
    ) -> GameResult<Option<PlayerId>> {
        self.check_vote(voter, candidate)?;
        Ok(self.votes.insert(voter.clone(), candidate.clone()))
    }

    /// Vote counts per candidate in registration order.
    #[must_use]
    pub fn tally(&self) -> Vec<(PlayerId, usize)> {
        self.candidates
            .iter()
            .map(|c| (c.clone(), self.votes.values().filter(|v| *v == c).count()))
            .collect()
    }

    /// The leading candidate; on a tie the earliest registered one.
    pub fn winner(&self) -> GameResult<PlayerId> {
        if self.candidates.is_empty() {
            return Err(GameError::NoCandidates);
        }
        if self.votes.is_empty() {
            return Err(GameError::NoVotes);
        }

        let mut best: Option<(PlayerId, usize)> = None;
        for (candidate, count) in self.tally() {
            if best.as_ref().is_none_or(|(_, top)| count > *top) {
                best = Some((candidate, count));
            }
        }
        best.map(|(id, _)| id).ok_or(GameError::NoCandidates)
    }

    /// Pins the badge on the winner and clears candidacy flags. On error the
    /// roster is untouched.
    pub fn finalize(&self, roster: &mut Roster) -> GameResult<PlayerId> {
        let winner = self.winner()?;
        roster.set_policeman(Some(&winner))?;
        roster.clear_candidates();
        Ok(winner)
    }
}

/// Hands the badge from `from` to `to`, or retires it when `to` is `None`.
pub fn transfer(roster: &mut Roster, from: &PlayerId, to: Option<&PlayerId>) -> GameResult<()> {
    if !roster.get(from)?.is_policeman {
        return Err(GameError::NotPoliceman(from.clone()));
    }
    if let Some(to) = to
        && !roster.get(to)?.is_alive()
    {
        return Err(GameError::DeadPlayer(to.clone()));
    }
    roster.set_policeman(to)
}
