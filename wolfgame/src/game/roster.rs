use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::{
    entities::{Player, PlayerId, PlayerStatus, Role},
    errors::{GameError, GameResult},
};

/// The fixed set of seats in a session, in seat order.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Roster {
    players: Vec<Player>,
    roles_assigned: bool,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            players,
            roles_assigned: false,
        }
    }

    /// Seats `p0..p{n-1}` named "Player 1".."Player n".
    pub fn with_size(n: usize) -> Self {
        let players = (0..n)
            .map(|i| Player::new(PlayerId::new(&format!("p{i}")), &format!("Player {}", i + 1)))
            .collect();
        Self::new(players)
    }

    /// Builds a roster from pre-dealt roles, e.g. a table dealt by hand.
    pub fn from_assignments(assignments: Vec<(PlayerId, Role)>) -> Self {
        let players = assignments
            .into_iter()
            .enumerate()
            .map(|(i, (id, role))| {
                let mut player = Player::new(id, &format!("Player {}", i + 1));
                player.role = Some(role);
                player
            })
            .collect();
        Self {
            players,
            roles_assigned: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[must_use]
    pub fn roles_assigned(&self) -> bool {
        self.roles_assigned
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    pub fn players_with_role(&self, role: Role) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.role == Some(role))
    }

    pub fn assign_roles(&mut self, distribution: &[Role]) -> GameResult<()> {
        self.assign_roles_with(distribution, &mut rand::rng())
    }

    /// Shuffles `distribution` with `rng` and deals one role per seat.
    pub fn assign_roles_with<R: Rng + ?Sized>(
        &mut self,
        distribution: &[Role],
        rng: &mut R,
    ) -> GameResult<()> {
        if self.roles_assigned {
            return Err(GameError::AlreadyAssigned);
        }
        if distribution.len() != self.players.len() {
            return Err(GameError::InvalidDistribution {
                expected: self.players.len(),
                got: distribution.len(),
            });
        }

        let mut roles = distribution.to_vec();
        roles.shuffle(rng);
        for (player, role) in self.players.iter_mut().zip(roles) {
            player.role = Some(role);
        }
        self.roles_assigned = true;
        Ok(())
    }

    pub fn get(&self, player_id: &PlayerId) -> GameResult<&Player> {
        self.players
            .iter()
            .find(|p| p.id == *player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.clone()))
    }

    fn get_mut(&mut self, player_id: &PlayerId) -> GameResult<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == *player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.clone()))
    }

    #[must_use]
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.players.iter().any(|p| p.id == *player_id)
    }

    /// Whether any living player holds `role`.
    #[must_use]
    pub fn alive(&self, role: Role) -> bool {
        self.alive_players().any(|p| p.role == Some(role))
    }

    /// Returns whether the status actually changed. Death is permanent, so
    /// reviving a dead player is ignored.
    pub fn set_status(&mut self, player_id: &PlayerId, status: PlayerStatus) -> GameResult<bool> {
        let player = self.get_mut(player_id)?;
        if player.status == status || player.status == PlayerStatus::Dead {
            return Ok(false);
        }
        player.status = status;
        Ok(true)
    }

    pub fn policeman(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_policeman)
    }

    /// Clears the badge everywhere, then pins it on `player_id` if given.
    pub fn set_policeman(&mut self, player_id: Option<&PlayerId>) -> GameResult<()> {
        if let Some(id) = player_id {
            self.get(id)?;
        }
        for player in &mut self.players {
            player.is_policeman = player_id.is_some_and(|id| player.id == *id);
        }
        Ok(())
    }

    pub fn set_candidate(&mut self, player_id: &PlayerId, is_candidate: bool) -> GameResult<()> {
        self.get_mut(player_id)?.is_candidate = is_candidate;
        Ok(())
    }

    pub fn clear_candidates(&mut self) {
        for player in &mut self.players {
            player.is_candidate = false;
        }
    }
}
