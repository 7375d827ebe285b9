use serde::{Deserialize, Serialize};

use super::{
    constants::{DEFAULT_PLAYER_COUNT, MAX_PLAYERS, MIN_PLAYERS},
    entities::Role,
};

/// Rules a session is dealt with.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSettings {
    pub player_count: usize,

    /// One role per seat; shuffled before dealing.
    pub distribution: Vec<Role>,

    /// Each witch potion can be used once per game.
    pub single_use_potions: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            player_count: DEFAULT_PLAYER_COUNT,
            distribution: Role::classic_distribution(),
            single_use_potions: true,
        }
    }
}

impl GameSettings {
    /// Classic proportions scaled to `player_count`: a third werewolves,
    /// one seer and one witch, villagers for the rest. Hunter and idiot
    /// join from 8 seats up.
    pub fn for_players(player_count: usize) -> Self {
        if player_count == DEFAULT_PLAYER_COUNT {
            return Self::default();
        }

        let werewolves = (player_count / 3).max(1);
        let mut distribution = vec![Role::Werewolf; werewolves];
        let mut specials = vec![Role::Seer, Role::Witch];
        if player_count >= 8 {
            specials.extend([Role::Hunter, Role::Idiot]);
        }
        for role in specials {
            if distribution.len() < player_count {
                distribution.push(role);
            }
        }
        distribution.resize(player_count.max(distribution.len()), Role::Villager);

        Self {
            player_count,
            distribution,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.player_count < MIN_PLAYERS {
            return Err(format!("player_count must be at least {MIN_PLAYERS}"));
        }
        if self.player_count > MAX_PLAYERS {
            return Err(format!("player_count must be at most {MAX_PLAYERS}"));
        }
        if self.distribution.len() != self.player_count {
            return Err(format!(
                "distribution has {} roles for {} players",
                self.distribution.len(),
                self.player_count
            ));
        }
        if !self.distribution.contains(&Role::Werewolf) {
            return Err("distribution needs at least one werewolf".to_string());
        }
        Ok(())
    }
}
