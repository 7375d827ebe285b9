//! Bot seat configuration.

use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// Bot seat configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Seat the bot plays
    pub player_id: PlayerId,

    /// Whether the bot stands in the policeman election
    pub runs_for_policeman: bool,

    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl BotConfig {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            runs_for_policeman: false,
            seed: None,
        }
    }

    /// One bot per seat `p0..p{n-1}`. Seats `p1` and `p2` run for policeman.
    pub fn for_table(player_count: usize, seed: Option<u64>) -> Vec<Self> {
        (0..player_count)
            .map(|i| Self {
                player_id: PlayerId::new(&format!("p{i}")),
                runs_for_policeman: i == 1 || i == 2,
                seed: seed.map(|s| s.wrapping_add(i as u64)),
            })
            .collect()
    }
}
