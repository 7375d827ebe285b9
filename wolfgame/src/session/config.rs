//! Session configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{GameSettings, constants::DEFAULT_PHASE_TIMEOUT_SECS};

const MAX_NAME_LENGTH: usize = 64;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Display name
    pub name: String,

    /// Seats and role deal
    #[serde(default)]
    pub settings: GameSettings,

    /// Seconds a phase may stay open before it is resolved with defaults
    /// (0 disables the deadline)
    #[serde(default = "default_phase_timeout")]
    pub phase_timeout_secs: u64,
}

fn default_phase_timeout() -> u64 {
    DEFAULT_PHASE_TIMEOUT_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "Village".to_string(),
            settings: GameSettings::default(),
            phase_timeout_secs: DEFAULT_PHASE_TIMEOUT_SECS,
        }
    }
}

impl SessionConfig {
    pub fn named(name: &str, player_count: usize) -> Self {
        Self {
            name: name.to_string(),
            settings: GameSettings::for_players(player_count),
            ..Self::default()
        }
    }

    pub fn phase_timeout(&self) -> Option<Duration> {
        (self.phase_timeout_secs > 0).then(|| Duration::from_secs(self.phase_timeout_secs))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Session name cannot be empty".to_string());
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(format!(
                "Session name cannot exceed {MAX_NAME_LENGTH} characters"
            ));
        }
        self.settings.validate()
    }
}
