//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::{Ipv4Addr, SocketAddr};
use wolfgame::{
    GameSettings,
    constants::{DEFAULT_PHASE_TIMEOUT_SECS, MAX_PLAYERS, MIN_PLAYERS},
    session::SessionConfig,
};

const DEFAULT_PORT: u16 = 6969;
const MAX_INITIAL_SESSIONS: usize = 64;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Defaults for sessions created without explicit settings
    pub session_defaults: SessionDefaultsConfig,
    /// Number of sessions to create on startup
    pub num_sessions: usize,
}

/// Default session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaultsConfig {
    /// Seats per session
    pub player_count: usize,
    /// Seconds before an open phase is resolved with defaults (0 disables)
    pub phase_timeout_secs: u64,
    /// Whether each witch potion can be used once per game
    pub single_use_potions: bool,
}

impl Default for SessionDefaultsConfig {
    fn default() -> Self {
        Self {
            player_count: GameSettings::default().player_count,
            phase_timeout_secs: DEFAULT_PHASE_TIMEOUT_SECS,
            single_use_potions: true,
        }
    }
}

impl SessionDefaultsConfig {
    /// Build a session config from these defaults, letting a request override
    /// the name and seat count.
    pub fn session_config(&self, name: &str, player_count: Option<usize>) -> SessionConfig {
        let mut settings = GameSettings::for_players(player_count.unwrap_or(self.player_count));
        settings.single_use_potions = self.single_use_potions;
        SessionConfig {
            name: name.to_string(),
            settings,
            phase_timeout_secs: self.phase_timeout_secs,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            session_defaults: SessionDefaultsConfig::default(),
            num_sessions: 1,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `num_sessions_override` - Optional number of sessions override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `SERVER_BIND` is set but isn't a socket address
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        num_sessions_override: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not an IP:PORT address"),
                })?,
                Err(_) => defaults.bind,
            },
        };

        let session_defaults = SessionDefaultsConfig {
            player_count: parse_env_or(
                "SESSION_PLAYER_COUNT",
                defaults.session_defaults.player_count,
            ),
            phase_timeout_secs: parse_env_or(
                "SESSION_PHASE_TIMEOUT_SECS",
                defaults.session_defaults.phase_timeout_secs,
            ),
            single_use_potions: parse_env_or(
                "SESSION_SINGLE_USE_POTIONS",
                defaults.session_defaults.single_use_potions,
            ),
        };

        let num_sessions = num_sessions_override
            .unwrap_or_else(|| parse_env_or("INITIAL_SESSIONS", defaults.num_sessions));

        Ok(ServerConfig {
            bind,
            session_defaults,
            num_sessions,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let player_count = self.session_defaults.player_count;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(ConfigError::Invalid {
                var: "SESSION_PLAYER_COUNT".to_string(),
                reason: format!("Must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            });
        }

        if self.num_sessions > MAX_INITIAL_SESSIONS {
            return Err(ConfigError::Invalid {
                var: "INITIAL_SESSIONS".to_string(),
                reason: format!("Must be at most {MAX_INITIAL_SESSIONS}"),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
