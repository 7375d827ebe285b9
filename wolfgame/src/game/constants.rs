/// Seats in the classic deal.
pub const DEFAULT_PLAYER_COUNT: usize = 12;

pub const MIN_PLAYERS: usize = 3;

pub const MAX_PLAYERS: usize = 24;

pub const MAX_PLAYER_ID_LENGTH: usize = 32;

/// Seconds a phase may stay open before defaults are applied.
pub const DEFAULT_PHASE_TIMEOUT_SECS: u64 = 120;
