//! Player-facing game errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{ActionType, Phase, PlayerId, Role};

/// Errors returned by the game core. Every variant renders a message that
/// can be shown to the player as-is.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("{0} is dead and can't act")]
    DeadPlayer(PlayerId),
    #[error("{0} is already dead")]
    DeadTarget(PlayerId),
    #[error("roles are already assigned")]
    AlreadyAssigned,
    #[error("roles haven't been assigned yet")]
    RolesNotAssigned,
    #[error("{got} roles can't be dealt to {expected} players")]
    InvalidDistribution { expected: usize, got: usize },
    #[error("{0} is running for policeman and can't vote")]
    IneligibleVoter(PlayerId),
    #[error("{0} isn't running for policeman")]
    UnknownCandidate(PlayerId),
    #[error("{0} is already running for policeman")]
    AlreadyCandidate(PlayerId),
    #[error("nobody is running for policeman")]
    NoCandidates,
    #[error("no policeman votes were cast")]
    NoVotes,
    #[error("can't {action} during {phase}")]
    ActionNotAllowed { action: ActionType, phase: Phase },
    #[error("a {role} can't {action}")]
    RoleCannotAct { role: Role, action: ActionType },
    #[error("{0} needs a target")]
    MissingTarget(ActionType),
    #[error("{0} isn't the policeman")]
    NotPoliceman(PlayerId),
    #[error("the {0} potion is already used")]
    PotionUsed(ActionType),
    #[error("game is over")]
    GameOver,
    #[error("can't move from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },
}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_player() {
        let err = GameError::DeadPlayer("p4".into());
        assert_eq!(err.to_string(), "p4 is dead and can't act");

        let err = GameError::DeadTarget("p5".into());
        assert_eq!(err.to_string(), "p5 is already dead");

        let err = GameError::IneligibleVoter("p1".into());
        assert!(err.to_string().contains("p1"));
    }

    #[test]
    fn test_action_not_allowed_message() {
        let err = GameError::ActionNotAllowed {
            action: ActionType::Kill,
            phase: Phase::Day,
        };
        assert_eq!(err.to_string(), "can't kill during day");
    }

    #[test]
    fn test_error_round_trips_through_json() {
        let err = GameError::InvalidDistribution {
            expected: 12,
            got: 11,
        };
        let json = serde_json::to_string(&err).unwrap();
        let parsed: GameError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }
}
