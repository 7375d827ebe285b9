use serde::{Deserialize, Deserializer, Serialize};
use std::{borrow::Borrow, fmt};

use super::constants;

/// Stable identifier of a seat in a session (e.g. `p0`).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        let mut id: String = s.trim().chars().filter(|c| !c.is_control()).collect();
        id.truncate(constants::MAX_PLAYER_ID_LENGTH);
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Werewolf,
    Villager,
    Seer,
    Witch,
    Hunter,
    Idiot,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Self::Werewolf,
        Self::Villager,
        Self::Seer,
        Self::Witch,
        Self::Hunter,
        Self::Idiot,
    ];

    /// The classic 12 seat deal: 4 werewolves, 4 villagers and one of each
    /// special role.
    #[must_use]
    pub fn classic_distribution() -> Vec<Role> {
        let mut roles = vec![Self::Werewolf; 4];
        roles.extend([Self::Villager; 4]);
        roles.extend([Self::Seer, Self::Witch, Self::Hunter, Self::Idiot]);
        roles
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Werewolf => "werewolf",
            Self::Villager => "villager",
            Self::Seer => "seer",
            Self::Witch => "witch",
            Self::Hunter => "hunter",
            Self::Idiot => "idiot",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    #[default]
    Alive,
    Dead,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Setup,
    Night,
    PolicemanSelection,
    Day,
    /// Reserved for a dedicated voting stage. No transition enters it;
    /// day votes are collected during `Day`.
    Voting,
    GameOver,
}

impl Phase {
    /// Whether `self -> next` is an edge of the phase graph.
    ///
    /// ```text
    /// SETUP -> NIGHT -> POLICEMAN_SELECTION -> DAY -> NIGHT -> ...
    ///                \-------------------> DAY
    /// any -> GAME_OVER
    /// ```
    #[must_use]
    pub fn can_transition_to(self, next: Phase) -> bool {
        match (self, next) {
            (Self::GameOver, _) => false,
            (_, Self::GameOver) => true,
            (Self::Setup, Self::Night) => true,
            (Self::Night, Self::PolicemanSelection | Self::Day) => true,
            (Self::PolicemanSelection, Self::Day) => true,
            (Self::Day, Self::Night) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Setup => "setup",
            Self::Night => "night",
            Self::PolicemanSelection => "policeman selection",
            Self::Day => "day",
            Self::Voting => "voting",
            Self::GameOver => "game over",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Kill,
    Heal,
    Poison,
    Check,
    Sleep,
    RunForPoliceman,
    VotePoliceman,
    Vote,
}

impl ActionType {
    /// The phase this kind of action is submitted in.
    #[must_use]
    pub fn phase(self) -> Phase {
        match self {
            Self::Kill | Self::Heal | Self::Poison | Self::Check | Self::Sleep => Phase::Night,
            Self::RunForPoliceman | Self::VotePoliceman => Phase::PolicemanSelection,
            Self::Vote => Phase::Day,
        }
    }

    /// The role an actor must hold to submit this action, if any.
    #[must_use]
    pub fn required_role(self) -> Option<Role> {
        match self {
            Self::Kill => Some(Role::Werewolf),
            Self::Check => Some(Role::Seer),
            Self::Heal | Self::Poison => Some(Role::Witch),
            Self::Sleep | Self::RunForPoliceman | Self::VotePoliceman | Self::Vote => None,
        }
    }

    #[must_use]
    pub fn requires_target(self) -> bool {
        match self {
            Self::Kill
            | Self::Heal
            | Self::Poison
            | Self::Check
            | Self::VotePoliceman
            | Self::Vote => true,
            Self::Sleep | Self::RunForPoliceman => false,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Kill => "kill",
            Self::Heal => "heal",
            Self::Poison => "poison",
            Self::Check => "check",
            Self::Sleep => "sleep",
            Self::RunForPoliceman => "run_for_policeman",
            Self::VotePoliceman => "vote_policeman",
            Self::Vote => "vote",
        };
        write!(f, "{repr}")
    }
}

/// A submitted player intent.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Action {
    pub player_id: PlayerId,
    pub action_type: ActionType,
    #[serde(default)]
    pub target_id: Option<PlayerId>,
    /// Set once the action passed validation and entered the queue.
    #[serde(default)]
    pub accepted: bool,
}

impl Action {
    pub fn new(player_id: PlayerId, action_type: ActionType, target_id: Option<PlayerId>) -> Self {
        Self {
            player_id,
            action_type,
            target_id,
            accepted: false,
        }
    }

    pub fn targeted(player_id: &str, action_type: ActionType, target_id: &str) -> Self {
        Self::new(player_id.into(), action_type, Some(target_id.into()))
    }

    pub fn untargeted(player_id: &str, action_type: ActionType) -> Self {
        Self::new(player_id.into(), action_type, None)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target_id {
            Some(target) => write!(f, "{} {} {}", self.player_id, self.action_type, target),
            None => write!(f, "{} {}", self.player_id, self.action_type),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub(crate) role: Option<Role>,
    pub(crate) status: PlayerStatus,
    pub is_policeman: bool,
    pub is_candidate: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            role: None,
            status: PlayerStatus::Alive,
            is_policeman: false,
            is_candidate: false,
        }
    }

    /// `None` until roles are dealt.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    #[must_use]
    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }
}

/// The witch's once-per-game potions.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WitchPotions {
    pub heal: bool,
    pub poison: bool,
}

impl Default for WitchPotions {
    fn default() -> Self {
        Self {
            heal: true,
            poison: true,
        }
    }
}

impl WitchPotions {
    #[must_use]
    pub fn any_left(&self) -> bool {
        self.heal || self.poison
    }

    #[must_use]
    pub fn has(&self, action_type: ActionType) -> bool {
        match action_type {
            ActionType::Heal => self.heal,
            ActionType::Poison => self.poison,
            _ => false,
        }
    }
}

/// A status mutation produced by a resolver for the controller to apply.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatusChange {
    pub player_id: PlayerId,
    pub status: PlayerStatus,
}

impl StatusChange {
    pub fn dead(player_id: &PlayerId) -> Self {
        Self {
            player_id: player_id.clone(),
            status: PlayerStatus::Dead,
        }
    }
}

/// What the seer learned during the night.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Inspection {
    pub seer: PlayerId,
    pub target: PlayerId,
    pub role: Option<Role>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub name: String,
    pub role: Option<Role>,
    pub status: PlayerStatus,
    pub is_policeman: bool,
    pub is_candidate: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id.clone(),
            name: player.name.clone(),
            role: player.role,
            status: player.status,
            is_policeman: player.is_policeman,
            is_candidate: player.is_candidate,
        }
    }
}

impl PlayerView {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }
}
