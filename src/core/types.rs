//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Index of an actor in a level's actor arena
///
/// Ids are handed out sequentially by the session so that replays with the
/// same seed produce the same ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[display(fmt = "#{}", _0)]
pub struct ActorId(pub u32);

/// Stable identity of a team
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display(fmt = "{}", _0)]
pub struct TeamName(pub String);

impl TeamName {
    pub const ALLIES: &'static str = "allies";
    pub const ENEMIES: &'static str = "enemies";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn allies() -> Self {
        Self::new(Self::ALLIES)
    }

    pub fn enemies() -> Self {
        Self::new(Self::ENEMIES)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TeamName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Who an action may be aimed at, relative to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Friend,
    Foe,
}

/// A stat that status effects can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Attack,
    Defense,
    Speed,
}

/// A stat that can receive effort investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvStat {
    Attack,
    Defense,
    Hp,
    Speed,
    Ability,
}

impl std::str::FromStr for EvStat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attack" => Ok(Self::Attack),
            "defense" => Ok(Self::Defense),
            "hp" => Ok(Self::Hp),
            "speed" => Ok(Self::Speed),
            "ability" => Ok(Self::Ability),
            other => Err(format!("unknown stat '{}'", other)),
        }
    }
}

/// Difficulty setting; biases generated enemy levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Standard,
    Hard,
}

impl Difficulty {
    /// Level offset applied on top of the strongest ally's level
    pub fn level_bias(&self) -> i32 {
        match self {
            Difficulty::Easy => -1,
            Difficulty::Standard => 0,
            Difficulty::Hard => 1,
        }
    }
}
