pub mod config;
pub mod dice;
pub mod error;
pub mod types;

pub use config::BattleConfig;
pub use dice::{RandomSource, ScriptedDice, SeededDice};
pub use error::{BattleError, Result};
pub use types::{ActorId, Difficulty, EvStat, StatKind, TargetType, TeamName};
