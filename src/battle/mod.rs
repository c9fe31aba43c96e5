//! Battle system - levels, teams and the turn cycle
//!
//! A `Level` holds the grid, the actors and the team rotation. Everything
//! that changes a level is a method on `Session`, split by concern:
//! - `flow`: unit and team turn signals, defeat bookkeeping, commands
//! - `movement`: move queries, walking, approach-and-attack
//! - `selection`: pending tile picks
//! - `field`: traps, exits, pads, pickups and dialogue
//! - `weather`: round-scoped conditions
//! - `ai`: synchronous computer turns
//! - `spawn`: level files, roster placement, hotseat setup

pub mod ai;
pub mod events;
pub mod field;
pub mod flags;
pub mod flow;
pub mod level;
pub mod movement;
pub mod selection;
pub mod spawn;
pub mod team;
pub mod turn;
pub mod weather;

// Re-exports for convenient access
pub use events::{BattleEvent, NullSink, PresentationSink, TraceSink};
pub use flags::Flags;
pub use level::{Level, Outcome, WinCondition};
pub use selection::{SelectionPurpose, TileRequest};
pub use spawn::{LevelSpec, ObjectKind, ObjectSpec, SpawnZone, TeamSpec, TileFlagSpec, UnitSpec};
pub use team::{Controller, Team};
pub use turn::{TurnManager, TurnPhase};
pub use weather::{Weather, WeatherChances};
