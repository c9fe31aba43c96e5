//! Battle events and the presentation sink
//!
//! The engine never draws or waits. Everything a front end might show is
//! emitted as a `BattleEvent`, both into the session's own log and to the
//! installed `PresentationSink`.

use serde::{Deserialize, Serialize};

use crate::battle::weather::Weather;
use crate::combat::AttackOutcome;
use crate::core::types::{ActorId, TeamName};
use crate::grid::{Coord, HighlightTag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    LevelStarted {
        name: String,
    },
    LevelEnded {
        name: String,
    },
    RoundStarted {
        round: u32,
    },
    RoundEnded {
        round: u32,
    },
    TurnStarted {
        team: TeamName,
        round: u32,
    },
    TurnEnded {
        team: TeamName,
    },
    WeatherChanged {
        weather: Weather,
    },
    UnitMoved {
        id: ActorId,
        from: Coord,
        to: Coord,
    },
    HpChanged {
        id: ActorId,
        hp: i32,
        max_hp: i32,
    },
    Attacked {
        attacker: ActorId,
        defender: ActorId,
        outcome: AttackOutcome,
    },
    AbilityUsed {
        id: ActorId,
        ability: String,
    },
    StatusExpired {
        id: ActorId,
        change: String,
    },
    Defeated {
        id: ActorId,
        by: Option<ActorId>,
    },
    TeamEliminated {
        team: TeamName,
    },
    Victory {
        team: TeamName,
    },
    Draw,
    LevelUp {
        id: ActorId,
        level: u32,
    },
    Recruitable {
        id: ActorId,
    },
    ItemObtained {
        item: String,
    },
    HighlightsRequested {
        tiles: Vec<Coord>,
        tag: HighlightTag,
    },
    HighlightsCleared,
    Dialogue {
        speaker: String,
        lines: Vec<String>,
    },
    ActorHidden {
        id: ActorId,
    },
    ActorRevealed {
        id: ActorId,
        at: Coord,
    },
    ExitReached {
        index: u32,
    },
    /// Pacing hint before an AI unit acts
    AiStep {
        id: ActorId,
        delay_ms: u64,
    },
}

/// Receiver for presentation events
pub trait PresentationSink {
    fn on_event(&mut self, event: &BattleEvent);
}

/// Sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn on_event(&mut self, _: &BattleEvent) {}
}

/// Sink that forwards events to `tracing` at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceSink;

impl PresentationSink for TraceSink {
    fn on_event(&mut self, event: &BattleEvent) {
        tracing::debug!(?event, "presentation");
    }
}
