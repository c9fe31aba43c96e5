//! Stat changes and afflictions
//!
//! Both are newest-first lists keyed by id. Durations count owner turn
//! completions: an entry is removed once its counter drops below zero, so
//! `Turns(1)` survives one completion and is gone after the second.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::types::StatKind;

/// How long a status lasts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Duration {
    Turns(i32),
    Permanent,
}

impl Duration {
    /// Decrement once; true if the status is now expired
    pub fn tick(&mut self) -> bool {
        match self {
            Duration::Permanent => false,
            Duration::Turns(turns) => {
                *turns -= 1;
                *turns < 0
            }
        }
    }

    /// Turns from a fractional magnitude, rounded
    pub fn rounded(turns: f64) -> Self {
        Duration::Turns(turns.round() as i32)
    }
}

/// Arithmetic applied to a running stat value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatOp {
    Set(f64),
    Add(f64),
    Sub(f64),
    Mul(f64),
    Div(f64),
}

impl StatOp {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            StatOp::Set(v) => v,
            StatOp::Add(v) => value + v,
            StatOp::Sub(v) => value - v,
            StatOp::Mul(v) => value * v,
            StatOp::Div(v) if v != 0.0 => value / v,
            StatOp::Div(_) => value,
        }
    }
}

impl FromStr for StatOp {
    type Err = String;

    /// Parse `"*1.2"`, `"=40"`, `"-1"` and friends
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let op = chars.next().ok_or_else(|| "empty stat operation".to_string())?;
        let operand: f64 = chars
            .as_str()
            .trim()
            .parse()
            .map_err(|_| format!("bad operand in '{}'", s))?;
        match op {
            '=' => Ok(StatOp::Set(operand)),
            '+' => Ok(StatOp::Add(operand)),
            '-' => Ok(StatOp::Sub(operand)),
            '*' => Ok(StatOp::Mul(operand)),
            '/' => Ok(StatOp::Div(operand)),
            other => Err(format!("unknown operator '{}'", other)),
        }
    }
}

/// Timed or permanent modifier to one computed stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatChange {
    pub id: String,
    pub stat: StatKind,
    pub op: StatOp,
    pub duration: Duration,
}

impl StatChange {
    pub fn new(id: impl Into<String>, stat: StatKind, op: StatOp, duration: Duration) -> Self {
        Self {
            id: id.into(),
            stat,
            op,
            duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AfflictionKind {
    Asleep,
    Confused,
    Lockdown,
    Stunned,
    Recharging,
}

/// Timed boolean marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affliction {
    pub kind: AfflictionKind,
    pub duration: Duration,
}

/// Active statuses on one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    changes: Vec<StatChange>,
    afflictions: Vec<Affliction>,
}

impl StatusEffects {
    /// Insert at the front; any older entry with the same id is dropped
    pub fn apply(&mut self, change: StatChange) {
        self.changes.retain(|c| c.id != change.id);
        self.changes.insert(0, change);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.changes.len();
        self.changes.retain(|c| c.id != id);
        self.changes.len() != before
    }

    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    pub fn changes(&self) -> &[StatChange] {
        &self.changes
    }

    pub fn get(&self, id: &str) -> Option<&StatChange> {
        self.changes.iter().find(|c| c.id == id)
    }

    /// Fold every change for `stat` over `value` in list order
    pub fn modify(&self, stat: StatKind, value: f64) -> f64 {
        self.changes
            .iter()
            .filter(|c| c.stat == stat)
            .fold(value, |acc, c| c.op.apply(acc))
    }

    pub fn afflict(&mut self, kind: AfflictionKind, duration: Duration) {
        self.afflictions.retain(|a| a.kind != kind);
        self.afflictions.insert(0, Affliction { kind, duration });
    }

    pub fn is_afflicted(&self, kind: AfflictionKind) -> bool {
        self.afflictions.iter().any(|a| a.kind == kind)
    }

    pub fn cure(&mut self, kind: AfflictionKind) -> bool {
        let before = self.afflictions.len();
        self.afflictions.retain(|a| a.kind != kind);
        self.afflictions.len() != before
    }

    pub fn afflictions(&self) -> &[Affliction] {
        &self.afflictions
    }

    pub fn clear(&mut self) {
        self.changes.clear();
        self.afflictions.clear();
    }

    /// One owner-turn decrement; returns the ids of expired stat changes
    pub fn tick(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        self.changes.retain_mut(|c| {
            let done = c.duration.tick();
            if done {
                expired.push(c.id.clone());
            }
            !done
        });
        self.afflictions.retain_mut(|a| !a.duration.tick());
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(id: &str, op: StatOp, turns: i32) -> StatChange {
        StatChange::new(id, StatKind::Attack, op, Duration::Turns(turns))
    }

    #[test]
    fn test_parse_ops() {
        assert_eq!("*1.2".parse::<StatOp>(), Ok(StatOp::Mul(1.2)));
        assert_eq!("=40".parse::<StatOp>(), Ok(StatOp::Set(40.0)));
        assert_eq!("-1".parse::<StatOp>(), Ok(StatOp::Sub(1.0)));
        assert!("%3".parse::<StatOp>().is_err());
        assert!("*".parse::<StatOp>().is_err());
        assert!("".parse::<StatOp>().is_err());
    }

    #[test]
    fn test_same_id_replaces() {
        let mut s = StatusEffects::default();
        s.apply(change("boost", StatOp::Mul(2.0), 3));
        s.apply(change("boost", StatOp::Mul(3.0), 3));
        assert_eq!(s.changes().len(), 1);
        assert_eq!(s.modify(StatKind::Attack, 10.0), 30.0);
    }

    #[test]
    fn test_fold_in_list_order() {
        let mut s = StatusEffects::default();
        s.apply(change("a", StatOp::Add(5.0), 3));
        s.apply(change("b", StatOp::Mul(2.0), 3));
        // newest first: (10 * 2) + 5
        assert_eq!(s.modify(StatKind::Attack, 10.0), 25.0);
        s.apply(change("c", StatOp::Set(1.0), 3));
        // set discards the incoming value, later ops still apply
        assert_eq!(s.modify(StatKind::Attack, 10.0), 7.0);
        // other stats untouched
        assert_eq!(s.modify(StatKind::Defense, 10.0), 10.0);
    }

    #[test]
    fn test_one_turn_lifetime() {
        let mut s = StatusEffects::default();
        s.apply(change("short", StatOp::Mul(2.0), 1));
        assert!(s.tick().is_empty());
        assert!(s.get("short").is_some());
        assert_eq!(s.tick(), vec!["short".to_string()]);
        assert!(s.get("short").is_none());
    }

    #[test]
    fn test_permanent_never_expires() {
        let mut s = StatusEffects::default();
        s.apply(StatChange::new("sun", StatKind::Attack, StatOp::Mul(1.1), Duration::Permanent));
        for _ in 0..100 {
            s.tick();
        }
        assert!(s.get("sun").is_some());
    }

    #[test]
    fn test_afflictions_tick_and_dedupe() {
        let mut s = StatusEffects::default();
        s.afflict(AfflictionKind::Recharging, Duration::Turns(0));
        s.afflict(AfflictionKind::Recharging, Duration::Turns(1));
        assert_eq!(s.afflictions().len(), 1);
        s.tick();
        assert!(s.is_afflicted(AfflictionKind::Recharging));
        s.tick();
        assert!(!s.is_afflicted(AfflictionKind::Recharging));
    }

    #[test]
    fn test_divide_by_zero_is_noop() {
        assert_eq!(StatOp::Div(0.0).apply(12.0), 12.0);
        assert_eq!(StatOp::Div(4.0).apply(12.0), 3.0);
    }
}
