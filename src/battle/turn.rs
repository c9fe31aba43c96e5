//! Team turn bookkeeping
//!
//! The manager only tracks state: whose turn it is, which units have
//! signalled completion, the round counter and whether a team turn start
//! is queued. The transitions themselves live on `Session` because they
//! run hooks, weather and the AI.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::ActorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    #[default]
    Idle,
    Active,
    Complete,
}

#[derive(Debug, Clone, Default)]
pub struct TurnManager {
    /// Index of the current team in the level's team list
    current: usize,
    phase: TurnPhase,
    completed: BTreeSet<ActorId>,
    round: u32,
    /// A team turn start waits to be drained
    pending_start: bool,
    /// The last round ended; the next team turn opens a new one
    round_over: bool,
    turns_started: u64,
}

impl TurnManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn turns_started(&self) -> u64 {
        self.turns_started
    }

    pub fn has_completed(&self, id: ActorId) -> bool {
        self.completed.contains(&id)
    }

    pub fn completed(&self) -> &BTreeSet<ActorId> {
        &self.completed
    }

    /// Record a completion signal; false if the unit already signalled
    pub fn mark_completed(&mut self, id: ActorId) -> bool {
        self.completed.insert(id)
    }

    /// True once every listed member has signalled
    pub fn all_completed(&self, members: &[ActorId]) -> bool {
        members.iter().all(|m| self.completed.contains(m))
    }

    pub(crate) fn begin(&mut self) {
        self.phase = TurnPhase::Active;
        self.completed.clear();
        self.turns_started += 1;
    }

    pub(crate) fn complete(&mut self) {
        self.phase = TurnPhase::Complete;
    }

    /// Move to `index` and queue its start
    pub(crate) fn queue_start(&mut self, index: usize) {
        self.current = index;
        self.completed.clear();
        self.pending_start = true;
    }

    pub(crate) fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending_start)
    }

    pub fn is_pending(&self) -> bool {
        self.pending_start
    }

    pub(crate) fn set_current(&mut self, index: usize) {
        self.current = index;
    }

    pub(crate) fn close_round(&mut self) {
        self.round_over = true;
    }

    /// True before the first round and after every round end
    pub(crate) fn take_round_start(&mut self) -> bool {
        self.round == 0 || std::mem::take(&mut self.round_over)
    }

    pub(crate) fn next_round(&mut self) -> u32 {
        self.round_over = false;
        self.round += 1;
        self.round
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_signal_is_noop() {
        let mut turn = TurnManager::new();
        turn.begin();
        assert!(turn.mark_completed(ActorId(1)));
        assert!(!turn.mark_completed(ActorId(1)));
        assert!(turn.all_completed(&[ActorId(1)]));
        assert!(!turn.all_completed(&[ActorId(1), ActorId(2)]));
    }

    #[test]
    fn test_queue_and_take() {
        let mut turn = TurnManager::new();
        turn.queue_start(2);
        assert_eq!(turn.current(), 2);
        assert!(turn.is_pending());
        assert!(turn.take_pending());
        assert!(!turn.take_pending());
    }

    #[test]
    fn test_round_start_only_after_close() {
        let mut turn = TurnManager::new();
        assert!(turn.take_round_start());
        turn.next_round();
        assert!(!turn.take_round_start());
        turn.close_round();
        assert!(turn.take_round_start());
        assert!(!turn.take_round_start());
    }

    #[test]
    fn test_begin_clears_completed() {
        let mut turn = TurnManager::new();
        turn.begin();
        turn.mark_completed(ActorId(3));
        turn.complete();
        assert_eq!(turn.phase(), TurnPhase::Complete);
        turn.begin();
        assert_eq!(turn.phase(), TurnPhase::Active);
        assert!(turn.completed().is_empty());
        assert_eq!(turn.turns_started(), 2);
    }
}
