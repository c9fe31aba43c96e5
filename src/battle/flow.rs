//! Turn lifecycle and player commands
//!
//! Units signal completion; once every living member of the active team has
//! signalled, the team turn ends and the next one is queued. Queued starts
//! are drained by `pump_turns` at the end of each command, so an AI team
//! finishing its turn never starts the following one from inside itself.

use tracing::{debug, info, warn};

use crate::battle::events::BattleEvent;
use crate::battle::level::{Outcome, WinCondition};
use crate::battle::turn::TurnPhase;
use crate::core::error::{BattleError, Result};
use crate::core::types::{ActorId, TeamName};
use crate::session::Session;

impl Session {
    // === TURN SIGNALS ===

    /// Keep stock actions from ending this unit's turn
    pub fn suppress_auto_end_turn(&mut self, id: ActorId) {
        if let Some(animal) = self.animal_mut(id) {
            animal.auto_end_turn = false;
        }
    }

    pub fn allow_auto_end_turn(&mut self, id: ActorId) {
        if let Some(animal) = self.animal_mut(id) {
            animal.auto_end_turn = true;
        }
    }

    /// The next automatic turn end is skipped once
    pub fn grant_bonus_action(&mut self, id: ActorId) {
        if let Some(animal) = self.animal_mut(id) {
            animal.ability_state.bonus_action = true;
        }
    }

    /// End the unit's turn unless that is suppressed; true if it ended
    pub fn try_finishing(&mut self, id: ActorId) -> bool {
        let Some(animal) = self.animal_mut(id) else {
            return false;
        };
        if !animal.auto_end_turn {
            return false;
        }
        if animal.ability_state.bonus_action {
            animal.ability_state.bonus_action = false;
            debug!("{} keeps acting", id);
            return false;
        }
        self.finish_unit_turn(id);
        true
    }

    /// Completion signal for one unit of the active team
    ///
    /// The first signal of a team turn ticks the unit's statuses; repeats
    /// are no-ops.
    pub fn finish_unit_turn(&mut self, id: ActorId) {
        let Ok(level) = self.level_mut() else {
            return;
        };
        let Some(team) = level.animal(id).and_then(|a| a.team.clone()) else {
            return;
        };
        if !level.is_current_team(&team) || level.turn.phase() != TurnPhase::Active {
            return;
        }
        if !level.turn.mark_completed(id) {
            return;
        }
        let expired = match level.animal_mut(id) {
            Some(animal) => {
                animal.moved = true;
                animal.statuses.tick()
            }
            None => Vec::new(),
        };
        if self.is_selecting(id) {
            self.cancel_selection();
        }
        for change in expired {
            self.emit(BattleEvent::StatusExpired { id, change });
        }
        debug!("{} is done", id);
        self.check_team_completion();
    }

    fn check_team_completion(&mut self) {
        let Ok(level) = self.level() else {
            return;
        };
        if level.turn.phase() != TurnPhase::Active || level.is_over() {
            return;
        }
        let done = level
            .current_team()
            .map(|t| level.turn.all_completed(t.members()))
            .unwrap_or(false);
        if done {
            self.complete_team_turn();
        }
    }

    fn complete_team_turn(&mut self) {
        self.cancel_selection();
        let Ok(level) = self.level_mut() else {
            return;
        };
        level.turn.complete();
        let Some(team) = level.current_team().map(|t| t.name.clone()) else {
            return;
        };
        let count = level.teams.len();
        let current = level.turn.current();
        info!("{} finished their turn", team);
        self.emit(BattleEvent::TurnEnded { team: team.clone() });

        if count == 1 {
            self.restart_turn();
            return;
        }
        let wraps = current + 1 >= count;
        let following = self.team_after(&team);
        if wraps {
            self.end_round();
        }
        let Ok(level) = self.level_mut() else {
            return;
        };
        if level.is_over() || level.teams.is_empty() {
            return;
        }
        let next = following
            .and_then(|name| level.team_index(&name))
            .unwrap_or(0);
        level.turn.queue_start(next);
    }

    fn team_after(&self, team: &TeamName) -> Option<TeamName> {
        let level = self.level().ok()?;
        let index = level.team_index(team)?;
        let next = (index + 1) % level.teams.len();
        Some(level.teams[next].name.clone())
    }

    /// Single remaining team goes again with fresh members and no round hooks
    fn restart_turn(&mut self) {
        let Ok(level) = self.level_mut() else {
            return;
        };
        level.turn.begin();
        let round = level.turn.round();
        let Some(team) = level.current_team().map(|t| t.name.clone()) else {
            return;
        };
        self.refresh_members(&team);
        self.emit(BattleEvent::TurnStarted { team, round });
    }

    fn refresh_members(&mut self, team: &TeamName) {
        let members = self
            .level()
            .ok()
            .and_then(|l| l.team(team))
            .map(|t| t.members().to_vec())
            .unwrap_or_default();
        for id in members {
            if let Some(animal) = self.animal_mut(id) {
                animal.moved = false;
                animal.auto_end_turn = true;
                animal.ability_state.bonus_action = false;
            }
            self.dispel_fog(id);
        }
    }

    /// Drain queued team turn starts
    pub(crate) fn pump_turns(&mut self) {
        let cap = self.config.max_turns_per_command;
        let mut started = 0;
        loop {
            let Ok(level) = self.level_mut() else {
                return;
            };
            if level.is_over() || !level.turn.is_pending() {
                return;
            }
            if started >= cap {
                warn!("stopped after {} team turns in one command", started);
                return;
            }
            level.turn.take_pending();
            started += 1;
            self.start_turn();
        }
    }

    fn start_turn(&mut self) {
        let Ok(level) = self.level_mut() else {
            return;
        };
        if level.turn.take_round_start() {
            let round = level.turn.next_round();
            info!("Round {} begins", round);
            self.weather_round_start();
            self.emit(BattleEvent::RoundStarted { round });
        }

        let Ok(level) = self.level_mut() else {
            return;
        };
        let Some(team) = level.current_team().cloned() else {
            return;
        };
        level.turn.begin();
        let round = level.turn.round();
        self.refresh_members(&team.name);
        info!("{} are up", team.display_name);
        self.emit(BattleEvent::TurnStarted {
            team: team.name.clone(),
            round,
        });

        if team.is_ai() && !self.level().map(|l| l.is_over()).unwrap_or(true) {
            self.run_ai_turn();
        }
    }

    fn end_round(&mut self) {
        self.weather_round_end();
        let Ok(level) = self.level_mut() else {
            return;
        };
        level.turn.close_round();
        let round = level.turn.round();
        info!("Round {} ends", round);
        self.emit(BattleEvent::RoundEnded { round });
    }

    // === DEFEAT ===

    /// Roster bookkeeping after a unit fell
    pub(crate) fn after_defeat(&mut self, id: ActorId) {
        let Ok(level) = self.level_mut() else {
            return;
        };
        let Some(team) = level.remove_from_team(id) else {
            return;
        };
        let Some(index) = level.team_index(&team) else {
            return;
        };
        let was_current = index == level.turn.current();

        if !level.teams[index].is_defeated() {
            if was_current {
                self.check_team_completion();
            }
            return;
        }

        level.teams.remove(index);
        let current = level.turn.current();
        if index < current {
            level.turn.set_current(current - 1);
        }
        info!("{} were wiped out", team);
        self.emit(BattleEvent::TeamEliminated { team });
        self.check_outcome();

        let Ok(level) = self.level_mut() else {
            return;
        };
        if level.is_over() || level.teams.is_empty() {
            return;
        }
        if was_current && level.turn.phase() == TurnPhase::Active {
            // the team that followed now sits at `index`
            level.turn.complete();
            if index >= level.teams.len() {
                self.end_round();
            }
            let Ok(level) = self.level_mut() else {
                return;
            };
            if level.is_over() || level.teams.is_empty() {
                return;
            }
            let next = if index >= level.teams.len() { 0 } else { index };
            level.turn.queue_start(next);
        } else if was_current {
            let last = level.teams.len() - 1;
            level.turn.set_current(index.min(last));
        }
    }

    fn check_outcome(&mut self) {
        let Ok(level) = self.level_mut() else {
            return;
        };
        if level.win_condition != WinCondition::LastTeamStanding || level.outcome.is_some() {
            return;
        }
        let event = match level.teams.as_slice() {
            [] => {
                level.outcome = Some(Outcome::Draw);
                BattleEvent::Draw
            }
            [winner] => {
                let team = winner.name.clone();
                level.outcome = Some(Outcome::Victory(team.clone()));
                BattleEvent::Victory { team }
            }
            _ => return,
        };
        info!("Battle over: {:?}", event);
        self.emit(event);
    }

    // === COMMANDS ===

    /// The unit is a live member of the active team and has not finished
    pub fn can_act(&self, id: ActorId) -> Result<bool> {
        let animal = self.require_animal(id)?;
        let level = self.level()?;
        let allowed = !level.is_over()
            && level.turn.phase() == TurnPhase::Active
            && animal
                .team
                .as_ref()
                .map(|t| level.is_current_team(t))
                .unwrap_or(false)
            && !level.turn.has_completed(id);
        if !allowed {
            warn!("{} cannot act right now", id);
        }
        Ok(allowed)
    }

    /// Command: use a named action on `target`
    pub fn use_action(&mut self, id: ActorId, name: &str, target: ActorId) -> Result<bool> {
        if !self.can_act(id)? {
            return Ok(false);
        }
        self.require_animal(target)?;
        let Some(action) = self.require_animal(id)?.action(name) else {
            warn!("{} has no action {}", id, name);
            return Ok(false);
        };
        if !action.can_be_used(self, id, target) {
            warn!("{} cannot use {} on {}", id, action.name, target);
            return Ok(false);
        }
        self.perform_action(id, name, target);
        self.pump_turns();
        Ok(true)
    }

    /// Run an action with turn ending deferred to the end
    pub(crate) fn perform_action(&mut self, id: ActorId, name: &str, target: ActorId) {
        let Some(action) = self.animal(id).and_then(|a| a.action(name)) else {
            return;
        };
        self.suppress_auto_end_turn(id);
        (action.activate)(self, id, target);
        self.allow_auto_end_turn(id);
        if !self.is_selecting(id) {
            self.try_finishing(id);
        }
    }

    /// Command: invoke the unit's ability
    pub fn invoke_ability(&mut self, id: ActorId) -> Result<bool> {
        if !self.can_act(id)? {
            return Ok(false);
        }
        let used = self.invoke_unchecked(id);
        self.pump_turns();
        Ok(used)
    }

    /// Invoke if uses remain; counts the use when the ability says so
    pub(crate) fn invoke_unchecked(&mut self, id: ActorId) -> bool {
        let Some(animal) = self.animal(id) else {
            return false;
        };
        let Some(invocation) = animal.ability.invocation().copied() else {
            return false;
        };
        if animal.ability_uses_left() == 0 {
            warn!("{} has no uses of {} left", animal.name, animal.ability.name);
            return false;
        }
        let used = (invocation.invoke)(self, id);
        if used {
            self.ability_used(id);
        }
        used
    }

    /// Count one use and try to end the turn
    pub fn ability_used(&mut self, id: ActorId) {
        let Some(animal) = self.animal_mut(id) else {
            return;
        };
        animal.ability_state.uses += 1;
        let ability = animal.ability.name.to_string();
        info!("{} used {}", animal.name, ability);
        self.emit(BattleEvent::AbilityUsed { id, ability });
        self.try_finishing(id);
    }

    /// Command: the unit does nothing this turn
    pub fn skip(&mut self, id: ActorId) -> Result<bool> {
        if !self.can_act(id)? {
            return Ok(false);
        }
        self.finish_unit_turn(id);
        self.pump_turns();
        Ok(true)
    }

    /// Command: every unit of the active team that has not acted skips
    pub fn end_turn(&mut self) -> Result<()> {
        let level = self.level()?;
        let members = level
            .current_team()
            .map(|t| t.members().to_vec())
            .ok_or_else(|| BattleError::InvalidLevel("no team is active".into()))?;
        self.cancel_selection();
        for id in members {
            self.finish_unit_turn(id);
        }
        self.pump_turns();
        Ok(())
    }
}
