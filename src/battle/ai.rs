//! Computer-controlled teams
//!
//! Each unit of an AI team acts once, in roster order: it may invoke its
//! ability, then uses the best action it can, else walks towards the
//! nearest foe and tries again. Units that open a tile selection pick a
//! random offered tile. The delay between steps is only an event.

use std::cmp::Reverse;

use tracing::debug;

use crate::ability::Action;
use crate::battle::events::BattleEvent;
use crate::core::types::ActorId;
use crate::grid::{find_path, path_cost, truncate_to_budget, Coord};
use crate::session::Session;

impl Session {
    /// Drive every member of the active AI team
    pub(crate) fn run_ai_turn(&mut self) {
        let Some((team, members)) = self.level().ok().and_then(|l| {
            l.current_team()
                .map(|t| (t.name.clone(), t.members().to_vec()))
        }) else {
            return;
        };
        for id in members {
            let still_up = self
                .level()
                .map(|l| !l.is_over() && l.is_current_team(&team))
                .unwrap_or(false);
            if !still_up {
                break;
            }
            if self.ai_done(id) {
                continue;
            }
            self.ai_step(id);
        }
    }

    fn ai_done(&self, id: ActorId) -> bool {
        match self.level() {
            Ok(level) => !self.is_alive(id) || level.is_over() || level.turn.has_completed(id),
            Err(_) => true,
        }
    }

    fn ai_step(&mut self, id: ActorId) {
        let delay_ms = self.config.enemy_step_delay_ms;
        self.emit(BattleEvent::AiStep { id, delay_ms });

        self.ai_invoke(id);
        if !self.ai_done(id) && !self.ai_act(id) {
            self.ai_approach(id);
            if !self.ai_done(id) {
                self.ai_act(id);
            }
        }
        if self.is_alive(id) {
            self.finish_unit_turn(id);
        }
    }

    fn ai_invoke(&mut self, id: ActorId) {
        let Some(invocation) = self.animal(id).and_then(|a| {
            (a.ability_uses_left() > 0)
                .then(|| a.ability.invocation().copied())
                .flatten()
        }) else {
            return;
        };
        if !(invocation.should_invoke)(self, id) {
            return;
        }
        debug!("{} invokes its ability", id);
        self.invoke_unchecked(id);
        self.ai_pick_tile(id);
    }

    /// Answer a pending selection opened by `id` with a random tile
    fn ai_pick_tile(&mut self, id: ActorId) {
        let Some(tiles) = self
            .pending_selection()
            .filter(|r| r.requester == id)
            .map(|r| r.tiles.clone())
        else {
            return;
        };
        if tiles.is_empty() {
            self.cancel_selection();
            return;
        }
        let pick = tiles[self.dice().index(tiles.len())];
        if self.resolve_selection(pick).is_err() {
            self.cancel_selection();
        }
    }

    /// Other live animals, nearest first
    fn targets_by_distance(&self, id: ActorId) -> Vec<ActorId> {
        let mut targets: Vec<(u32, ActorId)> = self
            .animal_ids()
            .into_iter()
            .filter(|t| *t != id)
            .filter_map(|t| self.distance(id, t).map(|d| (d, t)))
            .collect();
        targets.sort();
        targets.into_iter().map(|(_, t)| t).collect()
    }

    /// Optional actions first by priority, then melee; true if one was used
    fn ai_act(&mut self, id: ActorId) -> bool {
        let Some(animal) = self.animal(id) else {
            return false;
        };
        let mut actions: Vec<Action> = animal
            .actions
            .iter()
            .filter(|a| !a.is_melee())
            .copied()
            .collect();
        actions.sort_by_key(|a| Reverse(a.priority));
        let targets = self.targets_by_distance(id);

        for action in actions {
            for &target in &targets {
                if action.can_be_used(self, id, target) && (action.should_use)(self, id, target) {
                    debug!("{} uses {} on {}", id, action.name, target);
                    self.perform_action(id, action.name, target);
                    self.ai_pick_tile(id);
                    return true;
                }
            }
        }
        let foe = targets.into_iter().find(|t| self.can_attack(id, *t));
        match foe {
            Some(target) => {
                self.perform_action(id, Action::MELEE, target);
                true
            }
            None => false,
        }
    }

    /// Walk as far as the budget allows towards the nearest foe
    fn ai_approach(&mut self, id: ActorId) {
        let Some(origin) = self.tile_of(id) else {
            return;
        };
        let Ok(grid) = self.cost_grid(id) else {
            return;
        };
        let speed = self.animal(id).map(|a| a.speed(false)).unwrap_or(0.0);
        let Some(foe_tile) = self
            .targets_by_distance(id)
            .into_iter()
            .find(|t| self.can_target(id, *t))
            .and_then(|t| self.tile_of(t))
        else {
            return;
        };

        let best: Option<Vec<Coord>> = foe_tile
            .neighbors()
            .into_iter()
            .filter(|c| *c == origin || grid.is_passable(*c))
            .filter_map(|c| find_path(&grid, origin, c))
            .min_by_key(|p| path_cost(&grid, p));
        let Some(path) = best else {
            debug!("{} has no way to {}", id, foe_tile);
            return;
        };
        for hop in truncate_to_budget(&grid, path, speed) {
            if !self.is_alive(id) {
                break;
            }
            self.move_to(id, hop);
        }
    }
}
