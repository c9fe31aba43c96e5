//! Unit movement on the tile grid
//!
//! A move query computes the unit's reachable and attackable tiles and
//! caches each reachable tile's path on the map. Walking follows the
//! cached path hop by hop through the unit's `move_to` hook, so abilities
//! like Generator see every step.

use tracing::{debug, warn};

use crate::battle::events::BattleEvent;
use crate::combat::{AttackOptions, AttackOutcome};
use crate::core::error::{BattleError, Result};
use crate::core::types::ActorId;
use crate::grid::{Coord, CostGrid, RangeQuery};
use crate::session::Session;

/// Stock `move_to` hook: one hop, then anything on the tile reacts
pub fn base_move_to(session: &mut Session, id: ActorId, coord: Coord, interact: bool) {
    let Ok(level) = session.level_mut() else {
        return;
    };
    let Some(from) = level.relocate(id, coord) else {
        warn!("{} could not move to {}", id, coord);
        return;
    };
    session.emit(BattleEvent::UnitMoved { id, from, to: coord });
    session.dispel_fog(id);
    if interact {
        session.step_off(id, from);
        session.step_on(id, coord);
    }
}

impl Session {
    /// Per-tile movement costs for one unit
    pub fn cost_grid(&self, id: ActorId) -> Result<CostGrid> {
        self.level()?
            .cost_grid_for(id)
            .ok_or(BattleError::ActorNotFound(id))
    }

    /// Reachable and attackable tiles for `id`, caching paths on the map
    pub fn move_query(&mut self, id: ActorId) -> Result<RangeQuery> {
        let grid = self.cost_grid(id)?;
        let animal = self.require_animal(id)?;
        let (speed, range) = (animal.speed(false), animal.fields.range);
        let origin = self.tile_of(id).ok_or(BattleError::ActorNotFound(id))?;

        let level = self.level_mut()?;
        let query = RangeQuery::compute(&level.map, &grid, origin, speed, range);
        level.map.clear_paths();
        for coord in query.move_tiles() {
            if let Some(path) = query.path_to(coord) {
                level.map.set_path(coord, path.to_vec());
            }
        }
        Ok(query)
    }

    /// Move a unit through its `move_to` hook, interacting with the tile
    pub fn move_to(&mut self, id: ActorId, coord: Coord) {
        if let Some(hooks) = self.hooks(id) {
            (hooks.move_to)(self, id, coord, true);
        }
    }

    /// Follow the cached path to `dest`; false if `dest` is not a move tile
    ///
    /// Leaves the unit's turn open; callers decide when it ends.
    pub(crate) fn follow_path(&mut self, id: ActorId, dest: Coord) -> Result<bool> {
        let query = self.move_query(id)?;
        let Some(path) = query.path_to(dest).map(|p| p.to_vec()) else {
            return Ok(false);
        };
        debug!("{} walks {} steps to {}", id, path.len(), dest);
        for hop in path {
            if !self.is_alive(id) {
                break;
            }
            self.move_to(id, hop);
        }
        Ok(true)
    }

    /// Walk to `dest` and try to end the unit's turn
    pub(crate) fn walk(&mut self, id: ActorId, dest: Coord) -> Result<bool> {
        if !self.follow_path(id, dest)? {
            return Ok(false);
        }
        self.try_finishing(id);
        Ok(true)
    }

    /// Command: move a unit of the active team
    pub fn move_unit(&mut self, id: ActorId, dest: Coord) -> Result<bool> {
        if !self.can_act(id)? {
            return Ok(false);
        }
        let moved = self.walk(id, dest)?;
        if !moved {
            warn!("{} cannot reach {}", id, dest);
        }
        self.pump_turns();
        Ok(moved)
    }

    /// Command: attack `target`, first walking to the approach tile if needed
    pub fn engage(&mut self, id: ActorId, target: ActorId) -> Result<AttackOutcome> {
        if !self.can_act(id)? {
            return Ok(AttackOutcome::Rejected);
        }
        let target_tile = self.tile_of(target).ok_or(BattleError::ActorNotFound(target))?;
        let outcome = if self.can_attack(id, target) {
            self.attack(id, target, AttackOptions::default())
        } else {
            let query = self.move_query(id)?;
            match query.attack_tile(target_tile).map(|t| t.approach) {
                Some(approach) if self.can_target(id, target) => {
                    self.suppress_auto_end_turn(id);
                    let arrived = self.follow_path(id, approach)?;
                    self.allow_auto_end_turn(id);
                    if arrived {
                        self.attack(id, target, AttackOptions::default())
                    } else {
                        AttackOutcome::Rejected
                    }
                }
                _ => AttackOutcome::Rejected,
            }
        };
        self.pump_turns();
        Ok(outcome)
    }

    /// Clear fog around a unit for its own team
    pub fn dispel_fog(&mut self, id: ActorId) {
        let (Some(tile), Some(animal)) = (self.tile_of(id), self.animal(id)) else {
            return;
        };
        let (radius, team) = (animal.fields.fog_dispel_radius, animal.team.clone());
        let Some(team) = team else {
            return;
        };
        let Ok(level) = self.level_mut() else {
            return;
        };
        if !level.fog_of_war {
            return;
        }
        let tiles = level.map.tiles_within_radius(tile, radius);
        if let Some(team) = level.team_mut(&team) {
            team.dispel_fog(tiles);
        }
    }

    /// First empty tile on open terrain within 10 of `center`
    pub fn closest_empty_tile(&self, center: Coord) -> Option<Coord> {
        self.level().ok()?.closest_empty_tile(center)
    }
}
