//! Non-animal actors reacting to units
//!
//! Steppables and items fire when a unit enters their tile; pressure pads
//! also fire when it leaves. Obstacles and NPCs only talk, and only to a
//! unit standing next to them.

use tracing::{debug, info};

use crate::battle::events::BattleEvent;
use crate::core::error::{BattleError, Result};
use crate::core::types::ActorId;
use crate::entity::{Actor, ActorKind, SteppableKind};
use crate::grid::Coord;
use crate::session::Session;

impl Session {
    /// Add a non-animal actor to the level on `coord`
    pub fn spawn_actor(
        &mut self,
        name: impl Into<String>,
        kind: ActorKind,
        coord: Coord,
    ) -> Result<ActorId> {
        let id = self.next_actor_id();
        let level = self.level_mut()?;
        if !level.map.in_bounds(coord) {
            return Err(BattleError::InvalidLevel(format!(
                "cannot place an actor at {}",
                coord
            )));
        }
        level.insert(Actor::new(id, name, kind), Some(coord));
        debug!("spawned {} at {}", id, coord);
        Ok(id)
    }

    /// Everything on `coord` reacts to `stepper` arriving
    pub(crate) fn step_on(&mut self, stepper: ActorId, coord: Coord) {
        let Ok(level) = self.level() else {
            return;
        };
        for other in level.others_on(coord, stepper) {
            if !self.is_alive(stepper) {
                break;
            }
            self.stepped_on(other, stepper);
        }
    }

    /// Pressure pads on `coord` spring back after `stepper` leaves
    pub(crate) fn step_off(&mut self, stepper: ActorId, coord: Coord) {
        let Ok(level) = self.level() else {
            return;
        };
        for other in level.others_on(coord, stepper) {
            let target = match self.level().ok().and_then(|l| l.actor(other)).map(|a| &a.kind) {
                Some(ActorKind::Steppable {
                    kind: SteppableKind::PressurePad { target, pressed: true },
                    ..
                }) => *target,
                _ => continue,
            };
            self.set_pad(other, false);
            self.toggle_visibility(target);
        }
    }

    fn stepped_on(&mut self, actor: ActorId, stepper: ActorId) {
        let Some(kind) = self.level().ok().and_then(|l| l.actor(actor)).map(|a| a.kind.clone())
        else {
            return;
        };
        match kind {
            ActorKind::Steppable {
                kind: SteppableKind::Acorn { tosser, damage_percent },
                ..
            } => {
                let Some(victim) = self.animal(stepper) else {
                    return;
                };
                if victim.team.as_ref() == Some(&tosser) {
                    return;
                }
                let damage = (victim.max_hp() as f64 * damage_percent / 100.0).round();
                info!("{} was hurt by a hidden acorn", victim.name);
                if let Ok(level) = self.level_mut() {
                    level.remove(actor);
                }
                self.passive_damage(stepper, damage);
            }
            ActorKind::Steppable {
                kind: SteppableKind::Exit { index },
                ..
            } => {
                if let Ok(level) = self.level_mut() {
                    level.exit_requested = Some(index);
                }
                self.emit(BattleEvent::ExitReached { index });
            }
            ActorKind::Steppable {
                kind: SteppableKind::PressurePad { target, pressed: false },
                ..
            } => {
                self.set_pad(actor, true);
                self.toggle_visibility(target);
            }
            ActorKind::Item { name } => {
                if let Ok(level) = self.level_mut() {
                    level.remove(actor);
                }
                self.inventory.push(name.clone());
                self.emit(BattleEvent::ItemObtained { item: name });
            }
            _ => {}
        }
    }

    fn set_pad(&mut self, pad: ActorId, down: bool) {
        let Some(actor) = self.level_mut().ok().and_then(|l| l.actor_mut(pad)) else {
            return;
        };
        if let ActorKind::Steppable {
            kind: SteppableKind::PressurePad { pressed, .. },
            ..
        } = &mut actor.kind
        {
            *pressed = down;
        }
    }

    /// Hide a visible actor or bring a hidden one back to its old tile
    pub fn toggle_visibility(&mut self, id: ActorId) {
        let Ok(level) = self.level_mut() else {
            return;
        };
        let Some(actor) = level.actor(id) else {
            return;
        };
        if let Some(at) = actor.hidden_at.filter(|_| actor.tile.is_none()) {
            if level.place(id, at) {
                if let Some(actor) = level.actor_mut(id) {
                    actor.hidden_at = None;
                }
                self.emit(BattleEvent::ActorRevealed { id, at });
            }
        } else if let Some(at) = level.lift(id) {
            if let Some(actor) = level.actor_mut(id) {
                actor.hidden_at = Some(at);
            }
            self.emit(BattleEvent::ActorHidden { id });
        }
    }

    /// Command: talk to an adjacent obstacle or NPC
    ///
    /// Returns `Ok(false)` when `other` cannot be talked to from here.
    pub fn interact(&mut self, id: ActorId, other: ActorId) -> Result<bool> {
        let level = self.level()?;
        let me = level.actor(id).ok_or(BattleError::ActorNotFound(id))?;
        let them = level.actor(other).ok_or(BattleError::ActorNotFound(other))?;
        let (Some(from), Some(to)) = (me.tile, them.tile) else {
            return Ok(false);
        };
        if !them.can_interact_at_distance() || from.distance(&to) > 1 {
            return Ok(false);
        }
        let speaker = them.name.clone();
        let lines = match &them.kind {
            ActorKind::Obstacle { dialogue, .. } | ActorKind::Npc { dialogue } => dialogue.clone(),
            _ => Vec::new(),
        };
        if !lines.is_empty() {
            self.emit(BattleEvent::Dialogue { speaker, lines });
        }

        // one-time pickup
        let item = self
            .level_mut()?
            .actor_mut(other)
            .and_then(|a| match &mut a.kind {
                ActorKind::Obstacle { item, .. } => item.take(),
                _ => None,
            });
        if let Some(item) = item {
            self.inventory.push(item.clone());
            self.emit(BattleEvent::ItemObtained { item });
        }
        Ok(true)
    }
}
