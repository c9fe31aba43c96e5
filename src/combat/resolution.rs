//! Attack resolution
//!
//! One attack runs start to finish in a single call: miss roll, raw damage,
//! multipliers from both sides, critical roll, variance, damage hooks,
//! vetoes, then HP. Rolls are always drawn in the order miss, crit,
//! variance so a fixed script replays the same fight.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::battle::events::BattleEvent;
use crate::combat::damage::{finalize, raw_damage};
use crate::core::types::ActorId;
use crate::entity::animal::AnimalKind;
use crate::entity::stats::raw_stat;
use crate::session::Session;

/// Per-call attack parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOptions {
    /// Base damage multiplier before any hook sees it
    pub multiplier: f64,
    /// Replaces the attacker's own accuracy
    pub accuracy: Option<f64>,
}

impl AttackOptions {
    pub fn scaled(multiplier: f64) -> Self {
        Self {
            multiplier,
            accuracy: None,
        }
    }
}

impl Default for AttackOptions {
    fn default() -> Self {
        Self::scaled(1.0)
    }
}

/// What one attack did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// Illegal target; nothing happened
    Rejected,
    /// Rolled and missed; the attacker's turn is still spent
    Missed,
    /// A hook cancelled the hit; no HP change from it, the turn is still spent
    Vetoed,
    Hit {
        damage: i32,
        critical: bool,
        foe_defeated: bool,
    },
}

impl AttackOutcome {
    /// True unless the attack never reached the defender
    pub fn landed(&self) -> bool {
        matches!(self, AttackOutcome::Hit { .. } | AttackOutcome::Vetoed)
    }

    pub fn damage(&self) -> i32 {
        match self {
            AttackOutcome::Hit { damage, .. } => *damage,
            _ => 0,
        }
    }

    /// Fold a follow-up attack into this one
    pub fn combine(self, next: AttackOutcome) -> AttackOutcome {
        match (self, next) {
            (
                AttackOutcome::Hit {
                    damage: a,
                    critical: ca,
                    foe_defeated: fa,
                },
                AttackOutcome::Hit {
                    damage: b,
                    critical: cb,
                    foe_defeated: fb,
                },
            ) => AttackOutcome::Hit {
                damage: a + b,
                critical: ca || cb,
                foe_defeated: fa || fb,
            },
            (hit @ AttackOutcome::Hit { .. }, _) => hit,
            (_, next) => next,
        }
    }
}

/// Stock attack behind every unit's `attack` hook
pub fn base_attack(
    session: &mut Session,
    attacker: ActorId,
    defender: ActorId,
    options: AttackOptions,
) -> AttackOutcome {
    if !session.can_target(attacker, defender) {
        return AttackOutcome::Rejected;
    }
    let (Some(att), Some(def)) = (session.animal(attacker), session.animal(defender)) else {
        return AttackOutcome::Rejected;
    };
    let accuracy = options.accuracy.unwrap_or(att.fields.accuracy);
    let crit_chance = att.fields.crit_chance;
    let crit_multiplier = att.fields.crit_multiplier;
    let raw = raw_damage(att.level, att.attack(false) as f64, def.defense(false) as f64);
    let (att_hooks, def_hooks) = (att.hooks, def.hooks);

    if !session.chance(accuracy) {
        debug!("{} missed {}", attacker, defender);
        return finish(session, attacker, defender, AttackOutcome::Missed);
    }

    let mut multiplier = options.multiplier;
    multiplier = (att_hooks.damage_multiplier_attack)(session, attacker, defender, multiplier);
    multiplier = (def_hooks.damage_multiplier_defense)(session, defender, attacker, multiplier);

    let critical = session.try_for_effect(attacker, crit_chance, Some(defender));
    if critical {
        multiplier = crit_multiplier;
    }

    let variance = session.variance_roll();
    let mut damage = finalize(raw * multiplier, variance);
    damage = (att_hooks.change_damage_attack)(session, attacker, defender, damage);
    damage = (def_hooks.change_damage_defense)(session, defender, attacker, damage);
    debug!(
        "{} -> {}: raw {:.2} x{:.3} var {:.3} = {}",
        attacker, defender, raw, multiplier, variance, damage
    );

    if (att_hooks.custom_attack)(session, attacker, defender, damage)
        || (def_hooks.custom_defense)(session, defender, attacker, damage)
    {
        return finish(session, attacker, defender, AttackOutcome::Vetoed);
    }

    let foe_defeated = session.damage_foe(attacker, defender, damage);
    let outcome = AttackOutcome::Hit {
        damage,
        critical,
        foe_defeated,
    };
    finish(session, attacker, defender, outcome)
}

/// Log a resolved attack and end the attacker's turn, whatever it did
fn finish(
    session: &mut Session,
    attacker: ActorId,
    defender: ActorId,
    outcome: AttackOutcome,
) -> AttackOutcome {
    session.emit(BattleEvent::Attacked {
        attacker,
        defender,
        outcome,
    });
    session.try_finishing(attacker);
    outcome
}

impl Session {
    /// Resolve an attack through the attacker's `attack` hook
    pub fn attack(
        &mut self,
        attacker: ActorId,
        defender: ActorId,
        options: AttackOptions,
    ) -> AttackOutcome {
        match self.hooks(attacker) {
            Some(hooks) if self.is_alive(attacker) => (hooks.attack)(self, attacker, defender, options),
            _ => AttackOutcome::Rejected,
        }
    }

    /// Both live animals on different teams
    pub fn can_target(&self, attacker: ActorId, defender: ActorId) -> bool {
        match (self.animal(attacker), self.animal(defender)) {
            (Some(a), Some(d)) => attacker != defender && !a.is_friend_of(d),
            _ => false,
        }
    }

    /// A legal target inside the attacker's range
    pub fn can_attack(&self, attacker: ActorId, defender: ActorId) -> bool {
        self.can_target(attacker, defender) && self.within_range(attacker, defender)
    }

    /// Fixed-power attack that skips accuracy, multipliers and hooks
    ///
    /// The power is grown like a stat with the attacker's attack IV and EV
    /// and stands in for attack in the damage formula.
    pub fn special_attack(&mut self, attacker: ActorId, defender: ActorId, power: f64) -> AttackOutcome {
        if !self.can_target(attacker, defender) {
            return AttackOutcome::Rejected;
        }
        let (Some(att), Some(def)) = (self.animal(attacker), self.animal(defender)) else {
            return AttackOutcome::Rejected;
        };
        let special = raw_stat(power, att.level, att.ivs.attack, att.evs.attack);
        let raw = raw_damage(att.level, special, def.defense(false) as f64);
        let variance = self.variance_roll();
        let damage = finalize(raw, variance);
        let foe_defeated = self.damage_foe(attacker, defender, damage);
        let outcome = AttackOutcome::Hit {
            damage,
            critical: false,
            foe_defeated,
        };
        self.emit(BattleEvent::Attacked {
            attacker,
            defender,
            outcome,
        });
        outcome
    }

    /// Deal `damage` from `attacker`; true if the defender fell
    pub fn damage_foe(&mut self, attacker: ActorId, defender: ActorId, damage: i32) -> bool {
        if !self.is_alive(defender) {
            return false;
        }
        let hp = self.change_hp(defender, -damage);
        if let Some(hooks) = self.hooks(attacker) {
            (hooks.on_after_attack)(self, attacker, defender, damage);
        }
        if hp > 0 || !self.is_alive(defender) {
            return false;
        }
        self.resolve_death(defender, Some(attacker), damage)
    }

    /// Lose HP with no attacker; true if the unit fell
    pub fn lose_hp(&mut self, id: ActorId, amount: i32) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        if self.change_hp(id, -amount) > 0 {
            return false;
        }
        self.resolve_death(id, None, amount)
    }

    /// Damage from weather or traps, after the unit's `passive_damage` hook
    pub fn passive_damage(&mut self, id: ActorId, amount: f64) -> bool {
        let Some(hooks) = self.hooks(id) else {
            return false;
        };
        let amount = (hooks.passive_damage)(self, id, amount);
        self.lose_hp(id, amount.round() as i32)
    }

    /// Roll an effect chance through the weather and both units' hooks
    pub fn try_for_effect(&mut self, user: ActorId, chance: f64, other: Option<ActorId>) -> bool {
        let mut chance = chance * self.weather_effect_multiplier();
        if let Some(hooks) = self.hooks(user) {
            chance = (hooks.effect_chance_attack)(self, user, chance);
        }
        if let Some(other) = other {
            if let Some(hooks) = self.hooks(other) {
                chance = (hooks.effect_chance_defense)(self, other, chance);
            }
        }
        self.chance(chance)
    }

    /// Uniform variance factor around 1
    pub fn variance_roll(&mut self) -> f64 {
        let spread = self.config.damage_variation;
        self.dice().uniform(1.0 - spread, 1.0 + spread)
    }

    /// Apply variance to an arbitrary amount
    pub fn vary(&mut self, amount: f64) -> f64 {
        amount * self.variance_roll()
    }

    /// Last chance to survive, else removal from play
    fn resolve_death(&mut self, id: ActorId, attacker: Option<ActorId>, damage: i32) -> bool {
        if let Some(hooks) = self.hooks(id) {
            if let Some(hp) = (hooks.on_before_death)(self, id, attacker, damage) {
                if hp > 0 {
                    info!("{} clung on at {} HP", id, hp);
                    self.set_hp(id, hp);
                    return false;
                }
            }
        }
        self.defeat(id, attacker);
        if let Some(attacker) = attacker {
            if let Some(hooks) = self.hooks(attacker) {
                (hooks.foe_defeated)(self, attacker, id);
            }
        }
        true
    }

    /// Remove a fallen unit; enemies may drop their item
    fn defeat(&mut self, id: ActorId, attacker: Option<ActorId>) {
        let Some(animal) = self.animal(id) else {
            return;
        };
        let name = animal.name.clone();
        let traits = match &animal.kind {
            AnimalKind::Enemy(traits) => Some(traits.clone()),
            AnimalKind::Ally(_) => None,
        };
        info!("{} was defeated", name);
        self.bury(id);
        self.emit(BattleEvent::Defeated { id, by: attacker });

        if let Some(traits) = traits {
            if self.chance(traits.recruitment_chance) {
                self.emit(BattleEvent::Recruitable { id });
            }
            if let Some(item) = traits.drop_item {
                if self.chance(traits.drop_chance) {
                    self.inventory.push(item.clone());
                    self.emit(BattleEvent::ItemObtained { item });
                }
            }
        }
        self.after_defeat(id);
    }
}
