//! Per-unit extension points
//!
//! Every animal carries a `HookTable` of plain function pointers, one per
//! extension point in the combat pipeline. An ability supplies a partial
//! `HookOverrides`; merging writes the chosen slots over the base table and
//! keeps the base table as the unit's `defaults`, which overrides call when
//! they want the stock behaviour.

use crate::combat::{AttackOptions, AttackOutcome};
use crate::core::types::ActorId;
use crate::entity::Animal;
use crate::grid::Coord;
use crate::session::Session;

pub type MultiplierHook = fn(&mut Session, ActorId, ActorId, f64) -> f64;
pub type DamageHook = fn(&mut Session, ActorId, ActorId, i32) -> i32;
pub type VetoHook = fn(&mut Session, ActorId, ActorId, i32) -> bool;
pub type BeforeDeathHook = fn(&mut Session, ActorId, Option<ActorId>, i32) -> Option<i32>;
pub type AfterAttackHook = fn(&mut Session, ActorId, ActorId, i32);
pub type FoeDefeatedHook = fn(&mut Session, ActorId, ActorId);
pub type PassiveDamageHook = fn(&mut Session, ActorId, f64) -> f64;
pub type EffectChanceHook = fn(&mut Session, ActorId, f64) -> f64;
pub type UpdateFieldsHook = fn(&mut Animal);
pub type MoveToHook = fn(&mut Session, ActorId, Coord, bool);
pub type AttackHook = fn(&mut Session, ActorId, ActorId, AttackOptions) -> AttackOutcome;
pub type LevelEndHook = fn(&mut Session, ActorId);

/// Complete set of extension points for one unit
///
/// Hooks receive the owning unit first, then the other combatant.
#[derive(Debug, Clone, Copy)]
pub struct HookTable {
    /// Scales the damage multiplier when this unit attacks
    pub damage_multiplier_attack: MultiplierHook,
    /// Scales the damage multiplier when this unit is attacked
    pub damage_multiplier_defense: MultiplierHook,
    /// Adjusts final damage dealt
    pub change_damage_attack: DamageHook,
    /// Adjusts final damage taken
    pub change_damage_defense: DamageHook,
    /// Returns true to cancel this unit's hit
    pub custom_attack: VetoHook,
    /// Returns true to cancel a hit on this unit
    pub custom_defense: VetoHook,
    /// `Some(hp)` with hp > 0 keeps the unit alive at that HP
    pub on_before_death: BeforeDeathHook,
    pub on_after_attack: AfterAttackHook,
    pub foe_defeated: FoeDefeatedHook,
    /// Adjusts damage that has no attacker
    pub passive_damage: PassiveDamageHook,
    pub effect_chance_attack: EffectChanceHook,
    pub effect_chance_defense: EffectChanceHook,
    /// Adjusts combat fields after every ability merge
    pub update_fields: UpdateFieldsHook,
    /// Moves the unit one hop; the flag asks for tile interaction
    pub move_to: MoveToHook,
    pub attack: AttackHook,
    pub on_level_end: LevelEndHook,
}

impl Default for HookTable {
    fn default() -> Self {
        Self {
            damage_multiplier_attack: base::keep_multiplier,
            damage_multiplier_defense: base::keep_multiplier,
            change_damage_attack: base::keep_damage,
            change_damage_defense: base::keep_damage,
            custom_attack: base::no_veto,
            custom_defense: base::no_veto,
            on_before_death: base::accept_death,
            on_after_attack: base::on_after_attack,
            foe_defeated: base::foe_defeated,
            passive_damage: base::keep_passive,
            effect_chance_attack: base::keep_chance,
            effect_chance_defense: base::keep_chance,
            update_fields: base::keep_fields,
            move_to: crate::battle::movement::base_move_to,
            attack: crate::combat::resolution::base_attack,
            on_level_end: base::level_end,
        }
    }
}

/// Partial table supplied by an ability
#[derive(Debug, Clone, Copy, Default)]
pub struct HookOverrides {
    pub damage_multiplier_attack: Option<MultiplierHook>,
    pub damage_multiplier_defense: Option<MultiplierHook>,
    pub change_damage_attack: Option<DamageHook>,
    pub change_damage_defense: Option<DamageHook>,
    pub custom_attack: Option<VetoHook>,
    pub custom_defense: Option<VetoHook>,
    pub on_before_death: Option<BeforeDeathHook>,
    pub on_after_attack: Option<AfterAttackHook>,
    pub foe_defeated: Option<FoeDefeatedHook>,
    pub passive_damage: Option<PassiveDamageHook>,
    pub effect_chance_attack: Option<EffectChanceHook>,
    pub effect_chance_defense: Option<EffectChanceHook>,
    pub update_fields: Option<UpdateFieldsHook>,
    pub move_to: Option<MoveToHook>,
    pub attack: Option<AttackHook>,
    pub on_level_end: Option<LevelEndHook>,
}

impl HookOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    /// Write every provided slot over `base`
    pub fn merge_onto(&self, base: &HookTable) -> HookTable {
        HookTable {
            damage_multiplier_attack: self
                .damage_multiplier_attack
                .unwrap_or(base.damage_multiplier_attack),
            damage_multiplier_defense: self
                .damage_multiplier_defense
                .unwrap_or(base.damage_multiplier_defense),
            change_damage_attack: self.change_damage_attack.unwrap_or(base.change_damage_attack),
            change_damage_defense: self
                .change_damage_defense
                .unwrap_or(base.change_damage_defense),
            custom_attack: self.custom_attack.unwrap_or(base.custom_attack),
            custom_defense: self.custom_defense.unwrap_or(base.custom_defense),
            on_before_death: self.on_before_death.unwrap_or(base.on_before_death),
            on_after_attack: self.on_after_attack.unwrap_or(base.on_after_attack),
            foe_defeated: self.foe_defeated.unwrap_or(base.foe_defeated),
            passive_damage: self.passive_damage.unwrap_or(base.passive_damage),
            effect_chance_attack: self.effect_chance_attack.unwrap_or(base.effect_chance_attack),
            effect_chance_defense: self
                .effect_chance_defense
                .unwrap_or(base.effect_chance_defense),
            update_fields: self.update_fields.unwrap_or(base.update_fields),
            move_to: self.move_to.unwrap_or(base.move_to),
            attack: self.attack.unwrap_or(base.attack),
            on_level_end: self.on_level_end.unwrap_or(base.on_level_end),
        }
    }
}

/// Stock implementations
pub mod base {
    use super::*;

    pub fn keep_multiplier(_: &mut Session, _: ActorId, _: ActorId, multiplier: f64) -> f64 {
        multiplier
    }

    pub fn keep_damage(_: &mut Session, _: ActorId, _: ActorId, damage: i32) -> i32 {
        damage
    }

    pub fn no_veto(_: &mut Session, _: ActorId, _: ActorId, _: i32) -> bool {
        false
    }

    pub fn accept_death(_: &mut Session, _: ActorId, _: Option<ActorId>, _: i32) -> Option<i32> {
        None
    }

    /// Allies learn from every hit
    pub fn on_after_attack(session: &mut Session, me: ActorId, defender: ActorId, _: i32) {
        session.award_attack_experience(me, defender);
    }

    /// Allies learn a lot more from every defeat
    pub fn foe_defeated(session: &mut Session, me: ActorId, defender: ActorId) {
        session.award_kill_experience(me, defender);
    }

    pub fn keep_passive(_: &mut Session, _: ActorId, damage: f64) -> f64 {
        damage
    }

    pub fn keep_chance(_: &mut Session, _: ActorId, chance: f64) -> f64 {
        chance
    }

    pub fn keep_fields(_: &mut Animal) {}

    pub fn level_end(_: &mut Session, _: ActorId) {}
}
