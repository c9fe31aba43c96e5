//! Innate abilities: pure hook overrides

use crate::ability::definition::AbilityDefinition;
use crate::ability::hooks::HookOverrides;
use crate::combat::{AttackOptions, AttackOutcome};
use crate::core::types::{ActorId, StatKind};
use crate::entity::status::{Duration, StatChange, StatOp};
use crate::entity::Animal;
use crate::grid::Coord;
use crate::session::Session;

pub fn lookup(name: &str) -> Option<AbilityDefinition> {
    let def = match name {
        "Clutch" => AbilityDefinition::innate(
            "Clutch",
            "Does more damage in a pinch",
            HookOverrides {
                damage_multiplier_attack: Some(clutch),
                ..HookOverrides::none()
            },
        ),
        "Finisher" => AbilityDefinition::innate(
            "Finisher",
            "Does more damage to weakened foes",
            HookOverrides {
                damage_multiplier_attack: Some(finisher),
                ..HookOverrides::none()
            },
        ),
        "Bamboomerang" => AbilityDefinition::innate(
            "Bamboomerang",
            "Attacks hit twice",
            HookOverrides {
                attack: Some(bamboomerang),
                ..HookOverrides::none()
            },
        ),
        "NineLives" => AbilityDefinition::innate(
            "Nine Lives",
            "Sometimes survives fatal attacks",
            HookOverrides {
                on_before_death: Some(nine_lives),
                ..HookOverrides::none()
            },
        ),
        "SpikySkin" => AbilityDefinition::innate(
            "Spiky Skin",
            "Attackers get hurt slightly",
            HookOverrides {
                custom_defense: Some(spiky_skin),
                ..HookOverrides::none()
            },
        ),
        "Reflex" => AbilityDefinition::innate(
            "Reflex",
            "Foe's attacks may rebound",
            HookOverrides {
                custom_defense: Some(reflex),
                ..HookOverrides::none()
            },
        ),
        "Absorption" => AbilityDefinition::innate(
            "Absorption",
            "Foe's attacks may be absorbed into HP",
            HookOverrides {
                custom_defense: Some(absorption),
                ..HookOverrides::none()
            },
        ),
        "Steadfast" => AbilityDefinition::innate(
            "Steadfast",
            "Ignores damage multipliers",
            HookOverrides {
                damage_multiplier_defense: Some(steadfast),
                ..HookOverrides::none()
            },
        ),
        "Resistant" => AbilityDefinition::innate(
            "Resistant",
            "Takes less passive damage",
            HookOverrides {
                passive_damage: Some(resistant),
                ..HookOverrides::none()
            },
        ),
        "Generator" => AbilityDefinition::innate(
            "Generator",
            "Gains HP with every step",
            HookOverrides {
                move_to: Some(generator),
                ..HookOverrides::none()
            },
        ),
        "Dire" => AbilityDefinition::innate(
            "Dire",
            "Higher chance of critical hit",
            HookOverrides {
                update_fields: Some(dire),
                ..HookOverrides::none()
            },
        ),
        "Menacing" => AbilityDefinition::innate(
            "Menacing",
            "Critical hits do more damage",
            HookOverrides {
                update_fields: Some(menacing),
                ..HookOverrides::none()
            },
        ),
        "Sniper" => AbilityDefinition::innate(
            "Sniper",
            "Can attack from 2 spaces away",
            HookOverrides {
                update_fields: Some(sniper_fields),
                damage_multiplier_attack: Some(sniper_multiplier),
                ..HookOverrides::none()
            },
        ),
        "Brave" => AbilityDefinition::innate(
            "Brave",
            "Attack boost when facing more powerful foe",
            HookOverrides {
                damage_multiplier_attack: Some(brave),
                ..HookOverrides::none()
            },
        ),
        "Herd" => AbilityDefinition::innate(
            "Herd",
            "Attack boost when surrounded by friends",
            HookOverrides {
                damage_multiplier_attack: Some(herd),
                ..HookOverrides::none()
            },
        ),
        "Pride" => AbilityDefinition::innate(
            "Pride",
            "Gains attack after every kill",
            HookOverrides {
                foe_defeated: Some(pride),
                ..HookOverrides::none()
            },
        ),
        "FleetFoot" => AbilityDefinition::innate(
            "Fleet Foot",
            "Can move again after killing",
            HookOverrides {
                foe_defeated: Some(fleet_foot),
                ..HookOverrides::none()
            },
        ),
        _ => return None,
    };
    Some(def)
}

fn clutch(s: &mut Session, me: ActorId, _: ActorId, multiplier: f64) -> f64 {
    if s.hp_percent(me) < 33 {
        multiplier * s.ability_calc(me, 1.25, 1.5)
    } else {
        multiplier
    }
}

fn finisher(s: &mut Session, me: ActorId, defender: ActorId, multiplier: f64) -> f64 {
    if s.hp_percent(defender) < 33 {
        multiplier * s.ability_calc(me, 1.25, 1.5)
    } else {
        multiplier
    }
}

/// Two default attacks; the second is skipped once the defender falls
fn bamboomerang(
    s: &mut Session,
    me: ActorId,
    defender: ActorId,
    mut options: AttackOptions,
) -> AttackOutcome {
    let Some(defaults) = s.defaults(me) else {
        return AttackOutcome::Rejected;
    };
    options.multiplier *= s.ability_calc(me, 1.0, 1.25);

    let mut outcome = (defaults.attack)(s, me, defender, options);
    if outcome == AttackOutcome::Rejected {
        return outcome;
    }
    if s.is_alive(defender) && s.is_alive(me) {
        let second = (defaults.attack)(s, me, defender, options);
        outcome = outcome.combine(second);
    }
    outcome
}

fn nine_lives(s: &mut Session, me: ActorId, _: Option<ActorId>, _: i32) -> Option<i32> {
    let chance = s.ability_calc(me, 0.1, 0.2);
    s.try_for_effect(me, chance, None).then_some(1)
}

/// Recoil; never cancels the hit
fn spiky_skin(s: &mut Session, me: ActorId, attacker: ActorId, damage: i32) -> bool {
    let percent = s.ability_calc(me, 10.0, 25.0);
    let recoil = (damage as f64 * percent / 100.0).round() as i32;
    s.damage_foe(me, attacker, recoil);
    false
}

fn reflex(s: &mut Session, me: ActorId, attacker: ActorId, damage: i32) -> bool {
    let chance = s.ability_calc(me, 0.1, 0.25);
    if s.try_for_effect(me, chance, Some(attacker)) {
        s.damage_foe(me, attacker, damage);
        return true;
    }
    false
}

fn absorption(s: &mut Session, me: ActorId, _: ActorId, damage: i32) -> bool {
    let chance = s.ability_calc(me, 0.1, 0.25);
    let share = s.ability_calc(me, 0.25, 0.5);
    if s.try_for_effect(me, chance, None) {
        s.gain_hp(me, damage as f64 * share);
        return true;
    }
    false
}

/// Pulls the multiplier towards 1
fn steadfast(s: &mut Session, me: ActorId, _: ActorId, multiplier: f64) -> f64 {
    1.0 + (multiplier - 1.0) * s.ability_calc(me, 0.5, 0.0)
}

fn resistant(s: &mut Session, me: ActorId, damage: f64) -> f64 {
    (damage * s.ability_calc(me, 0.5, 0.0)).round()
}

fn generator(s: &mut Session, me: ActorId, coord: Coord, interact: bool) {
    let chance = s.ability_calc(me, 0.25, 0.5);
    if s.try_for_effect(me, chance, None) {
        // half a percent of max HP, at least 1
        let max = s.animal(me).map(|a| a.max_hp()).unwrap_or(0);
        let gain = (max as f64 * 0.5 / 100.0).round().max(1.0);
        s.gain_hp(me, gain);
    }
    if let Some(defaults) = s.defaults(me) {
        (defaults.move_to)(s, me, coord, interact);
    }
}

fn dire(animal: &mut Animal) {
    animal.fields.crit_chance *= animal.ability_calc(1.5, 3.0);
}

fn menacing(animal: &mut Animal) {
    animal.fields.crit_multiplier += animal.ability_calc(0.5, 2.0);
}

fn sniper_fields(animal: &mut Animal) {
    animal.fields.range = 2;
}

fn sniper_multiplier(s: &mut Session, me: ActorId, defender: ActorId, multiplier: f64) -> f64 {
    match s.distance(me, defender) {
        Some(d) if d > 1 => multiplier * s.ability_calc(me, 0.75, 1.0),
        _ => multiplier,
    }
}

fn brave(s: &mut Session, me: ActorId, defender: ActorId, multiplier: f64) -> f64 {
    let (Some(mine), Some(theirs)) = (
        s.animal(me).map(|a| a.attack(false)),
        s.any_animal(defender).map(|a| a.attack(false)),
    ) else {
        return multiplier;
    };
    if mine <= 0 {
        return multiplier;
    }
    let ratio = theirs as f64 / mine as f64;
    if ratio >= s.ability_calc(me, 1.3, 1.15) {
        multiplier * s.ability_calc(me, 1.15, 1.3)
    } else {
        multiplier
    }
}

fn herd(s: &mut Session, me: ActorId, _: ActorId, multiplier: f64) -> f64 {
    let radius = s.ability_calc(me, 1.0, 3.0);
    let nearby = s.friends_within(me, radius).len() as i32;
    let boost = s.ability_calc(me, 1.1, 1.2).powi(nearby).clamp(1.0, 2.5);
    multiplier * boost
}

fn pride(s: &mut Session, me: ActorId, defender: ActorId) {
    let step = s.ability_calc(me, 1.1, 1.2);
    if let Some(animal) = s.animal_mut(me) {
        animal.ability_state.kills = (animal.ability_state.kills + 1).min(5);
        let boost = step.powi(animal.ability_state.kills as i32);
        animal.apply_stat_change(StatChange::new(
            "pride",
            StatKind::Attack,
            StatOp::Mul(boost),
            Duration::Permanent,
        ));
    }
    if let Some(defaults) = s.defaults(me) {
        (defaults.foe_defeated)(s, me, defender);
    }
}

fn fleet_foot(s: &mut Session, me: ActorId, defender: ActorId) {
    s.grant_bonus_action(me);
    if let Some(defaults) = s.defaults(me) {
        (defaults.foe_defeated)(s, me, defender);
    }
}
