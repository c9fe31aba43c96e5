//! Invokable abilities: a budgeted active effect per level

use crate::ability::definition::AbilityDefinition;
use crate::ability::hooks::HookOverrides;
use crate::battle::selection::SelectionPurpose;
use crate::combat::AttackOptions;
use crate::core::types::{ActorId, StatKind};
use crate::entity::actor::{ActorKind, SteppableKind};
use crate::entity::status::{Duration, StatChange, StatOp};
use crate::grid::HighlightTag;
use crate::session::Session;

pub fn lookup(name: &str) -> Option<AbilityDefinition> {
    let def = match name {
        "Refresh" => AbilityDefinition::invokable(
            "Refresh",
            "Regains some HP",
            (5.0, 15.0),
            refresh,
            when_hurt,
        ),
        "SpinAttack" => AbilityDefinition::invokable(
            "Spin Attack",
            "Damages all nearby foes",
            (5.0, 10.0),
            spin_attack,
            sometimes,
        ),
        "Quack" => AbilityDefinition::invokable(
            "Quack",
            "Damages all nearby foes",
            (5.0, 5.0),
            quack,
            always,
        ),
        "Roost" => AbilityDefinition::invokable(
            "Roost",
            "Regains some HP and boosts stats",
            (10.0, 20.0),
            roost,
            when_hurt,
        ),
        "Molt" => AbilityDefinition::invokable(
            "Molt",
            "Drops defense but boosts attack",
            (1.0, 1.0),
            molt,
            sometimes,
        ),
        "PowerSwap" => AbilityDefinition::invokable(
            "Power Swap",
            "Temporarily swaps attack and defense",
            (2.0, 5.0),
            power_swap,
            sometimes,
        ),
        "Mist" => AbilityDefinition::invokable(
            "Mist",
            "Clears all stat changes",
            (1.0, 5.0),
            mist,
            sometimes,
        ),
        "DeepFreeze" => AbilityDefinition::invokable(
            "Deep Freeze",
            "Turns water into ice",
            (2.0, 5.0),
            deep_freeze,
            when_hurt,
        ),
        "Knight" => AbilityDefinition::invokable(
            "Knight",
            "Move in an L shape and jump over obstacles",
            (5.0, 10.0),
            knight,
            rarely,
        ),
        "StealthAcorn" => AbilityDefinition::invokable(
            "Stealth Acorn",
            "Places damaging acorns nearby",
            (2.0, 3.0),
            stealth_acorn,
            occasionally,
        ),
        "Substitute" => AbilityDefinition::invokable(
            "Substitute",
            "Makes a substitute that will take damage for you",
            (2.0, 4.0),
            substitute,
            occasionally,
        )
        .with_overrides(HookOverrides {
            change_damage_defense: Some(substitute_absorb),
            on_level_end: Some(substitute_clear),
            ..HookOverrides::none()
        }),
        _ => return None,
    };
    Some(def)
}

// === AI PREDICATES ===

/// More likely the lower the unit's HP
fn when_hurt(s: &mut Session, me: ActorId) -> bool {
    let chance = 1.0 - s.hp_percent(me) as f64 / 100.0;
    s.chance(chance)
}

fn always(_: &mut Session, _: ActorId) -> bool {
    true
}

fn sometimes(s: &mut Session, _: ActorId) -> bool {
    s.chance(0.3)
}

fn occasionally(s: &mut Session, _: ActorId) -> bool {
    s.chance(0.25)
}

fn rarely(s: &mut Session, _: ActorId) -> bool {
    s.chance(0.2)
}

// === EFFECTS ===

fn refresh(s: &mut Session, me: ActorId) -> bool {
    let percent = s.ability_calc(me, 25.0, 50.0);
    s.gain_hp_percent(me, percent);
    true
}

fn spin_attack(s: &mut Session, me: ActorId) -> bool {
    s.suppress_auto_end_turn(me);
    let radius = s.ability_calc(me, 1.0, 2.0);
    let multiplier = s.ability_calc(me, 0.75, 0.95);
    for foe in s.foes_within(me, radius) {
        s.attack(me, foe, AttackOptions::scaled(multiplier));
    }
    s.allow_auto_end_turn(me);
    true
}

fn quack(s: &mut Session, me: ActorId) -> bool {
    let radius = s.ability_calc(me, 8.0, 12.0);
    let percent = s.ability_calc(me, 2.5, 4.0);
    for foe in s.foes_within(me, radius) {
        let max = s.animal(foe).map(|a| a.max_hp()).unwrap_or(0);
        let damage = (max as f64 * percent / 100.0).round() as i32;
        s.damage_foe(me, foe, damage);
    }
    true
}

fn roost(s: &mut Session, me: ActorId) -> bool {
    let percent = s.ability_calc(me, 5.0, 10.0);
    s.gain_hp_percent(me, percent);
    let boost = s.ability_calc(me, 1.05, 1.10);
    for (id, stat) in [("RoostA", StatKind::Attack), ("RoostD", StatKind::Defense)] {
        s.apply_stat_change(me, StatChange::new(id, stat, StatOp::Mul(boost), Duration::Turns(2)));
    }
    true
}

fn molt(s: &mut Session, me: ActorId) -> bool {
    let boost = s.ability_calc(me, 1.3, 1.6);
    s.apply_stat_change(
        me,
        StatChange::new("MoltA", StatKind::Attack, StatOp::Mul(boost), Duration::Permanent),
    );
    s.apply_stat_change(
        me,
        StatChange::new("MoltD", StatKind::Defense, StatOp::Mul(0.6), Duration::Permanent),
    );
    true
}

fn power_swap(s: &mut Session, me: ActorId) -> bool {
    let Some((attack, defense)) = s.animal(me).map(|a| (a.attack(false), a.defense(false))) else {
        return false;
    };
    let turns = Duration::rounded(s.ability_calc(me, 4.0, 8.0));
    s.apply_stat_change(
        me,
        StatChange::new("psA", StatKind::Attack, StatOp::Set(defense as f64), turns),
    );
    s.apply_stat_change(
        me,
        StatChange::new("psD", StatKind::Defense, StatOp::Set(attack as f64), turns),
    );
    true
}

fn mist(s: &mut Session, _: ActorId) -> bool {
    for id in s.animal_ids() {
        if let Some(animal) = s.animal_mut(id) {
            animal.statuses.clear_changes();
        }
    }
    true
}

/// Asks for a water tile; the use is counted once one is picked
fn deep_freeze(s: &mut Session, me: ActorId) -> bool {
    let radius = s.ability_calc(me, 1.0, 2.0);
    let (Some(origin), Ok(level)) = (s.tile_of(me), s.level()) else {
        return false;
    };
    let tiles: Vec<_> = level
        .map
        .tiles()
        .filter(|t| t.terrain.is_water() && t.coord.distance(&origin) as f64 <= radius)
        .map(|t| t.coord)
        .collect();
    s.request_tiles(me, tiles, HighlightTag::Item, SelectionPurpose::Freeze);
    false
}

/// Asks for an L-shaped jump target; the use is counted on the jump
fn knight(s: &mut Session, me: ActorId) -> bool {
    let Some(origin) = s.tile_of(me) else {
        return false;
    };
    let Ok(grid) = s.cost_grid(me) else {
        return false;
    };
    let tiles: Vec<_> = s
        .level()
        .map(|level| {
            level
                .map
                .coords()
                .filter(|c| {
                    let delta = c.abs_delta(&origin);
                    grid.is_passable(*c) && (delta == (1, 2) || delta == (2, 1))
                })
                .collect()
        })
        .unwrap_or_default();
    s.request_tiles(me, tiles, HighlightTag::Move, SelectionPurpose::Knight);
    false
}

fn stealth_acorn(s: &mut Session, me: ActorId) -> bool {
    let (Some(origin), Some(tosser)) = (s.tile_of(me), s.animal(me).and_then(|a| a.team.clone()))
    else {
        return false;
    };
    let count = s.ability_calc(me, 3.0, 5.0).round() as u32;
    let damage_percent = s.ability_calc(me, 5.0, 15.0);
    for _ in 0..count {
        let Some(spot) = s.closest_empty_tile(origin) else {
            break;
        };
        let kind = ActorKind::Steppable {
            kind: SteppableKind::Acorn {
                tosser: tosser.clone(),
                damage_percent,
            },
            blocks: false,
        };
        if s.spawn_actor("Acorn", kind, spot).is_err() {
            break;
        }
    }
    true
}

fn substitute(s: &mut Session, me: ActorId) -> bool {
    let Some(animal) = s.animal(me) else {
        return false;
    };
    if animal.ability_state.substitute_hp.is_some() {
        return false;
    }
    let stake = (0.25 * animal.max_hp() as f64).floor() as i32;
    if stake >= animal.hp() {
        tracing::info!("{} lacks the HP for a substitute", animal.name);
        return false;
    }
    s.lose_hp(me, stake);
    if let Some(animal) = s.animal_mut(me) {
        animal.ability_state.substitute_hp = Some(stake);
    }
    true
}

/// The substitute soaks the whole hit, even past its own HP
fn substitute_absorb(s: &mut Session, me: ActorId, _: ActorId, damage: i32) -> i32 {
    let Some(animal) = s.animal_mut(me) else {
        return damage;
    };
    let Some(left) = animal.ability_state.substitute_hp else {
        return damage;
    };
    let left = left - damage;
    animal.ability_state.substitute_hp = (left > 0).then_some(left);
    if left <= 0 {
        tracing::info!("{}'s substitute faded", animal.name);
    }
    0
}

fn substitute_clear(s: &mut Session, me: ActorId) {
    if let Some(animal) = s.animal_mut(me) {
        animal.ability_state.substitute_hp = None;
    }
    if let Some(defaults) = s.defaults(me) {
        (defaults.on_level_end)(s, me);
    }
}
