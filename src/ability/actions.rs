//! Action-granting abilities

use crate::ability::action::Action;
use crate::ability::definition::AbilityDefinition;
use crate::battle::selection::SelectionPurpose;
use crate::combat::{AttackOptions, AttackOutcome};
use crate::core::types::{ActorId, StatKind, TargetType};
use crate::entity::status::{AfflictionKind, Duration, StatChange, StatOp};
use crate::grid::HighlightTag;
use crate::session::Session;

/// HP percent under which a foe counts as finishable
const CRITICAL_HP_PERCENT: i32 = 33;

pub fn lookup(name: &str) -> Option<AbilityDefinition> {
    let action = match name {
        "Bananarama" => foe_action(
            "Bananarama",
            "Powerful attack, but has recoil",
            bananarama,
            bananarama_should_use,
        ),
        "EasterEgg" => foe_action(
            "Easter Egg",
            "Either hurts foe or heals them",
            easter_egg,
            always,
        ),
        "Kamikaze" => foe_action(
            "Kamikaze",
            "Does tons of damage, but kills user",
            kamikaze,
            |s, me, _| s.hp_percent(me) < 30,
        ),
        "Sacrifice" => Action {
            target: TargetType::Friend,
            ..foe_action(
                "Sacrifice",
                "User dies but gives HP to teammate",
                sacrifice,
                |s, me, target| s.hp_percent(me) < 50 && s.hp_percent(target) < 50,
            )
        },
        "ClawHammer" => foe_action(
            "Claw Hammer",
            "Very powerful, but reduces attack",
            claw_hammer,
            |s, _, target| s.hp_percent(target) < CRITICAL_HP_PERCENT,
        ),
        "Sting" => foe_action(
            "Sting",
            "Attacks lightly, then warps away",
            sting,
            |s, _, _| s.chance(0.6),
        ),
        "Annihilate" => foe_action(
            "Annihilate",
            "Powerful, but forces recharge unless you kill",
            annihilate,
            |s, _, _| s.chance(0.4),
        ),
        "Cripple" => foe_action(
            "Cripple",
            "Slows down foe temporarily",
            cripple,
            |s, _, _| s.chance(0.4),
        ),
        "Vampire" => foe_action("Vampire", "Leeches foe's health", vampire, always),
        "Ditto" => foe_action(
            "Ditto",
            "Temporarily copies foe's stats",
            ditto,
            |s, _, _| s.chance(0.4),
        ),
        "EggCannon" => Action {
            can_use: Some(egg_cannon_in_line),
            ..foe_action(
                "Egg Cannon",
                "Damages foe in a straight line",
                egg_cannon,
                |s, _, _| s.chance(0.4),
            )
        },
        "Medic" => Action {
            target: TargetType::Friend,
            can_use: Some(medic_can_heal),
            ..foe_action(
                "Medic",
                "Heals any teammate from a distance",
                medic,
                |s, _, target| s.hp_percent(target) < 50,
            )
        },
        "Warp" => Action {
            target: TargetType::Friend,
            ..foe_action("Warp", "Moves any teammate", warp, always)
        },
        _ => return None,
    };
    Some(AbilityDefinition::action(action))
}

fn foe_action(
    name: &'static str,
    description: &'static str,
    activate: fn(&mut Session, ActorId, ActorId),
    should_use: fn(&mut Session, ActorId, ActorId) -> bool,
) -> Action {
    Action {
        name,
        description,
        target: TargetType::Foe,
        priority: -1,
        activate,
        should_use,
        can_use: None,
    }
}

fn always(_: &mut Session, _: ActorId, _: ActorId) -> bool {
    true
}

fn bananarama(s: &mut Session, me: ActorId, target: ActorId) {
    if let AttackOutcome::Hit { damage, .. } = s.attack(me, target, AttackOptions::scaled(1.2)) {
        s.lose_hp(me, (damage as f64 / 3.0).round() as i32);
    }
}

fn bananarama_should_use(s: &mut Session, me: ActorId, target: ActorId) -> bool {
    s.hp_percent(me) >= 10 && s.hp_percent(target) >= 10
}

/// Hurts or heals with a varied amount based on the target's current HP
fn easter_egg(s: &mut Session, me: ActorId, target: ActorId) {
    let Some(current) = s.animal(target).map(|a| a.hp()) else {
        return;
    };
    let hit_chance = s.ability_calc(me, 0.5, 0.75);
    if s.try_for_effect(me, hit_chance, Some(target)) {
        let share = s.ability_calc(me, 0.1, 0.35);
        let damage = s.vary(current as f64 * share).round().max(1.0) as i32;
        s.damage_foe(me, target, damage);
    } else {
        let heal = s.vary(current as f64 * 0.1);
        s.gain_hp(target, heal);
    }
}

fn kamikaze(s: &mut Session, me: ActorId, target: ActorId) {
    let multiplier = s.ability_calc(me, 2.5, 5.0);
    s.attack(me, target, AttackOptions::scaled(multiplier));
    let current = s.animal(me).map(|a| a.hp()).unwrap_or(0);
    s.lose_hp(me, current + 1);
}

fn sacrifice(s: &mut Session, me: ActorId, target: ActorId) {
    let share = s.ability_calc(me, 0.75, 1.0);
    let current = s.animal(me).map(|a| a.hp()).unwrap_or(0);
    s.gain_hp(target, (current as f64 * share).round());
    s.lose_hp(me, current + 1);
}

fn claw_hammer(s: &mut Session, me: ActorId, target: ActorId) {
    let multiplier = s.ability_calc(me, 2.0, 3.0);
    let outcome = s.attack(me, target, AttackOptions::scaled(multiplier));
    if outcome.landed() {
        let turns = Duration::rounded(s.ability_calc(me, 5.0, 3.0));
        s.apply_stat_change(
            me,
            StatChange::new("hammerclaw", StatKind::Attack, StatOp::Mul(0.5), turns),
        );
    }
}

fn sting(s: &mut Session, me: ActorId, target: ActorId) {
    let multiplier = s.ability_calc(me, 0.2, 0.4);
    let distance = s.ability_calc(me, 2.0, 4.0);
    s.attack(me, target, AttackOptions::scaled(multiplier));

    let Some(origin) = s.tile_of(me) else {
        return;
    };
    let Ok(grid) = s.cost_grid(me) else {
        return;
    };
    let options: Vec<_> = match s.level() {
        Ok(level) => level
            .map
            .tiles_within_radius(origin, distance.floor() as u32)
            .into_iter()
            .filter(|c| *c != origin && grid.is_passable(*c))
            .collect(),
        Err(_) => return,
    };
    if options.is_empty() {
        return;
    }
    let pick = s.dice().index(options.len());
    s.move_to(me, options[pick]);
}

fn annihilate(s: &mut Session, me: ActorId, target: ActorId) {
    let options = AttackOptions {
        multiplier: s.ability_calc(me, 2.0, 4.0),
        accuracy: Some(s.ability_calc(me, 0.8, 0.9)),
    };
    if let AttackOutcome::Hit {
        foe_defeated: false,
        ..
    } = s.attack(me, target, options)
    {
        s.afflict(me, AfflictionKind::Recharging, Duration::Turns(1));
    }
}

fn cripple(s: &mut Session, me: ActorId, target: ActorId) {
    if let AttackOutcome::Hit {
        foe_defeated: false,
        ..
    } = s.attack(me, target, AttackOptions::default())
    {
        let turns = Duration::rounded(s.ability_calc(me, 3.0, 6.0));
        let slow = s.ability_calc(me, 0.8, 0.6);
        s.apply_stat_change(
            target,
            StatChange::new("Cripple", StatKind::Speed, StatOp::Mul(slow), turns),
        );
    }
}

fn vampire(s: &mut Session, me: ActorId, target: ActorId) {
    let power = s.ability_calc(me, 20.0, 30.0);
    if let AttackOutcome::Hit { damage, .. } = s.special_attack(me, target, power) {
        let share = s.ability_calc(me, 0.6, 0.8);
        s.gain_hp(me, (damage as f64 * share).round());
    }
}

fn ditto(s: &mut Session, me: ActorId, target: ActorId) {
    let Some((attack, defense, speed)) = s
        .animal(target)
        .map(|a| (a.attack(true), a.defense(true), a.speed(true)))
    else {
        return;
    };
    let turns = Duration::rounded(s.ability_calc(me, 2.0, 5.0));
    for (id, stat, value) in [
        ("DittoA", StatKind::Attack, attack as f64),
        ("DittoD", StatKind::Defense, defense as f64),
        ("DittoS", StatKind::Speed, speed),
    ] {
        s.apply_stat_change(me, StatChange::new(id, stat, StatOp::Set(value), turns));
    }
}

fn egg_cannon(s: &mut Session, me: ActorId, target: ActorId) {
    let power = s.ability_calc(me, 25.0, 35.0);
    s.special_attack(me, target, power);
}

/// Orthogonal line within the cannon's reach
fn egg_cannon_in_line(s: &Session, me: ActorId, target: ActorId) -> bool {
    let (Some(from), Some(to)) = (s.tile_of(me), s.tile_of(target)) else {
        return false;
    };
    let reach = s.ability_calc(me, 5.0, 8.0);
    let (dx, dy) = from.abs_delta(&to);
    (dx == 0 || dy == 0) && (dx + dy) as f64 <= reach
}

fn medic(s: &mut Session, me: ActorId, target: ActorId) {
    let share = s.ability_calc(me, 0.15, 0.30);
    let max = s.animal(target).map(|a| a.max_hp()).unwrap_or(0);
    s.gain_hp(target, (max as f64 * share).round());
}

/// Any teammate below max HP, at any distance
fn medic_can_heal(s: &Session, _: ActorId, target: ActorId) -> bool {
    s.animal(target).map(|a| a.hp() < a.max_hp()).unwrap_or(false)
}

/// Asks where to put the teammate
fn warp(s: &mut Session, me: ActorId, target: ActorId) {
    let radius = s.ability_calc(me, 8.0, 12.0);
    let Some(origin) = s.tile_of(target) else {
        return;
    };
    let Ok(grid) = s.cost_grid(target) else {
        return;
    };
    let tiles: Vec<_> = match s.level() {
        Ok(level) => level
            .map
            .tiles_within_radius(origin, radius.floor() as u32)
            .into_iter()
            .filter(|c| grid.is_passable(*c))
            .collect(),
        Err(_) => return,
    };
    s.request_tiles(me, tiles, HighlightTag::Move, SelectionPurpose::Warp { target });
}
