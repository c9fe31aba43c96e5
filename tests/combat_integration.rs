//! Combat integration tests
//!
//! Every test loads a small level, swaps in a roll script and resolves
//! attacks through the session. Rolls are drawn miss, crit, variance.

use beast_tactics::battle::{BattleEvent, LevelSpec, Outcome};
use beast_tactics::combat::{raw_damage, AttackOptions, AttackOutcome};
use beast_tactics::content::{ContentTable, SpeciesRecord};
use beast_tactics::core::{ActorId, BattleConfig, ScriptedDice, SeededDice, StatKind, TeamName};
use beast_tactics::entity::{Duration, StatChange, StatOp};
use beast_tactics::grid::TERRAIN_COUNT;
use beast_tactics::Session;

const ALLY: ActorId = ActorId(1);
const FOE: ActorId = ActorId(2);

fn duel(ally: &str, foe: &str) -> String {
    format!(
        r#"
        name = "Duel"
        terrain = ["g g g g g", "g g g g g"]
        weather = {{}}

        [[units]]
        team = "allies"
        species = "{}"
        level = 10
        at = [0, 0]

        [[units]]
        team = "enemies"
        species = "{}"
        level = 10
        at = [1, 0]
        "#,
        ally, foe
    )
}

/// Session with neutral IVs and a loaded duel between `ally` and `foe`
fn arena_with(config: BattleConfig, content: ContentTable, ally: &str, foe: &str) -> Session {
    let mut session = Session::new(
        config,
        Box::new(content),
        Box::new(ScriptedDice::constant(0.5)),
    )
    .unwrap();
    let spec = LevelSpec::from_toml_str(&duel(ally, foe)).unwrap();
    session.load_level(&spec).unwrap();
    session
}

fn arena(ally: &str, foe: &str) -> Session {
    arena_with(BattleConfig::headless(), ContentTable::builtin().unwrap(), ally, foe)
}

fn script(session: &mut Session, rolls: &[f64]) {
    session.set_dice(Box::new(ScriptedDice::new(rolls.iter().copied())));
}

/// The variance factor a roll produces under the default config
fn variance(roll: f64) -> f64 {
    let spread = BattleConfig::default().damage_variation;
    let (low, high) = (1.0 - spread, 1.0 + spread);
    low + roll * (high - low)
}

fn expected_damage(session: &Session, multiplier: f64, roll: f64) -> i32 {
    let att = session.animal(ALLY).unwrap();
    let def = session.animal(FOE).unwrap();
    let raw = raw_damage(att.level, att.attack(false) as f64, def.defense(false) as f64);
    ((raw * multiplier * variance(roll)).round() as i32).max(1)
}

#[test]
fn test_plain_hit_between_level_ten_bears() {
    let mut s = arena("Bear", "Bear");
    let expected = expected_damage(&s, 1.0, 0.5);
    assert!(expected >= 1);

    script(&mut s, &[0.0, 0.99, 0.5]);
    let outcome = s.attack(ALLY, FOE, AttackOptions::default());

    assert_eq!(
        outcome,
        AttackOutcome::Hit {
            damage: expected,
            critical: false,
            foe_defeated: false
        }
    );
    let foe = s.animal(FOE).unwrap();
    assert_eq!(foe.hp(), foe.max_hp() - expected);
}

#[test]
fn test_first_roll_decides_the_miss() {
    let mut s = arena("Bear", "Bear");
    script(&mut s, &[0.95, 0.0, 0.0]);

    let outcome = s.attack(ALLY, FOE, AttackOptions::default());

    assert_eq!(outcome, AttackOutcome::Missed);
    let foe = s.animal(FOE).unwrap();
    assert_eq!(foe.hp(), foe.max_hp());
}

#[test]
fn test_second_roll_decides_the_critical() {
    let mut s = arena("Bear", "Bear");
    let critical_multiplier = s.config.critical_multiplier;
    let expected = expected_damage(&s, critical_multiplier, 0.5);

    script(&mut s, &[0.0, 0.05, 0.5]);
    let outcome = s.attack(ALLY, FOE, AttackOptions::default());

    assert_eq!(
        outcome,
        AttackOutcome::Hit {
            damage: expected,
            critical: true,
            foe_defeated: false
        }
    );
}

#[test]
fn test_third_roll_is_the_variance() {
    let mut s = arena("Bear", "Bear");
    let low = expected_damage(&s, 1.0, 0.0);
    let high = expected_damage(&s, 1.0, 0.999);
    assert!(low < high);

    script(&mut s, &[0.0, 0.99, 0.0]);
    assert_eq!(s.attack(ALLY, FOE, AttackOptions::default()).damage(), low);
}

#[test]
fn test_same_script_replays_the_same_fight() {
    let rolls = [0.3, 0.7, 0.25, 0.1, 0.4, 0.9];
    let mut damages = Vec::new();
    for _ in 0..2 {
        let mut s = arena("Bear", "Bear");
        script(&mut s, &rolls);
        let first = s.attack(ALLY, FOE, AttackOptions::default());
        let second = s.attack(ALLY, FOE, AttackOptions::default());
        damages.push((first, second));
    }
    assert_eq!(damages[0], damages[1]);
}

#[test]
fn test_sure_hits_always_land() {
    let config = BattleConfig {
        default_accuracy: 1.0,
        critical_chance: 0.0,
        ..BattleConfig::headless()
    };
    let mut s = arena_with(config, ContentTable::builtin().unwrap(), "Bear", "Bear");
    s.set_dice(Box::new(SeededDice::new(11)));

    loop {
        let before = s.animal(FOE).unwrap().hp();
        match s.attack(ALLY, FOE, AttackOptions::default()) {
            AttackOutcome::Hit {
                damage,
                critical,
                foe_defeated,
            } => {
                assert!(damage >= 1);
                assert!(!critical);
                assert_eq!(foe_defeated, before - damage <= 0);
                assert_eq!(foe_defeated, !s.is_alive(FOE));
                if foe_defeated {
                    break;
                }
            }
            other => panic!("expected a hit, got {:?}", other),
        }
    }
}

#[test]
fn test_friendly_target_is_rejected() {
    let mut s = arena("Bear", "Bear");
    script(&mut s, &[]);
    assert_eq!(s.attack(ALLY, ALLY, AttackOptions::default()), AttackOutcome::Rejected);
    assert!(!s.can_attack(ALLY, ALLY));
    assert!(s.can_attack(ALLY, FOE));
}

#[test]
fn test_pure_stats_skip_stat_changes() {
    let mut s = arena("Bear", "Bear");
    let pure = s.animal(ALLY).unwrap().attack(true);
    s.apply_stat_change(
        ALLY,
        StatChange::new("rage", StatKind::Attack, StatOp::Mul(2.0), Duration::Permanent),
    );

    let bear = s.animal(ALLY).unwrap();
    assert_eq!(bear.attack(true), pure);
    assert_eq!(bear.attack(false), pure * 2);
}

#[test]
fn test_reapplying_an_id_replaces_it() {
    let mut s = arena("Bear", "Bear");
    let pure = s.animal(ALLY).unwrap().attack(true);
    s.apply_stat_change(
        ALLY,
        StatChange::new("rage", StatKind::Attack, StatOp::Mul(2.0), Duration::Permanent),
    );
    s.apply_stat_change(
        ALLY,
        StatChange::new("rage", StatKind::Attack, StatOp::Add(5.0), Duration::Turns(2)),
    );

    let bear = s.animal(ALLY).unwrap();
    assert_eq!(bear.statuses.changes().len(), 1);
    assert_eq!(bear.statuses.get("rage").unwrap().duration, Duration::Turns(2));
    assert_eq!(bear.attack(false), pure + 5);
}

#[test]
fn test_attack_experience_levels_up_the_ally() {
    let config = BattleConfig {
        experience_per_level: 20.0,
        ..BattleConfig::headless()
    };
    let mut s = arena_with(config, ContentTable::builtin().unwrap(), "Bear", "Bear");
    script(&mut s, &[0.0, 0.99, 0.5]);

    s.attack(ALLY, FOE, AttackOptions::default());

    let bear = s.animal(ALLY).unwrap();
    assert_eq!(bear.level, 11);
    assert_eq!(bear.hp(), bear.max_hp());
    let progress = bear.progress().unwrap();
    assert_eq!(progress.skill_points, 11);
    assert!((progress.experience - 10.0).abs() < 1e-9);
    assert!(s
        .events()
        .contains(&BattleEvent::LevelUp { id: ALLY, level: 11 }));
}

#[test]
fn test_enemies_gain_no_experience() {
    let config = BattleConfig {
        experience_per_level: 20.0,
        ..BattleConfig::headless()
    };
    let mut s = arena_with(config, ContentTable::builtin().unwrap(), "Bear", "Bear");
    script(&mut s, &[0.0, 0.99, 0.5]);

    s.attack(FOE, ALLY, AttackOptions::default());
    assert_eq!(s.animal(FOE).unwrap().level, 10);
}

fn with_cat() -> ContentTable {
    let mut table = ContentTable::builtin().unwrap();
    table
        .insert(SpeciesRecord {
            name: "Cat".into(),
            attack: 50,
            defense: 40,
            hp: 40,
            speed: 5,
            terrain_costs: "1".repeat(TERRAIN_COUNT),
            ability: "NineLives".into(),
        })
        .unwrap();
    table
}

#[test]
fn test_before_death_hook_keeps_unit_at_one_hp() {
    let mut s = arena_with(BattleConfig::headless(), with_cat(), "Bear", "Cat");

    // Nine Lives rolls at 10% with no ability investment
    script(&mut s, &[0.0]);
    assert!(!s.damage_foe(ALLY, FOE, 9999));
    assert!(s.is_alive(FOE));
    assert_eq!(s.animal(FOE).unwrap().hp(), 1);

    script(&mut s, &[0.5, 0.5]);
    assert!(s.damage_foe(ALLY, FOE, 9999));
    assert!(!s.is_alive(FOE));
    assert!(s.any_animal(FOE).is_some());
    assert!(s.events().contains(&BattleEvent::Defeated {
        id: FOE,
        by: Some(ALLY)
    }));
}

#[test]
fn test_last_enemy_down_is_a_victory() {
    let mut s = arena("Bear", "Bear");
    script(&mut s, &[]);

    assert!(s.damage_foe(ALLY, FOE, 9999));

    let level = s.level().unwrap();
    assert_eq!(level.outcome, Some(Outcome::Victory(TeamName::allies())));
    assert_eq!(level.teams.len(), 1);
    assert!(s.events().contains(&BattleEvent::TeamEliminated {
        team: TeamName::enemies()
    }));
    assert!(!s.can_act(ALLY).unwrap());
}

#[test]
fn test_bamboomerang_hits_twice() {
    let mut s = arena("Panda", "Bear");
    let single = expected_damage(&s, 1.0, 0.5);

    script(&mut s, &[0.0, 0.99, 0.5, 0.0, 0.99, 0.5]);
    let outcome = s.attack(ALLY, FOE, AttackOptions::default());

    assert_eq!(outcome.damage(), single * 2);
    let foe = s.animal(FOE).unwrap();
    assert_eq!(foe.hp(), foe.max_hp() - single * 2);
}

#[test]
fn test_resistant_halves_passive_damage() {
    let mut s = arena("Bear", "Bear");
    script(&mut s, &[]);
    let max = s.animal(ALLY).unwrap().max_hp();

    s.passive_damage(ALLY, 10.0);
    assert_eq!(s.animal(ALLY).unwrap().hp(), max - 5);
}

#[test]
fn test_hp_changes_clamp() {
    let mut s = arena("Bear", "Bear");
    script(&mut s, &[]);
    let max = s.animal(ALLY).unwrap().max_hp();

    assert_eq!(s.gain_hp(ALLY, 50.0), 0);
    assert_eq!(s.change_hp(ALLY, -10), max - 10);
    assert_eq!(s.gain_hp_percent(ALLY, 100.0), 10);
    assert_eq!(s.set_hp(ALLY, -40), 0);
    // a unit at zero HP stays in play until a death resolves
    assert!(s.is_alive(ALLY));
}
