//! Ability behaviour through the session
//!
//! Both teams are human so nothing acts between commands.

use beast_tactics::battle::{BattleEvent, LevelSpec};
use beast_tactics::combat::{AttackOptions, AttackOutcome};
use beast_tactics::content::ContentTable;
use beast_tactics::core::{ActorId, BattleConfig, ScriptedDice, TeamName};
use beast_tactics::grid::Coord;
use beast_tactics::Session;

const ALLY: ActorId = ActorId(1);
const RIVAL: ActorId = ActorId(2);

fn face_off(ally: &str, rival: &str, rival_at: [i32; 2]) -> Session {
    let toml = format!(
        r#"
        name = "Face Off"
        terrain = ["g g g g g", "g g g g g", "g g g g g"]
        win_condition = "exploration"
        weather = {{}}

        [[teams]]
        name = "allies"

        [[teams]]
        name = "rivals"

        [[units]]
        team = "allies"
        species = "{}"
        level = 10
        at = [0, 0]

        [[units]]
        team = "rivals"
        species = "{}"
        level = 10
        at = [{}, {}]
        "#,
        ally, rival, rival_at[0], rival_at[1]
    );
    let mut session = Session::new(
        BattleConfig::headless(),
        Box::new(ContentTable::builtin().unwrap()),
        Box::new(ScriptedDice::constant(0.5)),
    )
    .unwrap();
    session
        .load_level(&LevelSpec::from_toml_str(&toml).unwrap())
        .unwrap();
    session
}

fn last_hit(session: &Session, attacker: ActorId) -> i32 {
    session
        .events()
        .iter()
        .rev()
        .find_map(|e| match e {
            BattleEvent::Attacked {
                attacker: a,
                outcome: AttackOutcome::Hit { damage, .. },
                ..
            } if *a == attacker => Some(*damage),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_knight_jumps_after_a_tile_pick() {
    let mut s = face_off("Horse", "Bear", [4, 2]);
    let uses = s.animal(ALLY).unwrap().ability_uses_left();

    // nothing is spent until a tile is picked
    assert!(!s.invoke_ability(ALLY).unwrap());
    let offered = s.pending_selection().unwrap().tiles.clone();
    assert!(offered.contains(&Coord::new(2, 1)));
    assert!(offered.contains(&Coord::new(1, 2)));
    assert_eq!(s.animal(ALLY).unwrap().ability_uses_left(), uses);

    assert!(s.choose_tile(Coord::new(2, 1)).unwrap());

    assert_eq!(s.tile_of(ALLY), Some(Coord::new(2, 1)));
    assert!(s.events().contains(&BattleEvent::UnitMoved {
        id: ALLY,
        from: Coord::new(0, 0),
        to: Coord::new(2, 1)
    }));
    assert!(s.events().contains(&BattleEvent::AbilityUsed {
        id: ALLY,
        ability: "Knight".into()
    }));
    assert_eq!(s.animal(ALLY).unwrap().ability_uses_left(), uses - 1);
    let current = s.level().unwrap().current_team().unwrap().name.clone();
    assert_eq!(current, TeamName::new("rivals"));
}

#[test]
fn test_spiky_skin_hurts_the_attacker() {
    let mut s = face_off("Bear", "Hedgehog", [1, 0]);
    s.set_dice(Box::new(ScriptedDice::new([0.0, 0.99, 0.5])));

    let outcome = s.attack(ALLY, RIVAL, AttackOptions::default());

    let damage = outcome.damage();
    assert!(damage > 0);
    let recoil = (damage as f64 * 10.0 / 100.0).round() as i32;
    let bear = s.animal(ALLY).unwrap();
    assert_eq!(bear.hp(), bear.max_hp() - recoil);
}

#[test]
fn test_bananarama_has_recoil() {
    let mut s = face_off("Monkey", "Bear", [1, 0]);

    assert!(s.use_action(ALLY, "Bananarama", RIVAL).unwrap());

    let damage = last_hit(&s, ALLY);
    let monkey = s.animal(ALLY).unwrap();
    assert_eq!(monkey.hp(), monkey.max_hp() - (damage as f64 / 3.0).round() as i32);
    let current = s.level().unwrap().current_team().unwrap().name.clone();
    assert_eq!(current, TeamName::new("rivals"));
}

#[test]
fn test_action_needs_range() {
    let mut s = face_off("Monkey", "Bear", [3, 0]);
    assert!(!s.use_action(ALLY, "Bananarama", RIVAL).unwrap());
    assert!(!s.use_action(ALLY, "Fly", RIVAL).unwrap());
    assert!(s.can_act(ALLY).unwrap());
}

#[test]
fn test_substitute_soaks_a_hit() {
    let mut s = face_off("Chicken", "Bear", [1, 0]);
    let max = s.animal(ALLY).unwrap().max_hp();
    let stake = max / 4;

    assert!(s.invoke_ability(ALLY).unwrap());
    assert_eq!(s.animal(ALLY).unwrap().hp(), max - stake);

    let outcome = s.attack(RIVAL, ALLY, AttackOptions::default());
    assert!(outcome.landed());
    assert_eq!(s.animal(ALLY).unwrap().hp(), max - stake);
}

#[test]
fn test_sniper_reaches_two_tiles() {
    let s = face_off("Crab", "Bear", [2, 0]);
    assert!(s.can_attack(ALLY, RIVAL));
    assert!(!s.can_attack(RIVAL, ALLY));
}

#[test]
fn test_pride_grows_with_each_kill() {
    let mut s = face_off("Brown Lion", "Bear", [1, 0]);
    s.set_hp(RIVAL, 1);

    let outcome = s.attack(ALLY, RIVAL, AttackOptions::default());

    assert!(matches!(outcome, AttackOutcome::Hit { foe_defeated: true, .. }));
    let lion = s.animal(ALLY).unwrap();
    assert!(lion.statuses.get("pride").is_some());
    assert!(lion.attack(false) > lion.attack(true));
}

#[test]
fn test_skipping_drops_a_pending_jump() {
    let mut s = face_off("Horse", "Bear", [4, 2]);
    let uses = s.animal(ALLY).unwrap().ability_uses_left();

    assert!(!s.invoke_ability(ALLY).unwrap());
    assert!(s.is_selecting(ALLY));
    assert!(s.skip(ALLY).unwrap());

    assert!(s.pending_selection().is_none());
    let current = s.level().unwrap().current_team().unwrap().name.clone();
    assert_eq!(current, TeamName::new("rivals"));

    // the old offer is gone, the rivals' turn leaves the horse where it was
    assert!(!s.choose_tile(Coord::new(2, 1)).unwrap());
    assert_eq!(s.tile_of(ALLY), Some(Coord::new(0, 0)));
    assert_eq!(s.animal(ALLY).unwrap().ability_uses_left(), uses);
    assert!(!s.events().iter().any(|e| matches!(e, BattleEvent::AbilityUsed { .. })));
}

#[test]
fn test_moving_drops_a_pending_jump() {
    let mut s = face_off("Horse", "Bear", [4, 2]);

    assert!(!s.invoke_ability(ALLY).unwrap());
    assert!(s.move_unit(ALLY, Coord::new(1, 0)).unwrap());

    assert!(s.pending_selection().is_none());
    assert!(!s.choose_tile(Coord::new(2, 1)).unwrap());
    assert_eq!(s.tile_of(ALLY), Some(Coord::new(1, 0)));
}

#[test]
fn test_multi_word_action_by_its_key() {
    let mut s = face_off("Ostrich", "Bear", [3, 0]);
    let max = s.animal(RIVAL).unwrap().max_hp();

    assert!(s.use_action(ALLY, "EggCannon", RIVAL).unwrap());

    assert!(s.animal(RIVAL).unwrap().hp() < max);
    let current = s.level().unwrap().current_team().unwrap().name.clone();
    assert_eq!(current, TeamName::new("rivals"));
}

#[test]
fn test_spent_ability_does_nothing() {
    let mut s = face_off("Lobster", "Bear", [4, 2]);
    assert_eq!(s.animal(ALLY).unwrap().ability_uses_left(), 1);

    assert!(s.invoke_ability(ALLY).unwrap());
    assert_eq!(s.animal(ALLY).unwrap().ability_uses_left(), 0);
    // back round to the lobster
    assert!(s.skip(RIVAL).unwrap());
    assert!(s.can_act(ALLY).unwrap());

    let hp = s.animal(ALLY).unwrap().hp();
    let attack = s.animal(ALLY).unwrap().attack(false);
    let logged = s.events().len();

    assert!(!s.invoke_ability(ALLY).unwrap());

    let lobster = s.animal(ALLY).unwrap();
    assert_eq!(lobster.ability_uses_left(), 0);
    assert_eq!(lobster.hp(), hp);
    assert_eq!(lobster.attack(false), attack);
    assert_eq!(s.tile_of(ALLY), Some(Coord::new(0, 0)));
    assert_eq!(s.events().len(), logged);
    assert!(s.can_act(ALLY).unwrap());
}

#[test]
fn test_vetoed_hit_still_spends_the_turn() {
    let mut s = face_off("Bear", "Leopard", [1, 0]);
    let leopard_hp = s.animal(RIVAL).unwrap().hp();
    // hit, no crit, variance, then Reflex fires
    s.set_dice(Box::new(ScriptedDice::new([0.0, 0.99, 0.5, 0.0])));

    let outcome = s.attack(ALLY, RIVAL, AttackOptions::default());

    assert_eq!(outcome, AttackOutcome::Vetoed);
    assert_eq!(s.animal(RIVAL).unwrap().hp(), leopard_hp);
    let bear = s.animal(ALLY).unwrap();
    assert!(bear.hp() < bear.max_hp());
    assert!(!s.can_act(ALLY).unwrap());
}
