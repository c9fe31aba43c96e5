//! Built-in ability catalog, looked up by name

use crate::ability::definition::AbilityDefinition;
use crate::ability::{actions, innate, invokable};

pub const INNATE: &[&str] = &[
    "Clutch",
    "Finisher",
    "Bamboomerang",
    "NineLives",
    "SpikySkin",
    "Reflex",
    "Absorption",
    "Steadfast",
    "Resistant",
    "Generator",
    "Dire",
    "Menacing",
    "Sniper",
    "Brave",
    "Herd",
    "Pride",
    "FleetFoot",
];

pub const INVOKABLE: &[&str] = &[
    "Refresh",
    "SpinAttack",
    "Quack",
    "Roost",
    "Molt",
    "PowerSwap",
    "Mist",
    "DeepFreeze",
    "Knight",
    "StealthAcorn",
    "Substitute",
];

pub const ACTIONS: &[&str] = &[
    "Bananarama",
    "EasterEgg",
    "Kamikaze",
    "Sacrifice",
    "ClawHammer",
    "Sting",
    "Annihilate",
    "Cripple",
    "Vampire",
    "Ditto",
    "EggCannon",
    "Medic",
    "Warp",
];

/// Find an ability by its catalog key (e.g. `NineLives`)
pub fn lookup(name: &str) -> Option<AbilityDefinition> {
    innate::lookup(name)
        .or_else(|| invokable::lookup(name))
        .or_else(|| actions::lookup(name))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    INNATE
        .iter()
        .chain(INVOKABLE.iter())
        .chain(ACTIONS.iter())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityKind;

    #[test]
    fn test_every_listed_name_resolves() {
        for name in names() {
            assert!(lookup(name).is_some(), "missing ability {}", name);
        }
    }

    #[test]
    fn test_kinds_match_lists() {
        for name in INNATE {
            assert!(matches!(lookup(name).unwrap().kind, AbilityKind::Innate));
        }
        for name in INVOKABLE {
            assert!(lookup(name).unwrap().invocation().is_some());
        }
        for name in ACTIONS {
            let def = lookup(name).unwrap();
            let action = def.granted_action().unwrap();
            assert_eq!(action.priority, -1);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(lookup("Telekinesis").is_none());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(lookup("NineLives").unwrap().name, "Nine Lives");
        assert_eq!(lookup("EggCannon").unwrap().name, "Egg Cannon");
    }
}
