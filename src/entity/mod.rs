pub mod actor;
pub mod animal;
pub mod experience;
pub mod stats;
pub mod status;

pub use actor::{Actor, ActorKind, SteppableKind};
pub use animal::{AllyProgress, Animal, AnimalKind, CombatFields, EnemyTraits, StatRules};
pub use stats::{BaseStats, Evs, Ivs};
pub use status::{Affliction, AfflictionKind, Duration, StatChange, StatOp, StatusEffects};
