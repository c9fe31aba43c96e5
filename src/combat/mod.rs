pub mod damage;
pub mod resolution;

pub use damage::raw_damage;
pub use resolution::{base_attack, AttackOptions, AttackOutcome};
