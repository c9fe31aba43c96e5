//! Species and ability content
//!
//! The engine reads species templates and ability definitions through
//! `ContentProvider`. `ContentTable` is the TOML-backed implementation and
//! ships with the built-in species list.

pub mod table;

pub use table::{ContentTable, SpeciesRecord};

use crate::ability::AbilityDefinition;
use crate::core::error::Result;
use crate::entity::BaseStats;

pub trait ContentProvider {
    /// Template for a species, or `UnknownSpecies`
    fn base_stats(&self, species: &str) -> Result<&BaseStats>;

    /// Ability definition by catalog key, or `UnknownAbility`
    fn ability(&self, name: &str) -> Result<AbilityDefinition>;

    /// Every species name, sorted
    fn species_names(&self) -> Vec<String>;
}
