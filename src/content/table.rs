//! TOML species table

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ability::{catalog, AbilityDefinition};
use crate::content::ContentProvider;
use crate::core::error::{BattleError, Result};
use crate::entity::BaseStats;
use crate::grid::TerrainCosts;

const BUILTIN_SPECIES: &str = include_str!("../../data/species.toml");

/// One `[[species]]` entry as written in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub name: String,
    pub attack: u32,
    pub defense: u32,
    pub hp: u32,
    pub speed: u32,
    pub terrain_costs: String,
    pub ability: String,
}

#[derive(Debug, Deserialize)]
struct SpeciesFile {
    #[serde(default)]
    species: Vec<SpeciesRecord>,
}

impl SpeciesRecord {
    /// Check the ability name and parse the cost table
    fn into_base_stats(self) -> Result<BaseStats> {
        if catalog::lookup(&self.ability).is_none() {
            return Err(BattleError::UnknownAbility(format!(
                "{} (species {})",
                self.ability, self.name
            )));
        }
        let terrain_costs = TerrainCosts::parse(&self.name, &self.terrain_costs)?;
        Ok(BaseStats {
            attack: self.attack,
            defense: self.defense,
            hp: self.hp,
            speed: self.speed,
            terrain_costs,
            ability: self.ability,
        })
    }
}

/// Validated species table
#[derive(Debug, Clone, Default)]
pub struct ContentTable {
    species: AHashMap<String, BaseStats>,
}

impl ContentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table compiled into the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_SPECIES)
    }

    /// Parse and validate a species file; any bad entry fails the load
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: SpeciesFile = toml::from_str(contents)?;
        let mut table = Self::new();
        for record in file.species {
            table.insert(record)?;
        }
        debug!("loaded {} species", table.species.len());
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Add or replace one species
    pub fn insert(&mut self, record: SpeciesRecord) -> Result<()> {
        let name = record.name.clone();
        let stats = record.into_base_stats()?;
        self.species.insert(name, stats);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl ContentProvider for ContentTable {
    fn base_stats(&self, species: &str) -> Result<&BaseStats> {
        self.species
            .get(species)
            .ok_or_else(|| BattleError::UnknownSpecies(species.to_string()))
    }

    fn ability(&self, name: &str) -> Result<AbilityDefinition> {
        catalog::lookup(name).ok_or_else(|| BattleError::UnknownAbility(name.to_string()))
    }

    fn species_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.species.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_loads() {
        let table = ContentTable::builtin().unwrap();
        assert_eq!(table.len(), 27);
        let bear = table.base_stats("Bear").unwrap();
        assert_eq!((bear.attack, bear.defense, bear.hp, bear.speed), (60, 55, 45, 4));
        assert_eq!(bear.ability, "Resistant");
        assert!(table.base_stats("Dragon").is_err());
    }

    #[test]
    fn test_every_builtin_ability_resolves() {
        let table = ContentTable::builtin().unwrap();
        for name in table.species_names() {
            let stats = table.base_stats(&name).unwrap();
            assert!(table.ability(&stats.ability).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_unknown_ability_fails_load() {
        let toml = r#"
            [[species]]
            name = "Griffin"
            attack = 50
            defense = 50
            hp = 50
            speed = 5
            terrain_costs = "01111220111120211121112210221"
            ability = "Fly"
        "#;
        assert!(matches!(
            ContentTable::from_toml_str(toml),
            Err(BattleError::UnknownAbility(_))
        ));
    }

    #[test]
    fn test_short_cost_table_fails_load() {
        let toml = r#"
            [[species]]
            name = "Griffin"
            attack = 50
            defense = 50
            hp = 50
            speed = 5
            terrain_costs = "0111"
            ability = "Clutch"
        "#;
        match ContentTable::from_toml_str(toml) {
            Err(BattleError::MalformedTerrainCosts { species, .. }) => assert_eq!(species, "Griffin"),
            other => panic!("expected a malformed table error, got {:?}", other.map(|t| t.len())),
        }
    }
}
