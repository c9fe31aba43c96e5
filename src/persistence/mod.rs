//! Saved teams
//!
//! A team is stored compressed: species, name and EVs per animal. Level
//! and HP are re-derived when the team is rebuilt, so the same record
//! works for a campaign roster and for hotseat play at max level.

pub mod store;

pub use store::{JsonRosterStore, MemoryRosterStore, RosterStore};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::Result;
use crate::entity::{Animal, Evs};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub species: String,
    pub name: String,
    #[serde(default)]
    pub evs: Evs,
}

impl RosterEntry {
    pub fn from_animal(animal: &Animal) -> Self {
        Self {
            species: animal.species.clone(),
            name: animal.name.clone(),
            evs: animal.evs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    pub animals: Vec<RosterEntry>,
}

impl TeamRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animals: Vec::new(),
        }
    }

    /// Compress a list of animals
    pub fn from_animals<'a>(
        name: impl Into<String>,
        animals: impl IntoIterator<Item = &'a Animal>,
    ) -> Self {
        Self {
            name: name.into(),
            animals: animals.into_iter().map(RosterEntry::from_animal).collect(),
        }
    }
}

impl Session {
    /// Compress the session's roster under `name`
    pub fn roster_record(&self, name: impl Into<String>) -> TeamRecord {
        TeamRecord::from_animals(name, &self.roster)
    }

    /// Rebuild one saved ally at `level` with full HP
    ///
    /// Skill points left over are the level minus the EVs already spent.
    pub fn reconstruct(&mut self, entry: &RosterEntry, level: u32) -> Result<Animal> {
        let mut animal = self.create_ally(&entry.species, &entry.name, level)?;
        animal = animal.with_evs(entry.evs);
        let spent = animal.evs.total();
        if let Some(progress) = animal.progress_mut() {
            progress.skill_points = progress.skill_points.saturating_sub(spent);
        }
        debug!("rebuilt {} at level {}", animal.name, animal.level);
        Ok(animal)
    }

    /// Rebuild a whole team at `level`
    pub fn reconstruct_team(&mut self, record: &TeamRecord, level: u32) -> Result<Vec<Animal>> {
        record
            .animals
            .iter()
            .map(|entry| self.reconstruct(entry, level))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EvStat;

    #[test]
    fn test_compress_and_rebuild_keep_identity() {
        let mut s = Session::seeded(7).unwrap();
        let mut bear = s.create_ally("Bear", "Bruno", 6).unwrap();
        bear.spend_skill_points(EvStat::Hp, 4);
        let record = TeamRecord::from_animals("mine", [&bear]);

        let rebuilt = s.reconstruct(&record.animals[0], 50).unwrap();
        assert_eq!(rebuilt.species, "Bear");
        assert_eq!(rebuilt.name, "Bruno");
        assert_eq!(rebuilt.evs, bear.evs);
        assert_eq!(rebuilt.level, 50);
        assert_eq!(rebuilt.hp(), rebuilt.max_hp());
        assert_eq!(rebuilt.progress().unwrap().skill_points, 46);
    }

    #[test]
    fn test_record_json_shape() {
        let record = TeamRecord {
            name: "blue".into(),
            animals: vec![RosterEntry {
                species: "Fox".into(),
                name: "Rusty".into(),
                evs: Evs::default(),
            }],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"species\":\"Fox\""));
        let back: TeamRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
