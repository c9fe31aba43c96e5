//! Where team records live

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::error::{BattleError, Result};
use crate::persistence::TeamRecord;

pub trait RosterStore {
    /// Write `record` under its name, replacing any older copy
    fn save(&mut self, record: &TeamRecord) -> Result<()>;

    fn load(&self, name: &str) -> Result<TeamRecord>;

    /// Saved team names, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// True if something was deleted
    fn delete(&mut self, name: &str) -> Result<bool>;
}

/// One pretty-printed JSON file per team in a directory
#[derive(Debug, Clone)]
pub struct JsonRosterStore {
    dir: PathBuf,
}

impl JsonRosterStore {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ' ');
        if !valid {
            return Err(BattleError::RecordNotFound(format!("invalid team name '{}'", name)));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

impl RosterStore for JsonRosterStore {
    fn save(&mut self, record: &TeamRecord) -> Result<()> {
        let path = self.path_for(&record.name)?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        info!("saved team {} to {}", record.name, path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<TeamRecord> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(BattleError::RecordNotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        let record = serde_json::from_str(&contents)?;
        debug!("loaded team {}", name);
        Ok(record)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

/// Records kept in memory; for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryRosterStore {
    records: BTreeMap<String, TeamRecord>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterStore for MemoryRosterStore {
    fn save(&mut self, record: &TeamRecord) -> Result<()> {
        self.records.insert(record.name.clone(), record.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<TeamRecord> {
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| BattleError::RecordNotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        Ok(self.records.remove(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Evs;
    use crate::persistence::RosterEntry;

    fn record(name: &str) -> TeamRecord {
        TeamRecord {
            name: name.into(),
            animals: vec![RosterEntry {
                species: "Owl".into(),
                name: "Hoot".into(),
                evs: Evs {
                    speed: 3,
                    ..Evs::default()
                },
            }],
        }
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryRosterStore::new();
        store.save(&record("red")).unwrap();
        store.save(&record("blue")).unwrap();
        assert_eq!(store.list().unwrap(), vec!["blue", "red"]);
        assert_eq!(store.load("red").unwrap(), record("red"));
        assert!(store.delete("red").unwrap());
        assert!(matches!(store.load("red"), Err(BattleError::RecordNotFound(_))));
    }

    #[test]
    fn test_json_store_round_trip_on_disk() {
        let dir = std::env::temp_dir().join(format!("beast-tactics-store-{}", std::process::id()));
        let mut store = JsonRosterStore::open(&dir).unwrap();
        store.save(&record("green")).unwrap();
        assert_eq!(store.list().unwrap(), vec!["green"]);
        assert_eq!(store.load("green").unwrap(), record("green"));
        assert!(store.delete("green").unwrap());
        assert!(!store.delete("green").unwrap());
        assert!(store.load("../etc").is_err());
        let _ = fs::remove_dir_all(dir);
    }
}
