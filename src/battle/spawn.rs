//! Level files and setting up a battle
//!
//! A `LevelSpec` is the TOML description of a level: terrain rows, teams,
//! pre-placed units, field objects and spawn zones. Loading builds the
//! `Level`, brings in up to `max_active_allies` roster allies, and starts
//! the first team turn.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::battle::events::BattleEvent;
use crate::battle::level::{Level, Outcome, WinCondition};
use crate::battle::team::{Controller, Team};
use crate::battle::weather::{Weather, WeatherChances};
use crate::core::error::{BattleError, Result};
use crate::core::types::{ActorId, TeamName};
use crate::entity::{Actor, ActorKind, Animal, AnimalKind, SteppableKind};
use crate::grid::{Coord, TileMap};
use crate::persistence::TeamRecord;
use crate::session::Session;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    /// Rows of whitespace-separated terrain codes, top row first
    pub terrain: Vec<String>,
    #[serde(default)]
    pub win_condition: WinCondition,
    #[serde(default)]
    pub fog_of_war: bool,
    /// Weather name to chance; left out means the stock chances
    #[serde(default)]
    pub weather: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub teams: Vec<TeamSpec>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub spawn_zones: Vec<SpawnZone>,
    #[serde(default)]
    pub tile_flags: Vec<TileFlagSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub controller: Controller,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub team: String,
    pub species: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Rolled around the roster when left out
    #[serde(default)]
    pub level: Option<u32>,
    pub at: [i32; 2],
    #[serde(default)]
    pub drop_item: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Handle other objects use to refer to this one
    #[serde(default)]
    pub key: Option<String>,
    pub name: String,
    pub at: [i32; 2],
    /// Starts off the grid until something reveals it
    #[serde(default)]
    pub hidden: bool,
    pub kind: ObjectKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Obstacle {
        #[serde(default)]
        dialogue: Vec<String>,
        #[serde(default)]
        item: Option<String>,
    },
    Npc {
        dialogue: Vec<String>,
    },
    Item {
        item: String,
    },
    Exit {
        index: u32,
    },
    Acorn {
        tosser: String,
        damage_percent: f64,
    },
    /// Toggles the object with key `target`
    PressurePad {
        target: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnZone {
    pub team: String,
    pub tiles: Vec<[i32; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileFlagSpec {
    pub at: [i32; 2],
    pub flag: String,
}

fn coord(at: [i32; 2]) -> Coord {
    Coord::new(at[0], at[1])
}

impl LevelSpec {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    fn weather_chances(&self) -> Result<WeatherChances> {
        let Some(raw) = &self.weather else {
            return Ok(WeatherChances::default());
        };
        let mut chances = WeatherChances::none();
        for (name, chance) in raw {
            let weather: Weather = name.parse().map_err(BattleError::InvalidLevel)?;
            chances.0.insert(weather, *chance);
        }
        if chances.total() > 1.0 {
            return Err(BattleError::InvalidLevel(format!(
                "weather chances add up to {}",
                chances.total()
            )));
        }
        Ok(chances)
    }

    /// Teams as written, or allies against an AI enemy team
    fn teams(&self) -> Vec<Team> {
        if self.teams.is_empty() {
            return vec![
                Team::new(TeamName::allies(), "Allies", Controller::Human),
                Team::new(TeamName::enemies(), "Enemies", Controller::Ai),
            ];
        }
        self.teams
            .iter()
            .map(|t| {
                let display = t.display_name.clone().unwrap_or_else(|| t.name.clone());
                Team::new(TeamName::new(t.name.as_str()), display, t.controller)
            })
            .collect()
    }

    fn zone(&self, team: &str) -> Option<Vec<Coord>> {
        self.spawn_zones
            .iter()
            .find(|z| z.team == team)
            .map(|z| z.tiles.iter().copied().map(coord).collect())
    }
}

impl Session {
    /// Set up `spec` with the active roster allies and start the battle
    pub fn load_level(&mut self, spec: &LevelSpec) -> Result<()> {
        let level = self.build_level(spec, spec.teams())?;
        self.install(level);
        let roster = self.roster.clone();
        if let Err(e) = self.populate(spec) {
            warn!("abandoning level {}: {}", spec.name, e);
            self.take_level();
            self.roster = roster;
            return Err(e);
        }
        self.open_level()
    }

    fn populate(&mut self, spec: &LevelSpec) -> Result<()> {
        self.spawn_objects(spec)?;

        let allies = TeamName::allies();
        let has_allies = self.level()?.team(&allies).is_some();
        if has_allies {
            let (active, resting): (Vec<Animal>, Vec<Animal>) = std::mem::take(&mut self.roster)
                .into_iter()
                .partition(|a| a.progress().map(|p| p.active).unwrap_or(false));
            let zone = spec.zone(TeamName::ALLIES);
            if !active.is_empty() && zone.is_none() {
                return Err(BattleError::InvalidLevel("no spawn zone for allies".into()));
            }
            let limit = self.config.max_active_allies;
            let (bring, stay) = split_at_most(active, limit);
            self.roster = resting;
            self.roster.extend(stay);
            if let Some(zone) = zone.filter(|_| !bring.is_empty()) {
                self.place_group(bring, &allies, &zone)?;
            }
        }

        for unit in &spec.units {
            self.spawn_unit(unit)?;
        }
        Ok(())
    }

    /// Local multiplayer: 2 to 4 human teams rebuilt at max level
    ///
    /// Team `i` spawns in the level's `i`-th spawn zone.
    pub fn start_hotseat(&mut self, spec: &LevelSpec, records: &[TeamRecord]) -> Result<()> {
        if !(2..=4).contains(&records.len()) {
            return Err(BattleError::InvalidLevel(format!(
                "hotseat needs 2 to 4 teams, got {}",
                records.len()
            )));
        }
        if spec.spawn_zones.len() < records.len() {
            return Err(BattleError::InvalidLevel(format!(
                "{} teams but only {} spawn zones",
                records.len(),
                spec.spawn_zones.len()
            )));
        }
        let teams = records
            .iter()
            .map(|r| Team::new(TeamName::new(r.name.as_str()), r.name.as_str(), Controller::Human))
            .collect();
        let mut level = self.build_level(spec, teams)?;
        level.win_condition = WinCondition::LastTeamStanding;
        self.install(level);
        if let Err(e) = self.populate_hotseat(spec, records) {
            warn!("abandoning hotseat level {}: {}", spec.name, e);
            self.take_level();
            return Err(e);
        }
        self.open_level()
    }

    fn populate_hotseat(&mut self, spec: &LevelSpec, records: &[TeamRecord]) -> Result<()> {
        self.spawn_objects(spec)?;
        let max_level = self.config.max_level;
        for (record, zone) in records.iter().zip(&spec.spawn_zones) {
            let animals = self.reconstruct_team(record, max_level)?;
            let tiles: Vec<Coord> = zone.tiles.iter().copied().map(coord).collect();
            self.place_group(animals, &TeamName::new(record.name.as_str()), &tiles)?;
        }
        Ok(())
    }

    /// Tear down the level: allies go back to the roster, enemies vanish
    pub fn end_level(&mut self) -> Result<Option<Outcome>> {
        let ids = self.animal_ids();
        for id in ids {
            if let Some(hooks) = self.hooks(id) {
                (hooks.on_level_end)(self, id);
            }
        }
        self.cancel_selection();
        let level = self.take_level().ok_or(BattleError::NoActiveLevel)?;
        let name = level.name.clone();
        let outcome = level.outcome.clone();

        for actor in level.into_actors() {
            let ActorKind::Animal(animal) = actor.kind else {
                continue;
            };
            let mut animal = *animal;
            if !animal.is_ally() {
                continue;
            }
            animal.team = None;
            animal.reset_for_level();
            animal.full_heal();
            self.roster.push(animal);
        }
        info!("Level {} ended", name);
        self.emit(BattleEvent::LevelEnded { name });
        Ok(outcome)
    }

    fn build_level(&mut self, spec: &LevelSpec, teams: Vec<Team>) -> Result<Level> {
        let mut map = TileMap::from_rows(&spec.terrain)?;
        for flag in &spec.tile_flags {
            let tile = map.get_mut(coord(flag.at)).ok_or_else(|| {
                BattleError::InvalidLevel(format!("flag {} is off the map", flag.flag))
            })?;
            tile.flags.insert(flag.flag.clone());
        }
        let mut level = Level::new(spec.name.as_str(), map);
        level.win_condition = spec.win_condition;
        level.fog_of_war = spec.fog_of_war;
        level.weather_chances = spec.weather_chances()?;
        level.teams = teams;
        Ok(level)
    }

    fn install(&mut self, level: Level) {
        if self.has_level() {
            warn!("replacing a level that was never ended");
        }
        self.install_level(level);
    }

    /// Objects first, then pressure pads so they can name any object
    fn spawn_objects(&mut self, spec: &LevelSpec) -> Result<()> {
        let mut keyed: BTreeMap<String, ActorId> = BTreeMap::new();
        let mut hidden = Vec::new();
        let (pads, others): (Vec<&ObjectSpec>, Vec<&ObjectSpec>) = spec
            .objects
            .iter()
            .partition(|o| matches!(o.kind, ObjectKind::PressurePad { .. }));

        for object in others.into_iter().chain(pads) {
            let kind = match &object.kind {
                ObjectKind::Obstacle { dialogue, item } => ActorKind::Obstacle {
                    dialogue: dialogue.clone(),
                    item: item.clone(),
                },
                ObjectKind::Npc { dialogue } => ActorKind::Npc {
                    dialogue: dialogue.clone(),
                },
                ObjectKind::Item { item } => ActorKind::Item { name: item.clone() },
                ObjectKind::Exit { index } => ActorKind::Steppable {
                    kind: SteppableKind::Exit { index: *index },
                    blocks: false,
                },
                ObjectKind::Acorn {
                    tosser,
                    damage_percent,
                } => ActorKind::Steppable {
                    kind: SteppableKind::Acorn {
                        tosser: TeamName::new(tosser.as_str()),
                        damage_percent: *damage_percent,
                    },
                    blocks: false,
                },
                ObjectKind::PressurePad { target } => {
                    let target = *keyed.get(target).ok_or_else(|| {
                        BattleError::InvalidLevel(format!("pressure pad names unknown key {}", target))
                    })?;
                    ActorKind::Steppable {
                        kind: SteppableKind::PressurePad {
                            target,
                            pressed: false,
                        },
                        blocks: false,
                    }
                }
            };
            let id = self.spawn_actor(object.name.as_str(), kind, coord(object.at))?;
            if let Some(key) = &object.key {
                keyed.insert(key.clone(), id);
            }
            if object.hidden {
                hidden.push(id);
            }
        }
        for id in hidden {
            self.toggle_visibility(id);
        }
        Ok(())
    }

    fn spawn_unit(&mut self, unit: &UnitSpec) -> Result<ActorId> {
        let team = TeamName::new(unit.team.as_str());
        if self.level()?.team(&team).is_none() {
            return Err(BattleError::InvalidLevel(format!(
                "unit {} is on unknown team {}",
                unit.species, unit.team
            )));
        }
        let mut animal = if team == TeamName::allies() {
            let level = unit.level.unwrap_or(self.config.min_level);
            let name = unit.name.clone().unwrap_or_else(|| unit.species.clone());
            self.create_ally(&unit.species, &name, level)?
        } else {
            self.create_enemy(&unit.species, unit.level)?
        };
        if let Some(name) = &unit.name {
            animal.name = name.clone();
        }
        if let AnimalKind::Enemy(traits) = &mut animal.kind {
            traits.drop_item = unit.drop_item.clone();
        }
        self.place_animal(animal, &team, coord(unit.at))
    }

    /// Fill `zone` in order, overflowing to the nearest empty tile
    fn place_group(&mut self, animals: Vec<Animal>, team: &TeamName, zone: &[Coord]) -> Result<()> {
        let Some(&first) = zone.first() else {
            return Err(BattleError::InvalidLevel(format!("spawn zone for {} is empty", team)));
        };
        for (i, animal) in animals.into_iter().enumerate() {
            let near = zone.get(i).copied().unwrap_or(first);
            self.place_animal(animal, team, near)?;
        }
        Ok(())
    }

    fn place_animal(&mut self, mut animal: Animal, team: &TeamName, near: Coord) -> Result<ActorId> {
        let at = self.level()?.closest_empty_tile(near).ok_or_else(|| {
            BattleError::InvalidLevel(format!("no room for {} near {}", animal.name, near))
        })?;
        animal.team = None;
        animal.reset_for_level();
        let id = self.next_actor_id();
        let level = self.level_mut()?;
        level.insert(Actor::animal(id, animal), Some(at));
        level.add_to_team(id, team);
        Ok(id)
    }

    /// Fog, weather and the first turn
    fn open_level(&mut self) -> Result<()> {
        let level = self.level_mut()?;
        if level.teams.is_empty() {
            return Err(BattleError::InvalidLevel("level has no teams".into()));
        }
        if level.fog_of_war {
            let all: Vec<Coord> = level.map.coords().collect();
            for team in &mut level.teams {
                team.fog = all.iter().copied().collect();
            }
        }
        let name = level.name.clone();
        for id in self.animal_ids() {
            self.dispel_fog(id);
        }
        info!("Level {} begins", name);
        self.emit(BattleEvent::LevelStarted { name });
        self.level_mut()?.turn.queue_start(0);
        self.pump_turns();
        Ok(())
    }
}

fn split_at_most(mut animals: Vec<Animal>, limit: usize) -> (Vec<Animal>, Vec<Animal>) {
    let rest = animals.split_off(limit.min(animals.len()));
    (animals, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"
        name = "meadow"
        terrain = ["g g g g", "g g g g", "g g w g"]
        weather = { Night = 0.5 }

        [[units]]
        team = "enemies"
        species = "Fox"
        level = 4
        at = [3, 0]
        drop_item = "Berry"

        [[objects]]
        key = "bridge"
        name = "Sign"
        at = [0, 2]
        hidden = true
        kind = { type = "obstacle", dialogue = ["Hello"] }

        [[objects]]
        name = "Pad"
        at = [1, 1]
        kind = { type = "pressure_pad", target = "bridge" }

        [[spawn_zones]]
        team = "allies"
        tiles = [[0, 0], [0, 1]]
    "#;

    #[test]
    fn test_spec_parses() {
        let spec = LevelSpec::from_toml_str(SPEC).unwrap();
        assert_eq!(spec.terrain.len(), 3);
        assert_eq!(spec.units[0].drop_item.as_deref(), Some("Berry"));
        assert!(matches!(spec.objects[1].kind, ObjectKind::PressurePad { .. }));
        let chances = spec.weather_chances().unwrap();
        assert_eq!(chances.pick(0.4), Weather::Night);
        assert_eq!(chances.pick(0.6), Weather::Normal);
    }

    #[test]
    fn test_bad_weather_name_rejected() {
        let mut spec = LevelSpec::from_toml_str(SPEC).unwrap();
        spec.weather = Some([("Hail".to_string(), 0.1)].into_iter().collect());
        assert!(matches!(spec.weather_chances(), Err(BattleError::InvalidLevel(_))));
    }

    #[test]
    fn test_default_teams() {
        let mut spec = LevelSpec::from_toml_str(SPEC).unwrap();
        spec.teams.clear();
        let teams = spec.teams();
        assert_eq!(teams.len(), 2);
        assert!(teams[1].is_ai());
    }

    #[test]
    fn test_split_at_most() {
        let (a, b) = split_at_most(Vec::new(), 5);
        assert!(a.is_empty() && b.is_empty());
    }
}
