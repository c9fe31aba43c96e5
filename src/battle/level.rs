//! A battle level: grid, actors, teams and turn state
//!
//! The level owns the actor arena. Every actor that stands on the grid is
//! listed by exactly one tile and names that tile in `Actor::tile`; the
//! placement methods here are the only code that changes either side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::battle::flags::Flags;
use crate::battle::selection::TileRequest;
use crate::battle::team::Team;
use crate::battle::turn::TurnManager;
use crate::battle::weather::{Weather, WeatherChances};
use crate::core::types::{ActorId, TeamName};
use crate::entity::{Actor, Animal};
use crate::grid::{Coord, CostGrid, TileMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    /// Battle ends when one team remains
    #[default]
    LastTeamStanding,
    /// Never ends by elimination
    Exploration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory(TeamName),
    Draw,
}

#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub map: TileMap,
    actors: BTreeMap<ActorId, Actor>,
    /// Defeated animals, kept readable for end-of-fight hooks
    fallen: BTreeMap<ActorId, Actor>,
    pub teams: Vec<Team>,
    pub flags: Flags,
    pub weather: Weather,
    pub weather_chances: WeatherChances,
    pub turn: TurnManager,
    pub win_condition: WinCondition,
    pub outcome: Option<Outcome>,
    pub(crate) pending_selection: Option<TileRequest>,
    pub exit_requested: Option<u32>,
    pub fog_of_war: bool,
}

impl Level {
    pub fn new(name: impl Into<String>, map: TileMap) -> Self {
        Self {
            name: name.into(),
            map,
            actors: BTreeMap::new(),
            fallen: BTreeMap::new(),
            teams: Vec::new(),
            flags: Flags::new(),
            weather: Weather::Normal,
            weather_chances: WeatherChances::default(),
            turn: TurnManager::new(),
            win_condition: WinCondition::LastTeamStanding,
            outcome: None,
            pending_selection: None,
            exit_requested: None,
            fog_of_war: false,
        }
    }

    // === ACTORS ===

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn fallen(&self, id: ActorId) -> Option<&Actor> {
        self.fallen.get(&id)
    }

    pub fn fallen_actors(&self) -> impl Iterator<Item = &Actor> {
        self.fallen.values()
    }

    /// Live animal on the level
    pub fn animal(&self, id: ActorId) -> Option<&Animal> {
        self.actors.get(&id).and_then(|a| a.as_animal())
    }

    pub fn animal_mut(&mut self, id: ActorId) -> Option<&mut Animal> {
        self.actors.get_mut(&id).and_then(|a| a.as_animal_mut())
    }

    /// Live animals in id order
    pub fn animal_ids(&self) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|a| a.is_animal() && a.tile.is_some())
            .map(|a| a.id)
            .collect()
    }

    /// Add an actor to the arena, on `at` if given
    ///
    /// Panics if the id is already in use.
    pub fn insert(&mut self, mut actor: Actor, at: Option<Coord>) {
        assert!(
            !self.actors.contains_key(&actor.id),
            "actor {} inserted twice",
            actor.id
        );
        actor.tile = None;
        let id = actor.id;
        self.actors.insert(id, actor);
        if let Some(coord) = at {
            self.place(id, coord);
        }
    }

    /// Put an off-grid actor on `coord`
    pub fn place(&mut self, id: ActorId, coord: Coord) -> bool {
        let Some(actor) = self.actors.get(&id) else {
            return false;
        };
        assert!(actor.tile.is_none(), "actor {} is already on a tile", id);
        if !self.map.add_occupant(coord, id) {
            return false;
        }
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.tile = Some(coord);
        }
        true
    }

    /// Take an actor off the grid; returns the tile it left
    pub fn lift(&mut self, id: ActorId) -> Option<Coord> {
        let actor = self.actors.get_mut(&id)?;
        let coord = actor.tile.take()?;
        let removed = self.map.remove_occupant(coord, id);
        assert!(removed, "actor {} claimed {} but was not listed", id, coord);
        Some(coord)
    }

    /// Move an on-grid actor to `to`
    pub fn relocate(&mut self, id: ActorId, to: Coord) -> Option<Coord> {
        if !self.map.in_bounds(to) {
            return None;
        }
        let from = self.lift(id)?;
        self.place(id, to);
        Some(from)
    }

    /// Delete a non-animal actor entirely
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.lift(id);
        self.actors.remove(&id)
    }

    /// Move a defeated animal to the graveyard
    pub fn bury(&mut self, id: ActorId) {
        self.lift(id);
        if let Some(actor) = self.actors.remove(&id) {
            self.fallen.insert(id, actor);
        }
    }

    /// All actors, live and fallen, consumed
    pub fn into_actors(self) -> impl Iterator<Item = Actor> {
        self.actors.into_values().chain(self.fallen.into_values())
    }

    // === TEAMS ===

    pub fn team(&self, name: &TeamName) -> Option<&Team> {
        self.teams.iter().find(|t| &t.name == name)
    }

    pub fn team_mut(&mut self, name: &TeamName) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| &t.name == name)
    }

    pub fn team_index(&self, name: &TeamName) -> Option<usize> {
        self.teams.iter().position(|t| &t.name == name)
    }

    pub fn current_team(&self) -> Option<&Team> {
        self.teams.get(self.turn.current())
    }

    pub fn is_current_team(&self, name: &TeamName) -> bool {
        self.current_team().map(|t| &t.name == name).unwrap_or(false)
    }

    /// Put an animal on a team
    ///
    /// Panics if the animal already belongs to a different team.
    pub fn add_to_team(&mut self, id: ActorId, team: &TeamName) -> bool {
        let Some(animal) = self.animal_mut(id) else {
            return false;
        };
        if let Some(existing) = &animal.team {
            assert!(existing == team, "{} is already on team {}", id, existing);
        }
        animal.team = Some(team.clone());
        match self.team_mut(team) {
            Some(t) => {
                t.push(id);
                true
            }
            None => false,
        }
    }

    /// Take an animal off its team; returns the team name it left
    pub fn remove_from_team(&mut self, id: ActorId) -> Option<TeamName> {
        let name = self
            .actors
            .get_mut(&id)
            .or_else(|| self.fallen.get_mut(&id))
            .and_then(|a| a.as_animal_mut())
            .and_then(|a| a.team.take())?;
        if let Some(team) = self.team_mut(&name) {
            team.remove(id);
        }
        Some(name)
    }

    // === GRID ===

    /// Movement cost of every tile for one animal
    ///
    /// Walls for the species and tiles holding a blocking actor cost 0.
    pub fn cost_grid_for(&self, id: ActorId) -> Option<CostGrid> {
        let animal = self.animal(id)?;
        let costs = &animal.base.terrain_costs;
        Some(CostGrid::from_fn(self.map.width(), self.map.height(), |coord| {
            let Some(tile) = self.map.get(coord) else {
                return 0;
            };
            let blocked = tile
                .occupants()
                .iter()
                .filter(|o| **o != id)
                .filter_map(|o| self.actors.get(o))
                .any(|a| a.blocks_movement());
            if blocked {
                0
            } else {
                costs.cost(tile.terrain)
            }
        }))
    }

    /// First empty tile on non-impassable terrain within 10 of `center`
    pub fn closest_empty_tile(&self, center: Coord) -> Option<Coord> {
        for radius in 0..=10u32 {
            let found = self
                .map
                .tiles_within_radius(center, radius)
                .into_iter()
                .filter(|c| c.distance(&center) == radius)
                .find(|c| {
                    self.map
                        .get(*c)
                        .map(|t| t.is_empty() && !t.terrain.is_impassable_default())
                        .unwrap_or(false)
                });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Actor ids on a tile, excluding `except`
    pub fn others_on(&self, coord: Coord, except: ActorId) -> Vec<ActorId> {
        self.map
            .occupants(coord)
            .iter()
            .copied()
            .filter(|o| *o != except)
            .collect()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ActorKind;
    use crate::grid::Terrain;

    fn sign(id: u32) -> Actor {
        Actor::new(
            ActorId(id),
            "Sign",
            ActorKind::Obstacle {
                dialogue: vec![],
                item: None,
            },
        )
    }

    #[test]
    fn test_place_and_relocate_keep_both_sides() {
        let mut level = Level::new("t", TileMap::new(4, 4, Terrain::Grass));
        level.insert(sign(1), Some(Coord::new(0, 0)));
        assert_eq!(level.map.occupants(Coord::new(0, 0)), &[ActorId(1)]);

        assert_eq!(level.relocate(ActorId(1), Coord::new(2, 2)), Some(Coord::new(0, 0)));
        assert!(level.map.occupants(Coord::new(0, 0)).is_empty());
        assert_eq!(level.map.occupants(Coord::new(2, 2)), &[ActorId(1)]);
        assert_eq!(level.actor(ActorId(1)).unwrap().tile, Some(Coord::new(2, 2)));
    }

    #[test]
    fn test_relocate_out_of_bounds_is_refused() {
        let mut level = Level::new("t", TileMap::new(2, 2, Terrain::Grass));
        level.insert(sign(1), Some(Coord::new(0, 0)));
        assert_eq!(level.relocate(ActorId(1), Coord::new(5, 5)), None);
        assert_eq!(level.actor(ActorId(1)).unwrap().tile, Some(Coord::new(0, 0)));
    }

    #[test]
    #[should_panic]
    fn test_double_insert_panics() {
        let mut level = Level::new("t", TileMap::new(2, 2, Terrain::Grass));
        level.insert(sign(1), None);
        level.insert(sign(1), None);
    }

    #[test]
    fn test_closest_empty_tile_skips_occupied_and_water() {
        let mut level = Level::new(
            "t",
            TileMap::from_rows(&["g w g", "g g g"]).unwrap(),
        );
        level.insert(sign(1), Some(Coord::new(0, 0)));
        // (1,0) is water, (0,1) is the first empty tile at distance 1
        assert_eq!(level.closest_empty_tile(Coord::new(0, 0)), Some(Coord::new(0, 1)));
        assert_eq!(level.closest_empty_tile(Coord::new(2, 0)), Some(Coord::new(2, 0)));
    }
}
