//! Everything that can stand on a tile

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, TeamName};
use crate::entity::animal::Animal;
use crate::grid::Coord;

/// What happens when a unit steps onto a steppable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SteppableKind {
    /// Hidden trap; hurts anyone outside the tosser's team
    Acorn { tosser: TeamName, damage_percent: f64 },
    /// Leaves the level through exit `index`
    Exit { index: u32 },
    /// Toggles the visibility of another actor
    PressurePad { target: ActorId, pressed: bool },
}

#[derive(Debug, Clone)]
pub enum ActorKind {
    Animal(Box<Animal>),
    Steppable { kind: SteppableKind, blocks: bool },
    /// Signs, bookshelves; may hand out one item
    Obstacle {
        dialogue: Vec<String>,
        item: Option<String>,
    },
    Item { name: String },
    Npc { dialogue: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    /// Tile listing this actor; `None` while off the grid
    pub tile: Option<Coord>,
    /// Tile a hidden actor returns to when revealed
    pub hidden_at: Option<Coord>,
    pub kind: ActorKind,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            id,
            name: name.into(),
            tile: None,
            hidden_at: None,
            kind,
        }
    }

    pub fn animal(id: ActorId, animal: Animal) -> Self {
        let name = animal.name.clone();
        Self::new(id, name, ActorKind::Animal(Box::new(animal)))
    }

    pub fn as_animal(&self) -> Option<&Animal> {
        match &self.kind {
            ActorKind::Animal(animal) => Some(animal),
            _ => None,
        }
    }

    pub fn as_animal_mut(&mut self) -> Option<&mut Animal> {
        match &mut self.kind {
            ActorKind::Animal(animal) => Some(animal),
            _ => None,
        }
    }

    pub fn is_animal(&self) -> bool {
        matches!(self.kind, ActorKind::Animal(_))
    }

    pub fn is_hidden(&self) -> bool {
        self.tile.is_none() && self.hidden_at.is_some()
    }

    /// Whether other units are kept off this actor's tile
    pub fn blocks_movement(&self) -> bool {
        match &self.kind {
            ActorKind::Animal(_) | ActorKind::Obstacle { .. } | ActorKind::Npc { .. } => true,
            ActorKind::Steppable { blocks, .. } => *blocks,
            ActorKind::Item { .. } => false,
        }
    }

    /// Whether a unit may interact from an adjacent tile
    pub fn can_interact_at_distance(&self) -> bool {
        matches!(
            self.kind,
            ActorKind::Obstacle { .. } | ActorKind::Npc { .. }
        )
    }

    pub fn is_steppable(&self) -> bool {
        matches!(self.kind, ActorKind::Steppable { .. } | ActorKind::Item { .. })
    }
}
