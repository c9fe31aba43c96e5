//! A single grid tile

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::ActorId;
use crate::grid::coord::Coord;
use crate::grid::terrain::Terrain;

/// Highlight painted on a tile while a selection is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightTag {
    Move,
    Attack,
    Item,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub coord: Coord,
    pub terrain: Terrain,
    /// Named boolean markers such as `bridgeable`
    pub flags: BTreeSet<String>,
    /// Actors standing here, in arrival order
    pub(crate) occupants: Vec<ActorId>,
    pub highlight: Option<HighlightTag>,
    /// Route from the last move query's origin, excluding the origin
    pub(crate) path: Vec<Coord>,
}

impl Tile {
    pub fn new(coord: Coord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            flags: BTreeSet::new(),
            occupants: Vec::new(),
            highlight: None,
            path: Vec::new(),
        }
    }

    pub fn occupants(&self) -> &[ActorId] {
        &self.occupants
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.occupants.contains(&id)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn cached_path(&self) -> &[Coord] {
        &self.path
    }
}
