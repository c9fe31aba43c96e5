//! Terrain types and per-species movement costs
//!
//! The terrain index order is fixed; species cost tables are written as one
//! digit per terrain in exactly this order.

use serde::{Deserialize, Serialize};

use crate::core::error::{BattleError, Result};

/// Number of terrain types
pub const TERRAIN_COUNT: usize = 29;

/// Background terrain of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Terrain {
    Alpine,
    Brick,
    BridgeEw,
    BridgeNs,
    Concrete,
    Dirt,
    DirtTile,
    Empty,
    Fairway,
    Forest,
    #[default]
    Grass,
    Haunted,
    Ice,
    Lava,
    Mud,
    Path,
    RedCarpet,
    Road,
    Sand,
    SandLight,
    SandSoft,
    Savannah,
    Snow,
    Swamp,
    Tile,
    Water,
    WaterGreen,
    WaterShallow,
    Wood,
}

impl Terrain {
    /// All terrains in index order
    pub const ALL: [Terrain; TERRAIN_COUNT] = [
        Terrain::Alpine,
        Terrain::Brick,
        Terrain::BridgeEw,
        Terrain::BridgeNs,
        Terrain::Concrete,
        Terrain::Dirt,
        Terrain::DirtTile,
        Terrain::Empty,
        Terrain::Fairway,
        Terrain::Forest,
        Terrain::Grass,
        Terrain::Haunted,
        Terrain::Ice,
        Terrain::Lava,
        Terrain::Mud,
        Terrain::Path,
        Terrain::RedCarpet,
        Terrain::Road,
        Terrain::Sand,
        Terrain::SandLight,
        Terrain::SandSoft,
        Terrain::Savannah,
        Terrain::Snow,
        Terrain::Swamp,
        Terrain::Tile,
        Terrain::Water,
        Terrain::WaterGreen,
        Terrain::WaterShallow,
        Terrain::Wood,
    ];

    /// Position in the cost table
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Map shorthand used in level files
    pub fn code(&self) -> &'static str {
        match self {
            Terrain::Alpine => "a",
            Terrain::Brick => "B",
            Terrain::BridgeEw => "be",
            Terrain::BridgeNs => "bn",
            Terrain::Concrete => "c",
            Terrain::Dirt => "d",
            Terrain::DirtTile => "D",
            Terrain::Empty => "e",
            Terrain::Fairway => "F",
            Terrain::Forest => "f",
            Terrain::Grass => "g",
            Terrain::Haunted => "h",
            Terrain::Ice => "i",
            Terrain::Lava => "l",
            Terrain::Mud => "m",
            Terrain::Path => "p",
            Terrain::RedCarpet => "R",
            Terrain::Road => "r",
            Terrain::Sand => "S",
            Terrain::SandLight => "Sl",
            Terrain::SandSoft => "Ss",
            Terrain::Savannah => "sv",
            Terrain::Snow => "s",
            Terrain::Swamp => "sw",
            Terrain::Tile => "t",
            Terrain::Water => "w",
            Terrain::WaterGreen => "wg",
            Terrain::WaterShallow => "ws",
            Terrain::Wood => "W",
        }
    }

    pub fn from_code(code: &str) -> Option<Terrain> {
        Terrain::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Impassable regardless of species when searching for open ground
    pub fn is_impassable_default(&self) -> bool {
        matches!(
            self,
            Terrain::Alpine | Terrain::Empty | Terrain::Lava | Terrain::Water
        )
    }

    pub fn is_water(&self) -> bool {
        matches!(
            self,
            Terrain::Water | Terrain::WaterGreen | Terrain::WaterShallow
        )
    }
}

impl std::str::FromStr for Terrain {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self> {
        Terrain::from_code(s).ok_or_else(|| BattleError::UnknownTerrain(s.to_string()))
    }
}

/// Movement cost per terrain for one species; 0 marks a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TerrainCosts([u8; TERRAIN_COUNT]);

impl TerrainCosts {
    /// Every terrain costs `cost`
    pub fn uniform(cost: u8) -> Self {
        Self([cost; TERRAIN_COUNT])
    }

    /// Parse a 29-digit table such as `01111220111120211121112210221`
    pub fn parse(species: &str, digits: &str) -> Result<Self> {
        let malformed = |reason: String| BattleError::MalformedTerrainCosts {
            species: species.to_string(),
            reason,
        };

        let digits = digits.trim();
        if digits.chars().count() != TERRAIN_COUNT {
            return Err(malformed(format!(
                "expected {} digits, found {}",
                TERRAIN_COUNT,
                digits.chars().count()
            )));
        }

        let mut costs = [0u8; TERRAIN_COUNT];
        for (slot, ch) in costs.iter_mut().zip(digits.chars()) {
            *slot = ch
                .to_digit(10)
                .ok_or_else(|| malformed(format!("'{}' is not a digit", ch)))? as u8;
        }
        Ok(Self(costs))
    }

    pub fn cost(&self, terrain: Terrain) -> u32 {
        self.0[terrain.index()] as u32
    }

    pub fn with_cost(mut self, terrain: Terrain, cost: u8) -> Self {
        self.0[terrain.index()] = cost;
        self
    }
}

impl TryFrom<String> for TerrainCosts {
    type Error = BattleError;

    fn try_from(value: String) -> Result<Self> {
        TerrainCosts::parse("<table>", &value)
    }
}

impl From<TerrainCosts> for String {
    fn from(costs: TerrainCosts) -> Self {
        costs.0.iter().map(|c| char::from(b'0' + *c)).collect()
    }
}
