//! Tile grid, terrain costs and pathfinding

pub mod coord;
pub mod pathfinding;
pub mod range;
pub mod terrain;
pub mod tile;
pub mod tile_map;

pub use coord::Coord;
pub use pathfinding::{find_path, path_cost, reachable, truncate_to_budget, CostGrid};
pub use range::{attack_tiles, AttackTile, RangeQuery};
pub use terrain::{Terrain, TerrainCosts, TERRAIN_COUNT};
pub use tile::{HighlightTag, Tile};
pub use tile_map::TileMap;
