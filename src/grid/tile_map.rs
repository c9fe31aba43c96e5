//! Level tile grid
//!
//! Exactly one `Tile` per coordinate, stored row-major. The map is the
//! authority on which actor stands where; the level keeps each actor's
//! coordinate in step with it.

use serde::{Deserialize, Serialize};

use crate::core::error::{BattleError, Result};
use crate::core::types::ActorId;
use crate::grid::coord::Coord;
use crate::grid::terrain::Terrain;
use crate::grid::tile::{HighlightTag, Tile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Create a map filled with one terrain
    pub fn new(width: u32, height: u32, terrain: Terrain) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                tiles.push(Tile::new(Coord::new(x, y), terrain));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Build a map from rows of whitespace-separated terrain codes
    ///
    /// ```
    /// use beast_tactics::grid::TileMap;
    /// let map = TileMap::from_rows(&["g g w", "g f w"]).unwrap();
    /// assert_eq!(map.width(), 3);
    /// ```
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let mut tiles = Vec::new();
        let mut width = None;

        for (y, row) in rows.iter().enumerate() {
            let codes: Vec<&str> = row.as_ref().split_whitespace().collect();
            match width {
                None => width = Some(codes.len()),
                Some(w) if w != codes.len() => {
                    return Err(BattleError::InvalidLevel(format!(
                        "row {} has {} tiles, expected {}",
                        y,
                        codes.len(),
                        w
                    )));
                }
                Some(_) => {}
            }
            for (x, code) in codes.iter().enumerate() {
                let terrain: Terrain = code.parse()?;
                tiles.push(Tile::new(Coord::new(x as i32, y as i32), terrain));
            }
        }

        let width = width.unwrap_or(0);
        if width == 0 {
            return Err(BattleError::InvalidLevel("map has no tiles".into()));
        }

        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinate is within map bounds
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width as i32 && coord.y < self.height as i32
    }

    pub(crate) fn index_of(&self, coord: Coord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| (coord.y as u32 * self.width + coord.x as u32) as usize)
    }

    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.index_of(coord).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.index_of(coord).map(move |i| &mut self.tiles[i])
    }

    /// All tiles, row-major
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.tiles.iter().map(|t| t.coord)
    }

    pub fn terrain(&self, coord: Coord) -> Option<Terrain> {
        self.get(coord).map(|t| t.terrain)
    }

    /// Set terrain on a tile
    pub fn set_terrain(&mut self, coord: Coord, terrain: Terrain) -> bool {
        match self.get_mut(coord) {
            Some(tile) => {
                tile.terrain = terrain;
                true
            }
            None => false,
        }
    }

    /// Manhattan diamond around `center`, clipped to the map, row-major
    pub fn tiles_within_radius(&self, center: Coord, radius: u32) -> Vec<Coord> {
        center
            .diamond(radius)
            .into_iter()
            .filter(|c| self.in_bounds(*c))
            .collect()
    }

    pub fn occupants(&self, coord: Coord) -> &[ActorId] {
        self.get(coord).map(|t| t.occupants()).unwrap_or(&[])
    }

    /// Put an actor on a tile
    ///
    /// Panics if the tile already lists the actor.
    pub(crate) fn add_occupant(&mut self, coord: Coord, id: ActorId) -> bool {
        let Some(tile) = self.get_mut(coord) else {
            return false;
        };
        assert!(!tile.contains(id), "actor {} already on tile {}", id, coord);
        tile.occupants.push(id);
        true
    }

    pub(crate) fn remove_occupant(&mut self, coord: Coord, id: ActorId) -> bool {
        let Some(tile) = self.get_mut(coord) else {
            return false;
        };
        let before = tile.occupants.len();
        tile.occupants.retain(|o| *o != id);
        tile.occupants.len() != before
    }

    pub fn highlight(&mut self, coords: &[Coord], tag: HighlightTag) {
        for coord in coords {
            if let Some(tile) = self.get_mut(*coord) {
                tile.highlight = Some(tag);
            }
        }
    }

    pub fn clear_highlights(&mut self) {
        for tile in &mut self.tiles {
            tile.highlight = None;
        }
    }

    pub fn highlighted(&self) -> Vec<Coord> {
        self.tiles
            .iter()
            .filter(|t| t.highlight.is_some())
            .map(|t| t.coord)
            .collect()
    }

    pub(crate) fn set_path(&mut self, coord: Coord, path: Vec<Coord>) {
        if let Some(tile) = self.get_mut(coord) {
            tile.path = path;
        }
    }

    pub(crate) fn clear_paths(&mut self) {
        for tile in &mut self.tiles {
            tile.path.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_map_is_filled() {
        let map = TileMap::new(4, 3, Terrain::Grass);
        assert_eq!(map.tiles().count(), 12);
        assert_eq!(map.terrain(Coord::new(3, 2)), Some(Terrain::Grass));
        assert!(map.get(Coord::new(4, 0)).is_none());
        assert!(map.get(Coord::new(0, -1)).is_none());
    }

    #[test]
    fn test_from_rows_multi_char_codes() {
        let map = TileMap::from_rows(&["g Sl w", "be ws W"]).unwrap();
        assert_eq!(map.terrain(Coord::new(1, 0)), Some(Terrain::SandLight));
        assert_eq!(map.terrain(Coord::new(0, 1)), Some(Terrain::BridgeEw));
        assert_eq!(map.terrain(Coord::new(2, 1)), Some(Terrain::Wood));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(matches!(
            TileMap::from_rows(&["g g", "g"]),
            Err(BattleError::InvalidLevel(_))
        ));
        assert!(matches!(
            TileMap::from_rows(&["g q"]),
            Err(BattleError::UnknownTerrain(_))
        ));
    }

    #[test]
    fn test_radius_clipped_at_corner() {
        let map = TileMap::new(5, 5, Terrain::Grass);
        let tiles = map.tiles_within_radius(Coord::new(0, 0), 2);
        // (0,0) (1,0) (2,0) (0,1) (1,1) (0,2)
        assert_eq!(tiles.len(), 6);
        assert!(tiles.iter().all(|c| c.distance(&Coord::new(0, 0)) <= 2));
    }

    #[test]
    fn test_occupants_add_remove() {
        let mut map = TileMap::new(3, 3, Terrain::Grass);
        let c = Coord::new(1, 1);
        assert!(map.add_occupant(c, ActorId(1)));
        assert!(map.add_occupant(c, ActorId(2)));
        assert_eq!(map.occupants(c), &[ActorId(1), ActorId(2)]);
        assert!(map.remove_occupant(c, ActorId(1)));
        assert!(!map.remove_occupant(c, ActorId(1)));
        assert_eq!(map.occupants(c), &[ActorId(2)]);
    }

    #[test]
    #[should_panic]
    fn test_double_add_panics() {
        let mut map = TileMap::new(2, 2, Terrain::Grass);
        map.add_occupant(Coord::new(0, 0), ActorId(1));
        map.add_occupant(Coord::new(0, 0), ActorId(1));
    }

    #[test]
    fn test_highlights() {
        let mut map = TileMap::new(3, 3, Terrain::Grass);
        map.highlight(&[Coord::new(0, 0), Coord::new(2, 2)], HighlightTag::Move);
        assert_eq!(map.highlighted().len(), 2);
        map.clear_highlights();
        assert!(map.highlighted().is_empty());
    }
}
