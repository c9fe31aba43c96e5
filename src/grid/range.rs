//! Move and attack range queries

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::grid::coord::Coord;
use crate::grid::pathfinding::{reachable, CostGrid};
use crate::grid::tile_map::TileMap;

/// A tile that can be attacked but not entered this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackTile {
    pub coord: Coord,
    /// Where the unit stands to strike `coord`
    pub approach: Coord,
}

/// Everything a unit can move to or strike this turn
#[derive(Debug, Clone, Default)]
pub struct RangeQuery {
    pub origin: Coord,
    /// Reachable tiles and the path to each (origin excluded)
    pub moves: BTreeMap<Coord, Vec<Coord>>,
    /// Attackable tiles outside `moves`, row-major
    pub attacks: Vec<AttackTile>,
}

impl RangeQuery {
    /// Compute move and attack tiles for a unit at `origin`
    pub fn compute(map: &TileMap, grid: &CostGrid, origin: Coord, speed: f64, range: u32) -> Self {
        let moves = reachable(grid, origin, speed);
        let attacks = attack_tiles(map, origin, &moves, range);
        Self {
            origin,
            moves,
            attacks,
        }
    }

    pub fn move_tiles(&self) -> Vec<Coord> {
        self.moves.keys().copied().collect()
    }

    pub fn can_move_to(&self, coord: Coord) -> bool {
        self.moves.contains_key(&coord)
    }

    pub fn path_to(&self, coord: Coord) -> Option<&[Coord]> {
        self.moves.get(&coord).map(|p| p.as_slice())
    }

    pub fn attack_tile(&self, coord: Coord) -> Option<&AttackTile> {
        self.attacks.iter().find(|a| a.coord == coord)
    }

    /// Move tiles plus attack tiles, without the origin
    pub fn tiles_in_range(&self) -> BTreeSet<Coord> {
        self.moves
            .keys()
            .copied()
            .chain(self.attacks.iter().map(|a| a.coord))
            .filter(|c| *c != self.origin)
            .collect()
    }
}

/// Tiles within `range` of the origin or any move tile, minus those tiles
///
/// When several approaches reach the same target the one farthest from it
/// wins; among equals the first in enumeration order (origin, then move
/// tiles row-major) is kept.
pub fn attack_tiles(
    map: &TileMap,
    origin: Coord,
    moves: &BTreeMap<Coord, Vec<Coord>>,
    range: u32,
) -> Vec<AttackTile> {
    let mut best: BTreeMap<Coord, Coord> = BTreeMap::new();
    let approaches = std::iter::once(origin).chain(moves.keys().copied());

    for approach in approaches {
        for target in map.tiles_within_radius(approach, range) {
            if target == origin || moves.contains_key(&target) {
                continue;
            }
            let distance = approach.distance(&target);
            match best.get(&target) {
                Some(current) if current.distance(&target) >= distance => {}
                _ => {
                    best.insert(target, approach);
                }
            }
        }
    }

    best.into_iter()
        .map(|(coord, approach)| AttackTile { coord, approach })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::terrain::Terrain;

    fn open(width: u32, height: u32) -> (TileMap, CostGrid) {
        (
            TileMap::new(width, height, Terrain::Grass),
            CostGrid::uniform(width, height, 1),
        )
    }

    #[test]
    fn test_attack_ring_around_moves() {
        let (map, grid) = open(11, 11);
        let origin = Coord::new(5, 5);
        let query = RangeQuery::compute(&map, &grid, origin, 2.0, 1);
        // radius-3 diamond ring: 4 * 3 tiles
        assert_eq!(query.attacks.len(), 12);
        for attack in &query.attacks {
            assert_eq!(attack.coord.distance(&origin), 3);
            assert_eq!(attack.approach.distance(&attack.coord), 1);
            assert!(query.can_move_to(attack.approach));
        }
    }

    #[test]
    fn test_attack_prefers_standoff() {
        let (map, mut grid) = open(7, 1);
        // enemy at (4,0) blocks movement
        grid.set(Coord::new(4, 0), 0);
        let query = RangeQuery::compute(&map, &grid, Coord::new(0, 0), 2.0, 2);
        // (3,0) is reachable for a strike from (1,0) and (2,0); the farther wins
        let near = query.attack_tile(Coord::new(3, 0)).unwrap();
        assert_eq!(near.approach, Coord::new(1, 0));
        let far = query.attack_tile(Coord::new(4, 0)).unwrap();
        assert_eq!(far.approach, Coord::new(2, 0));
    }

    #[test]
    fn test_origin_never_in_range_set() {
        let (map, grid) = open(5, 5);
        let query = RangeQuery::compute(&map, &grid, Coord::new(2, 2), 1.0, 1);
        assert!(!query.tiles_in_range().contains(&Coord::new(2, 2)));
        assert!(query.attack_tile(Coord::new(2, 2)).is_none());
    }

    #[test]
    fn test_stuck_unit_attacks_from_origin() {
        let (map, grid) = open(3, 3);
        let query = RangeQuery::compute(&map, &grid, Coord::new(1, 1), 0.0, 1);
        assert!(query.moves.is_empty());
        assert_eq!(query.attacks.len(), 4);
        assert!(query.attacks.iter().all(|a| a.approach == Coord::new(1, 1)));
    }
}
