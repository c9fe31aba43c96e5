//! Square-grid coordinates
//!
//! Distances are Manhattan. Ordering is row-major (y, then x) so every
//! ordered collection of coordinates iterates the way a map is read.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Tile position on a level grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance
    pub fn distance(&self, other: &Self) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Absolute per-axis offsets to another coordinate
    pub fn abs_delta(&self, other: &Self) -> (u32, u32) {
        ((self.x - other.x).unsigned_abs(), (self.y - other.y).unsigned_abs())
    }

    /// The four orthogonal neighbours: up, right, down, left
    pub fn neighbors(&self) -> [Coord; 4] {
        [
            Coord::new(self.x, self.y - 1),
            Coord::new(self.x + 1, self.y),
            Coord::new(self.x, self.y + 1),
            Coord::new(self.x - 1, self.y),
        ]
    }

    /// Every coordinate within a Manhattan radius, unclipped, row-major
    pub fn diamond(&self, radius: u32) -> Vec<Coord> {
        let r = radius as i32;
        let mut coords = Vec::new();
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                coords.push(Coord::new(self.x + dx, self.y + dy));
            }
        }
        coords
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Coord::new(1, 1);
        assert_eq!(a.distance(&Coord::new(4, 5)), 7);
        assert_eq!(a.distance(&a), 0);
        assert_eq!(Coord::new(0, 3).distance(&Coord::new(3, 0)), 6);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let c = Coord::new(5, 5);
        for n in c.neighbors() {
            assert_eq!(c.distance(&n), 1);
        }
    }

    #[test]
    fn test_diamond_size() {
        // 2r^2 + 2r + 1 tiles in a Manhattan diamond
        for r in 0..5u32 {
            let expected = (2 * r * r + 2 * r + 1) as usize;
            assert_eq!(Coord::new(0, 0).diamond(r).len(), expected);
        }
    }

    #[test]
    fn test_row_major_order() {
        let mut coords = vec![Coord::new(2, 0), Coord::new(0, 1), Coord::new(1, 0)];
        coords.sort();
        assert_eq!(coords, vec![Coord::new(1, 0), Coord::new(2, 0), Coord::new(0, 1)]);
    }
}
