//! Weighted-grid pathfinding
//!
//! Costs come from a per-unit `CostGrid`; a cost of 0 is a wall. Paths never
//! include their start tile, and a path's cost is the sum of the costs of
//! the tiles it enters.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use crate::grid::coord::Coord;

/// Per-unit movement cost of every tile in a level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostGrid {
    width: u32,
    height: u32,
    costs: Vec<u32>,
}

impl CostGrid {
    pub fn uniform(width: u32, height: u32, cost: u32) -> Self {
        Self {
            width,
            height,
            costs: vec![cost; (width * height) as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut cost: impl FnMut(Coord) -> u32) -> Self {
        let mut costs = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                costs.push(cost(Coord::new(x, y)));
            }
        }
        Self {
            width,
            height,
            costs,
        }
    }

    fn index_of(&self, coord: Coord) -> Option<usize> {
        let inside = coord.x >= 0
            && coord.y >= 0
            && coord.x < self.width as i32
            && coord.y < self.height as i32;
        inside.then(|| (coord.y as u32 * self.width + coord.x as u32) as usize)
    }

    /// Cost to enter `coord`; 0 for walls and out-of-bounds
    pub fn cost(&self, coord: Coord) -> u32 {
        self.index_of(coord).map(|i| self.costs[i]).unwrap_or(0)
    }

    pub fn set(&mut self, coord: Coord, cost: u32) {
        if let Some(i) = self.index_of(coord) {
            self.costs[i] = cost;
        }
    }

    pub fn is_passable(&self, coord: Coord) -> bool {
        self.cost(coord) > 0
    }
}

/// Node in the open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    coord: Coord,
    f_cost: u32, // g_cost + heuristic
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; ties pop in row-major order
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest path using A* with a Manhattan heuristic
///
/// Returns the tiles entered, excluding `start`. `None` if the goal is a
/// wall or cut off.
pub fn find_path(grid: &CostGrid, start: Coord, goal: Coord) -> Option<Vec<Coord>> {
    if start == goal {
        return Some(Vec::new());
    }
    if !grid.is_passable(goal) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut g_scores: HashMap<Coord, u32> = HashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        f_cost: start.distance(&goal),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, start, goal));
        }

        let current_g = *g_scores.get(&current.coord).unwrap_or(&u32::MAX);

        for neighbor in current.coord.neighbors() {
            let move_cost = grid.cost(neighbor);
            if move_cost == 0 {
                continue;
            }

            let tentative_g = current_g + move_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    coord: neighbor,
                    f_cost: tentative_g + neighbor.distance(&goal),
                });
            }
        }
    }

    None // No path found
}

/// Cheapest path to every tile whose path cost fits `budget`
///
/// A Dijkstra flood from `start`; the start itself is not in the result.
pub fn reachable(grid: &CostGrid, start: Coord, budget: f64) -> BTreeMap<Coord, Vec<Coord>> {
    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut g_scores: HashMap<Coord, u32> = HashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        f_cost: 0,
    });

    while let Some(current) = open_set.pop() {
        let current_g = *g_scores.get(&current.coord).unwrap_or(&u32::MAX);
        if current.f_cost > current_g {
            continue; // stale entry
        }

        for neighbor in current.coord.neighbors() {
            let move_cost = grid.cost(neighbor);
            if move_cost == 0 || neighbor == start {
                continue;
            }

            let tentative_g = current_g + move_cost;
            if tentative_g as f64 > budget {
                continue;
            }

            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);
            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    coord: neighbor,
                    f_cost: tentative_g,
                });
            }
        }
    }

    g_scores
        .keys()
        .filter(|c| **c != start)
        .map(|c| (*c, reconstruct_path(&came_from, start, *c)))
        .collect()
}

/// Reconstruct path from came_from map, dropping the start
fn reconstruct_path(came_from: &HashMap<Coord, Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Calculate path cost (sum of entered tile costs)
pub fn path_cost(grid: &CostGrid, path: &[Coord]) -> u32 {
    path.iter().map(|c| grid.cost(*c)).sum()
}

/// Drop tiles from the end of `path` until its cost fits `budget`
pub fn truncate_to_budget(grid: &CostGrid, mut path: Vec<Coord>, budget: f64) -> Vec<Coord> {
    while !path.is_empty() && path_cost(grid, &path) as f64 > budget {
        path.pop();
    }
    path
}
