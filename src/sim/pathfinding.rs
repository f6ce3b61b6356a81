//! A* pathfinding for the reference environment
//!
//! Eight-connected square grid. Diagonal steps may not cut blocked corners.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::core::types::GridPos;

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    cell: GridPos,
    f_cost: u32, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other.f_cost.cmp(&self.f_cost)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Octile distance heuristic
fn heuristic(a: GridPos, b: GridPos) -> u32 {
    let dx = (a.x - b.x).unsigned_abs();
    let dy = (a.y - b.y).unsigned_abs();
    STRAIGHT_COST * dx.max(dy) + (DIAGONAL_COST - STRAIGHT_COST) * dx.min(dy)
}

/// Find a path from `start` to `goal`
///
/// Returns the cells after `start` up to and including `goal` together with
/// the path cost, or `None` if no path exists. `passable` decides which cells
/// may be entered; the goal itself is always allowed.
pub fn find_path(
    start: GridPos,
    goal: GridPos,
    passable: impl Fn(GridPos) -> bool,
) -> Option<(Vec<GridPos>, u32)> {
    if start == goal {
        return Some((Vec::new(), 0));
    }

    let enterable = |cell: GridPos| cell == goal || passable(cell);

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<GridPos, GridPos> = AHashMap::new();
    let mut g_scores: AHashMap<GridPos, u32> = AHashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        cell: start,
        f_cost: heuristic(start, goal),
    });

    while let Some(current) = open_set.pop() {
        let current_g = *g_scores.get(&current.cell).unwrap_or(&u32::MAX);
        if current.cell == goal {
            return Some((reconstruct_path(&came_from, current.cell, start), current_g));
        }

        for (dx, dy) in [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ] {
            let neighbor = GridPos::new(current.cell.x + dx, current.cell.y + dy);
            if !enterable(neighbor) {
                continue;
            }

            let diagonal = dx != 0 && dy != 0;
            if diagonal {
                // No squeezing between two blocked orthogonal cells
                let side_a = GridPos::new(current.cell.x + dx, current.cell.y);
                let side_b = GridPos::new(current.cell.x, current.cell.y + dy);
                if !enterable(side_a) || !enterable(side_b) {
                    continue;
                }
            }

            let step = if diagonal { DIAGONAL_COST } else { STRAIGHT_COST };
            let tentative_g = current_g + step;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.cell);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    cell: neighbor,
                    f_cost: tentative_g + heuristic(neighbor, goal),
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map, without the start cell
fn reconstruct_path(
    came_from: &AHashMap<GridPos, GridPos>,
    mut current: GridPos,
    start: GridPos,
) -> Vec<GridPos> {
    let mut path = vec![current];
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
