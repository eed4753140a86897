//! Grid A* over believed free space.

use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;
use crate::domains::path::{Path, PathPlanner};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

const SQRT_2: f64 = std::f64::consts::SQRT_2;

#[derive(Debug, Clone, Copy)]
pub struct AStarConfig {
    /// Allow diagonal moves. A diagonal still needs both orthogonal cells free.
    pub allow_diagonal: bool,
    /// Upper bound on node expansions before giving up.
    pub max_iterations: usize,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            max_iterations: 200_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AStarNode {
    cell: GridPoint,
    f_score: OrderedFloat<f64>,
}

// Reversed so BinaryHeap pops the lowest f first.
impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default, Clone)]
pub struct AStarPlanner {
    config: AStarConfig,
}

impl AStarPlanner {
    pub fn new(config: AStarConfig) -> Self {
        Self { config }
    }

    fn heuristic(&self, a: GridPoint, b: GridPoint) -> f64 {
        let dx = (a.x - b.x).abs() as f64;
        let dy = (a.y - b.y).abs() as f64;
        if self.config.allow_diagonal {
            // octile distance
            dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy)
        } else {
            dx + dy
        }
    }

    fn successors(&self, grid: &dyn OccupancyGrid, cell: GridPoint) -> Vec<(GridPoint, f64)> {
        let mut out = Vec::with_capacity(8);
        for n in cell.neighbours8() {
            if !grid.free_space_at(n.x, n.y) {
                continue;
            }
            let dx = n.x - cell.x;
            let dy = n.y - cell.y;
            if dx != 0 && dy != 0 {
                if !self.config.allow_diagonal
                    || !grid.free_space_at(cell.x + dx, cell.y)
                    || !grid.free_space_at(cell.x, cell.y + dy)
                {
                    continue;
                }
                out.push((n, SQRT_2));
            } else {
                out.push((n, 1.0));
            }
        }
        out
    }
}

impl PathPlanner for AStarPlanner {
    fn calculate_path(&self, grid: &dyn OccupancyGrid, start: GridPoint, goal: GridPoint) -> Path {
        if !grid.location_exists(start.x, start.y) || !grid.free_space_at(goal.x, goal.y) {
            return Path::not_found(start, goal);
        }
        if start == goal {
            return Path::new(start, goal, vec![start]);
        }

        let mut open = BinaryHeap::new();
        let mut came_from: HashMap<GridPoint, GridPoint> = HashMap::new();
        let mut g_score: HashMap<GridPoint, f64> = HashMap::new();

        g_score.insert(start, 0.0);
        open.push(AStarNode {
            cell: start,
            f_score: OrderedFloat(self.heuristic(start, goal)),
        });

        let mut iterations = 0;
        while let Some(AStarNode { cell, f_score }) = open.pop() {
            if cell == goal {
                return Path::new(start, goal, reconstruct(&came_from, goal));
            }
            iterations += 1;
            if iterations > self.config.max_iterations {
                break;
            }

            let g = g_score.get(&cell).copied().unwrap_or(f64::INFINITY);
            // stale heap entry
            if f_score.0 > g + self.heuristic(cell, goal) + 1e-9 {
                continue;
            }

            for (next, cost) in self.successors(grid, cell) {
                let tentative = g + cost;
                if tentative < g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                    came_from.insert(next, cell);
                    g_score.insert(next, tentative);
                    open.push(AStarNode {
                        cell: next,
                        f_score: OrderedFloat(tentative + self.heuristic(next, goal)),
                    });
                }
            }
        }

        Path::not_found(start, goal)
    }
}

fn reconstruct(came_from: &HashMap<GridPoint, GridPoint>, goal: GridPoint) -> Vec<GridPoint> {
    let mut points = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from.get(&current) {
        points.push(*prev);
        current = *prev;
    }
    points.reverse();
    points
}
