//! Ground-truth world the simulation senses and moves in.

use super::cell_grid::CellGrid;
use crate::common::{line_cells, GridPoint};
use crate::domains::grid::OccupancyGrid;

#[derive(Debug, Clone)]
pub struct SimulatedEnvironment {
    truth: CellGrid,
    sensor_range: f64,
}

impl SimulatedEnvironment {
    pub fn new(truth: CellGrid, sensor_range: f64) -> Self {
        Self {
            truth,
            sensor_range: sensor_range.max(1.0),
        }
    }

    pub fn truth(&self) -> &CellGrid {
        &self.truth
    }

    pub fn width(&self) -> i32 {
        self.truth.width()
    }

    pub fn height(&self) -> i32 {
        self.truth.height()
    }

    pub fn sensor_range(&self) -> f64 {
        self.sensor_range
    }

    /// Cast rays to every cell within sensor range and copy what they hit into
    /// `belief`. A ray stops at the first obstacle. Returns the number of cells
    /// that were unknown before.
    pub fn sense(&self, belief: &mut dyn OccupancyGrid, at: GridPoint) -> usize {
        let reach = self.sensor_range.ceil() as i32;
        let mut learned = 0;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let target = at.offset(dx, dy);
                if !self.truth.location_exists(target.x, target.y) || at.distance(&target) > self.sensor_range {
                    continue;
                }
                for cell in line_cells(at, target) {
                    let was_known = belief.known_at(cell.x, cell.y);
                    if self.truth.obstacle_at(cell.x, cell.y) {
                        if !was_known {
                            belief.set_obstacle(cell.x, cell.y);
                            learned += 1;
                        }
                        break;
                    }
                    if !self.truth.free_space_at(cell.x, cell.y) {
                        break;
                    }
                    if !was_known {
                        belief.set_free_space(cell.x, cell.y);
                        learned += 1;
                    }
                }
            }
        }
        learned
    }

    /// A move is valid when it stays on the map and crosses only free cells.
    pub fn valid_move(&self, from: GridPoint, to: GridPoint) -> bool {
        self.truth.free_space_at(to.x, to.y)
            && line_cells(from, to)
                .iter()
                .all(|c| self.truth.free_space_at(c.x, c.y))
    }
}
