use crate::common::GridPoint;
use std::fmt::Debug;
use std::sync::Arc;

/// Port for an agent's occupancy grid belief.
///
/// Coordinates outside the grid never panic: every predicate returns `false`
/// for them, which callers rely on when probing neighbourhoods near the edge.
pub trait OccupancyGrid: Send + Sync + Debug {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn location_exists(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    fn free_space_at(&self, x: i32, y: i32) -> bool;
    fn obstacle_at(&self, x: i32, y: i32) -> bool;

    /// Free or obstacle, i.e. no longer unknown.
    fn known_at(&self, x: i32, y: i32) -> bool {
        self.free_space_at(x, y) || self.obstacle_at(x, y)
    }

    /// Cell on the boundary between known free space and unknown space.
    fn frontier_cell_at(&self, x: i32, y: i32) -> bool;

    /// Frontier cell that also touches a confirmed obstacle (or the map edge).
    fn frontier_border_cell_at(&self, x: i32, y: i32) -> bool;

    fn obstacle_within_distance(&self, x: i32, y: i32, distance: i32) -> bool;

    fn is_final_topological_map_cell(&self, x: i32, y: i32) -> bool;
    fn unset_final_topological_map_cell(&mut self, x: i32, y: i32);

    fn set_free_space(&mut self, x: i32, y: i32);
    fn set_obstacle(&mut self, x: i32, y: i32);

    /// Share of cells that are known, in percent.
    fn percentage_known(&self) -> f64;

    /// Immutable copy for handing to teammates.
    fn snapshot(&self) -> Arc<dyn OccupancyGrid>;

    fn free_space_at_point(&self, p: GridPoint) -> bool {
        self.free_space_at(p.x, p.y)
    }

    fn frontier_cell_at_point(&self, p: GridPoint) -> bool {
        self.frontier_cell_at(p.x, p.y)
    }

    /// Copy every cell `other` knows and this grid does not. Returns the number of cells learned.
    fn merge_from(&mut self, other: &dyn OccupancyGrid) -> usize {
        let mut learned = 0;
        for y in 0..self.height().min(other.height()) {
            for x in 0..self.width().min(other.width()) {
                if self.known_at(x, y) {
                    continue;
                }
                if other.obstacle_at(x, y) {
                    self.set_obstacle(x, y);
                    learned += 1;
                } else if other.free_space_at(x, y) {
                    self.set_free_space(x, y);
                    learned += 1;
                }
            }
        }
        learned
    }
}
