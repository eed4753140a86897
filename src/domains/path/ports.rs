use super::path::Path;
use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;

/// Port for the grid path search (A*, jump point search, ...).
///
/// Implementations must return a path whose `start()`/`goal()` equal the
/// requested cells, found or not; cached topology edges depend on it.
pub trait PathPlanner: Send + Sync {
    fn calculate_path(&self, grid: &dyn OccupancyGrid, start: GridPoint, goal: GridPoint) -> Path;
}
