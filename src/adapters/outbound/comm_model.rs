use crate::common::{line_cells, GridPoint};
use crate::domains::exploration::CommunicationModel;
use crate::domains::grid::OccupancyGrid;

/// Two agents can talk when they are within the smaller of their ranges and,
/// optionally, no known obstacle sits on the straight line between them.
#[derive(Debug, Clone, Default)]
pub struct CircleCommModel {
    line_of_sight: bool,
}

impl CircleCommModel {
    pub fn new(line_of_sight: bool) -> Self {
        Self { line_of_sight }
    }
}

impl CommunicationModel for CircleCommModel {
    fn can_communicate(&self, grid: &dyn OccupancyGrid, a: GridPoint, a_range: f64, b: GridPoint, b_range: f64) -> bool {
        if a.distance(&b) > a_range.min(b_range) {
            return false;
        }
        !self.line_of_sight || line_cells(a, b).iter().all(|c| !grid.obstacle_at(c.x, c.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::CellGrid;

    #[test]
    fn range_and_walls() {
        let grid = CellGrid::from_ascii(".....\n..#..\n.....").unwrap();
        let open = CircleCommModel::new(false);
        let walled = CircleCommModel::new(true);
        let a = GridPoint::new(0, 1);
        let b = GridPoint::new(4, 1);
        assert!(open.can_communicate(&grid, a, 10.0, b, 4.0));
        assert!(!open.can_communicate(&grid, a, 10.0, b, 3.0));
        assert!(!walled.can_communicate(&grid, a, 10.0, b, 10.0));
        assert!(walled.can_communicate(&grid, GridPoint::new(0, 0), 10.0, GridPoint::new(4, 0), 10.0));
    }
}
