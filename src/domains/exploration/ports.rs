use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;

/// Geometric link model between two agents.
pub trait CommunicationModel: Send + Sync {
    /// `grid` is the ground truth the signal travels through.
    fn can_communicate(
        &self,
        grid: &dyn OccupancyGrid,
        a: GridPoint,
        a_range: f64,
        b: GridPoint,
        b_range: f64,
    ) -> bool;
}
