use super::frontier::Frontier;
use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;
use crate::domains::path::{Path, PathPlanner};

/// Everything a chooser needs to score frontiers for one agent.
pub struct FrontierRequest<'a> {
    pub location: GridPoint,
    pub frontiers: &'a [Frontier],
    /// Goals teammates are already heading for.
    pub claimed_goals: &'a [GridPoint],
    pub grid: &'a dyn OccupancyGrid,
    pub planner: &'a dyn PathPlanner,
}

#[derive(Debug, Clone)]
pub struct FrontierChoice {
    pub frontier: Frontier,
    pub path: Path,
}

/// Port for the utility-maximizing frontier selection.
///
/// The chooser plans the path to the frontier it picks, so callers never plan twice.
pub trait FrontierChooser: Send + Sync {
    fn choose_frontier(&self, request: &FrontierRequest<'_>) -> Option<FrontierChoice>;
}
