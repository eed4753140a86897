use serde::{Deserialize, Serialize};

/// Tunables for single-point rendezvous selection and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendezvousSettings {
    /// Recalculate the meeting point whenever the explorer re-enters parent range.
    pub use_improved_rendezvous: bool,
    /// Subtract twice the smaller comm range from the parent's round trip.
    pub use_simple_circle_comm_model_for_base_range: bool,
    pub give_explorer_min_time_near_frontier: bool,
    pub attempt_exploration_by_relay: bool,
    pub wall_distance: i32,
    pub max_distance_to_frontier_centre: f64,
    pub points_near_frontier_to_consider: usize,
    pub gap_spacing: f64,
    pub min_separation: f64,
    pub wait_at_rv_before_replan: u32,
    pub max_time: u32,
    /// Cells per tick assumed when predicting meeting times.
    pub default_speed: u32,
    pub frontier_min_explore_time: u32,
    pub near_goal_threshold: f64,
    pub relay_exploration_slack: u32,
}

impl Default for RendezvousSettings {
    fn default() -> Self {
        Self {
            use_improved_rendezvous: false,
            use_simple_circle_comm_model_for_base_range: true,
            give_explorer_min_time_near_frontier: false,
            attempt_exploration_by_relay: false,
            wall_distance: 3,
            max_distance_to_frontier_centre: 600.0,
            points_near_frontier_to_consider: 4,
            gap_spacing: 50.0,
            min_separation: 20.0,
            wait_at_rv_before_replan: 30,
            max_time: 1_000_000,
            default_speed: 1,
            frontier_min_explore_time: 20,
            near_goal_threshold: 25.0,
            relay_exploration_slack: 15,
        }
    }
}
