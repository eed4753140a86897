use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationSettings {
    pub time_between_plans: u32,
    /// Ticks at the start of a run during which explorers wander and relays hold still.
    pub startup_ticks: u32,
    pub comm_failure_threshold: u32,
    /// Frontier recomputations without new knowledge before heading home.
    pub watchdog_limit: u32,
    pub completion_percentage: f64,
    pub random_step_bound: i32,
    pub env_error_step_bound: i32,
    pub random_step_attempts: usize,
    pub min_frontier_size: usize,
}

impl Default for ExplorationSettings {
    fn default() -> Self {
        Self {
            time_between_plans: 10,
            startup_ticks: 3,
            comm_failure_threshold: 5,
            watchdog_limit: 5,
            completion_percentage: 100.0,
            random_step_bound: 2,
            env_error_step_bound: 1,
            random_step_attempts: 20,
            min_frontier_size: 2,
        }
    }
}
