use crate::common::GridPoint;
use serde::{Deserialize, Serialize};

/// What the last rendezvous calculation looked at, for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RendezvousDisplayData {
    pub skeleton: Vec<GridPoint>,
    pub rv_points: Vec<GridPoint>,
    pub frontier_centre: Option<GridPoint>,
}
