use crate::common::GridPoint;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Where and when an explorer (child side) and its relay (parent side) meet.
///
/// Recalculation produces a new value; timing is attached with `with_timing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rendezvous {
    child_location: GridPoint,
    parent_location: GridPoint,
    time_meeting: u32,
    time_wait: u32,
}

impl Rendezvous {
    /// Both parties meet at the same cell; timing not yet known.
    pub fn at(location: GridPoint) -> Self {
        Self {
            child_location: location,
            parent_location: location,
            time_meeting: 0,
            time_wait: 0,
        }
    }

    pub fn with_locations(child_location: GridPoint, parent_location: GridPoint) -> Self {
        Self {
            child_location,
            parent_location,
            time_meeting: 0,
            time_wait: 0,
        }
    }

    pub fn with_timing(&self, time_meeting: u32, time_wait: u32) -> Self {
        Self {
            time_meeting,
            time_wait,
            ..self.clone()
        }
    }

    pub fn child_location(&self) -> GridPoint {
        self.child_location
    }

    pub fn parent_location(&self) -> GridPoint {
        self.parent_location
    }

    pub fn time_meeting(&self) -> u32 {
        self.time_meeting
    }

    pub fn time_wait(&self) -> u32 {
        self.time_wait
    }

    /// Tick after which waiting longer is pointless.
    pub fn deadline(&self) -> u32 {
        self.time_meeting.saturating_add(self.time_wait)
    }
}

/// Rendezvous bookkeeping owned by one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RendezvousAgentData {
    pub parent_rendezvous: Option<Rendezvous>,
    pub child_rendezvous: Option<Rendezvous>,
    pub parent_backup_rendezvous: Option<Rendezvous>,
    pub time_since_last_rv_calc: u32,
    pub time_until_rendezvous: u32,
}

impl RendezvousAgentData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.time_since_last_rv_calc = self.time_since_last_rv_calc.saturating_add(1);
    }
}

/// Candidate meeting point, ordered by utility so a `BinaryHeap` yields the best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearRVPoint {
    pub point: GridPoint,
    pub utility: OrderedFloat<f64>,
}

impl NearRVPoint {
    pub fn new(point: GridPoint, utility: f64) -> Self {
        Self {
            point,
            utility: OrderedFloat(utility),
        }
    }
}

impl Ord for NearRVPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utility
            .cmp(&other.utility)
            // equal utility: prefer the lower coordinate so results do not depend on insertion order
            .then_with(|| other.point.cmp(&self.point))
    }
}

impl PartialOrd for NearRVPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
