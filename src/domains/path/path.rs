use crate::common::GridPoint;
use serde::{Deserialize, Serialize};

/// Cache key: ordered (start, goal) pair. The reverse direction is a different key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathKey {
    pub start: GridPoint,
    pub goal: GridPoint,
}

impl PathKey {
    pub fn new(start: GridPoint, goal: GridPoint) -> Self {
        Self { start, goal }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.goal, self.start)
    }
}

/// Route between two grid cells. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    start: GridPoint,
    goal: GridPoint,
    points: Vec<GridPoint>,
    length: f64,
    found: bool,
}

impl Path {
    /// Build a found path from its cells. The length is the sum of step lengths.
    pub fn new(start: GridPoint, goal: GridPoint, points: Vec<GridPoint>) -> Self {
        let length = points.windows(2).map(|w| w[0].distance(&w[1])).sum();
        let found = !points.is_empty();
        Self {
            start,
            goal,
            points,
            length,
            found,
        }
    }

    pub fn not_found(start: GridPoint, goal: GridPoint) -> Self {
        Self {
            start,
            goal,
            points: Vec::new(),
            length: 0.0,
            found: false,
        }
    }

    pub fn start(&self) -> GridPoint {
        self.start
    }

    pub fn goal(&self) -> GridPoint {
        self.goal
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn key(&self) -> PathKey {
        PathKey::new(self.start, self.goal)
    }

    pub fn reverse(&self) -> Path {
        let mut points = self.points.clone();
        points.reverse();
        Self {
            start: self.goal,
            goal: self.start,
            points,
            length: self.length,
            found: self.found,
        }
    }

    /// True when the path was computed for exactly these anchors.
    pub fn matches_anchors(&self, start: GridPoint, goal: GridPoint) -> bool {
        self.start == start && self.goal == goal
    }
}
