use super::contour::{Contour, ContourTracer};
use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;
use serde::{Deserialize, Serialize};

/// An accepted contour, ready to be scored and chosen as an exploration goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontier {
    outline: Vec<GridPoint>,
    centroid: GridPoint,
    utility: f64,
}

impl Frontier {
    pub fn from_contour(contour: Contour) -> Self {
        let outline = contour.into_points();
        let centroid = centroid_of(&outline);
        Self {
            outline,
            centroid,
            utility: 0.0,
        }
    }

    pub fn with_utility(&self, utility: f64) -> Self {
        Self {
            utility,
            ..self.clone()
        }
    }

    pub fn outline(&self) -> &[GridPoint] {
        &self.outline
    }

    pub fn centroid(&self) -> GridPoint {
        self.centroid
    }

    pub fn utility(&self) -> f64 {
        self.utility
    }

    pub fn size(&self) -> usize {
        self.outline.len()
    }

    /// Outline cell nearest to `from`; the centroid itself may lie in unknown space.
    pub fn closest_point(&self, from: GridPoint) -> GridPoint {
        self.outline
            .iter()
            .copied()
            .min_by(|a, b| a.distance(&from).total_cmp(&b.distance(&from)))
            .unwrap_or(self.centroid)
    }
}

fn centroid_of(points: &[GridPoint]) -> GridPoint {
    if points.is_empty() {
        return GridPoint::new(0, 0);
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0i64, 0i64), |(sx, sy), p| (sx + p.x as i64, sy + p.y as i64));
    GridPoint::new((sx as f64 / n).round() as i32, (sy as f64 / n).round() as i32)
}

/// Trace the grid and turn every accepted contour of at least `min_size` cells into a frontier.
pub fn calculate_frontiers(tracer: &ContourTracer, grid: &dyn OccupancyGrid, min_size: usize) -> Vec<Frontier> {
    tracer
        .find_all_contours(grid)
        .into_iter()
        .filter(|c| c.len() >= min_size)
        .map(Frontier::from_contour)
        .collect()
}
