//! Candidate rendezvous points sampled from the skeleton and ranked for one frontier.

use super::settings::RendezvousSettings;
use super::types::NearRVPoint;
use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;
use crate::domains::topology::SkeletonGrid;
use std::collections::BinaryHeap;

/// Junction cells are only searched this far inside the grid edge.
const JUNCTION_MARGIN: i32 = 2;

/// Sample candidate meeting points from `skeleton`.
///
/// Junctions come first, then endpoints and gap fillers spaced at least
/// `gap_spacing` from every earlier candidate. A final backwards pass drops
/// candidates near walls and candidates too close to another survivor.
pub fn find_rendezvous_points(
    skeleton: &SkeletonGrid,
    grid: &dyn OccupancyGrid,
    settings: &RendezvousSettings,
) -> Vec<GridPoint> {
    let mut candidates = Vec::new();

    for x in JUNCTION_MARGIN..skeleton.width() - JUNCTION_MARGIN {
        for y in JUNCTION_MARGIN..skeleton.height() - JUNCTION_MARGIN {
            if skeleton.is_set(x, y)
                && skeleton.num_nonzero_neighbors(x, y) >= 3
                && skeleton.neighbor_traversal(x, y) >= 3
            {
                candidates.push(GridPoint::new(x, y));
            }
        }
    }

    for p in skeleton.points() {
        if skeleton.num_nonzero_neighbors(p.x, p.y) < 2 {
            candidates.push(p);
            continue;
        }
        if candidates.iter().all(|q| p.distance(q) >= settings.gap_spacing) {
            candidates.push(p);
        }
    }

    let mut i = candidates.len();
    while i > 0 {
        i -= 1;
        let p = candidates[i];
        if grid.obstacle_within_distance(p.x, p.y, settings.wall_distance) {
            candidates.remove(i);
            continue;
        }
        let crowded = candidates
            .iter()
            .enumerate()
            .any(|(j, q)| j != i && p.distance(q) < settings.min_separation);
        if crowded {
            candidates.remove(i);
        }
    }

    candidates
}

/// Straight-line utility; a candidate on the target itself is maximal.
pub fn utility_by_distance(distance: f64) -> f64 {
    if distance == 0.0 {
        return i32::MAX as f64;
    }
    10000.0 / distance
}

/// Distance utility weighted by squared skeleton degree, so junctions beat corridor cells.
pub fn utility_by_degree(distance: f64, degree: usize) -> f64 {
    (degree as f64).powi(2) * utility_by_distance(distance)
}

/// Candidates within `max_distance_to_frontier_centre` of `target`, best first.
pub fn rank_by_frontier_proximity(
    candidates: &[GridPoint],
    target: GridPoint,
    settings: &RendezvousSettings,
) -> BinaryHeap<NearRVPoint> {
    candidates
        .iter()
        .filter(|p| p.distance(&target) <= settings.max_distance_to_frontier_centre)
        .map(|p| NearRVPoint::new(*p, utility_by_distance(p.distance(&target))))
        .collect()
}

/// Re-score the best `limit` candidates by exact path length and skeleton degree.
///
/// `path_length` returns `None` when no path exists; such candidates are skipped.
pub fn rank_by_utility<F>(
    mut near: BinaryHeap<NearRVPoint>,
    skeleton: &SkeletonGrid,
    target: GridPoint,
    limit: usize,
    mut path_length: F,
) -> BinaryHeap<NearRVPoint>
where
    F: FnMut(GridPoint, GridPoint) -> Option<f64>,
{
    let mut ranked = BinaryHeap::new();
    for _ in 0..limit {
        let Some(candidate) = near.pop() else { break };
        if let Some(cost) = path_length(candidate.point, target) {
            let degree = skeleton.neighbor_traversal(candidate.point.x, candidate.point.y);
            ranked.push(NearRVPoint::new(candidate.point, utility_by_degree(cost, degree)));
        }
    }
    ranked
}
