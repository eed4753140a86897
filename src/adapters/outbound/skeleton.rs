//! Zhang-Suen thinning and key-area partitioning of believed free space.

use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;
use crate::domains::topology::{AreaGrid, NodeId, SkeletonGrid, SkeletonService, NO_AREA, UNEXPLORED_NODE_ID};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ThinningSkeletonizer {
    /// Minimum distance between two key points.
    key_point_spacing: f64,
}

impl Default for ThinningSkeletonizer {
    fn default() -> Self {
        Self::new(8.0)
    }
}

impl ThinningSkeletonizer {
    pub fn new(key_point_spacing: f64) -> Self {
        Self {
            key_point_spacing: key_point_spacing.max(1.0),
        }
    }

    fn far_from_all(&self, p: GridPoint, chosen: &[GridPoint]) -> bool {
        chosen.iter().all(|c| c.distance(&p) >= self.key_point_spacing)
    }
}

/// P2..P9 of the classic formulation: N, NE, E, SE, S, SW, W, NW.
fn ring(skeleton: &SkeletonGrid, x: i32, y: i32) -> [bool; 8] {
    const OFFSETS: [(i32, i32); 8] = [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];
    OFFSETS.map(|(dx, dy)| skeleton.is_set(x + dx, y + dy))
}

fn thinning_pass(skeleton: &mut SkeletonGrid, first: bool) -> bool {
    let mut removals = Vec::new();
    for y in 0..skeleton.height() {
        for x in 0..skeleton.width() {
            if !skeleton.is_set(x, y) {
                continue;
            }
            let p = ring(skeleton, x, y);
            let b = p.iter().filter(|v| **v).count();
            if !(2..=6).contains(&b) {
                continue;
            }
            let a = (0..8).filter(|&i| !p[i] && p[(i + 1) % 8]).count();
            if a != 1 {
                continue;
            }
            let (n, e, s, w) = (p[0], p[2], p[4], p[6]);
            let keep = if first {
                (n && e && s) || (e && s && w)
            } else {
                (n && e && w) || (n && s && w)
            };
            if !keep {
                removals.push((x, y));
            }
        }
    }
    for (x, y) in &removals {
        skeleton.set(*x, *y, false);
    }
    !removals.is_empty()
}

impl SkeletonService for ThinningSkeletonizer {
    fn skeletonize(&self, grid: &dyn OccupancyGrid) -> SkeletonGrid {
        let mut skeleton = SkeletonGrid::new(grid.width(), grid.height());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.free_space_at(x, y) {
                    skeleton.set(x, y, true);
                }
            }
        }
        loop {
            let a = thinning_pass(&mut skeleton, true);
            let b = thinning_pass(&mut skeleton, false);
            if !a && !b {
                break;
            }
        }
        skeleton
    }

    /// Junctions first, then endpoints, then evenly spaced skeleton cells, all
    /// kept apart by the configured spacing. Falls back to the first free cell
    /// when the skeleton is empty but free space exists.
    fn find_key_points(&self, skeleton: &SkeletonGrid, grid: &dyn OccupancyGrid) -> Vec<GridPoint> {
        let points = skeleton.points();
        let mut chosen: Vec<GridPoint> = Vec::new();

        let junctions = points.iter().filter(|p| skeleton.neighbor_traversal(p.x, p.y) >= 3);
        let endpoints = points.iter().filter(|p| skeleton.num_nonzero_neighbors(p.x, p.y) <= 1);
        for p in junctions.chain(endpoints).chain(points.iter()) {
            if grid.free_space_at(p.x, p.y) && self.far_from_all(*p, &chosen) {
                chosen.push(*p);
            }
        }

        if chosen.is_empty() {
            'scan: for y in 0..grid.height() {
                for x in 0..grid.width() {
                    if grid.free_space_at(x, y) {
                        chosen.push(GridPoint::new(x, y));
                        break 'scan;
                    }
                }
            }
        }
        chosen
    }

    /// Multi-source flood over 8-connected free space. Free cells no flood
    /// reaches join the area of the nearest key point.
    fn fill_key_areas(&self, grid: &dyn OccupancyGrid, key_points: &[GridPoint]) -> AreaGrid {
        let mut areas = AreaGrid::new(grid.width(), grid.height());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if !grid.known_at(x, y) {
                    areas.set(x, y, UNEXPLORED_NODE_ID);
                }
            }
        }

        let mut queue = VecDeque::new();
        for (i, p) in key_points.iter().enumerate() {
            let id = (i + 1) as NodeId;
            if grid.free_space_at(p.x, p.y) && areas.get(p.x, p.y) == NO_AREA {
                areas.set(p.x, p.y, id);
                queue.push_back(*p);
            }
        }
        while let Some(p) = queue.pop_front() {
            let id = areas.get(p.x, p.y);
            for n in p.neighbours8() {
                if grid.free_space_at(n.x, n.y) && areas.get(n.x, n.y) == NO_AREA {
                    areas.set(n.x, n.y, id);
                    queue.push_back(n);
                }
            }
        }

        if key_points.is_empty() {
            return areas;
        }
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.free_space_at(x, y) && areas.get(x, y) == NO_AREA {
                    let here = GridPoint::new(x, y);
                    let nearest = key_points
                        .iter()
                        .enumerate()
                        .min_by(|(_, a), (_, b)| here.distance(a).total_cmp(&here.distance(b)))
                        .map(|(i, _)| (i + 1) as NodeId)
                        .unwrap_or(UNEXPLORED_NODE_ID);
                    areas.set(x, y, nearest);
                }
            }
        }
        areas
    }

    fn find_key_area_borders(&self, areas: &AreaGrid) -> Vec<GridPoint> {
        let mut borders = Vec::new();
        for y in 0..areas.height() {
            for x in 0..areas.width() {
                let id = areas.get(x, y);
                if id == NO_AREA {
                    continue;
                }
                let differs = GridPoint::new(x, y).neighbours8().iter().any(|n| {
                    let other = areas.get(n.x, n.y);
                    other != NO_AREA && other != id
                });
                if differs {
                    borders.push(GridPoint::new(x, y));
                }
            }
        }
        borders
    }
}
