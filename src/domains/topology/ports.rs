use super::node::{NodeId, NO_AREA};
use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;
use serde::{Deserialize, Serialize};

/// One-cell-wide reduction of free space. Non-zero cells belong to the skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonGrid {
    width: i32,
    height: i32,
    cells: Vec<u8>,
}

impl SkeletonGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![0; (width * height) as usize],
        }
    }

    pub fn from_points(width: i32, height: i32, points: &[GridPoint]) -> Self {
        let mut grid = Self::new(width, height);
        for p in points {
            grid.set(p.x, p.y, true);
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i] != 0).unwrap_or(false)
    }

    pub fn set(&mut self, x: i32, y: i32, on: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = on as u8;
        }
    }

    /// Skeleton cells in row-major order.
    pub fn points(&self) -> Vec<GridPoint> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_set(x, y) {
                    points.push(GridPoint::new(x, y));
                }
            }
        }
        points
    }

    pub fn num_nonzero_neighbors(&self, x: i32, y: i32) -> usize {
        GridPoint::new(x, y)
            .neighbours8()
            .iter()
            .filter(|n| self.is_set(n.x, n.y))
            .count()
    }

    /// Number of off-to-on transitions walking once around the 8-neighbourhood.
    /// 1 for an endpoint, 2 for a corridor, 3 or more for a junction.
    pub fn neighbor_traversal(&self, x: i32, y: i32) -> usize {
        let ring = GridPoint::new(x, y).neighbours8();
        (0..8)
            .filter(|&i| {
                let a = ring[i];
                let b = ring[(i + 1) % 8];
                !self.is_set(a.x, a.y) && self.is_set(b.x, b.y)
            })
            .count()
    }
}

/// Per-cell key-area id. `NO_AREA` for obstacles, `UNEXPLORED_NODE_ID` for unknown space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaGrid {
    width: i32,
    height: i32,
    cells: Vec<NodeId>,
}

impl AreaGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![NO_AREA; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Area id at the cell, `NO_AREA` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> NodeId {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(NO_AREA)
    }

    pub fn set(&mut self, x: i32, y: i32, id: NodeId) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = id;
        }
    }
}

/// Port for the skeleton and key-area primitives the region graph is built on.
///
/// Key point `i` of `find_key_points` owns area id `i + 1` in `fill_key_areas`.
pub trait SkeletonService: Send + Sync {
    fn skeletonize(&self, grid: &dyn OccupancyGrid) -> SkeletonGrid;
    fn find_key_points(&self, skeleton: &SkeletonGrid, grid: &dyn OccupancyGrid) -> Vec<GridPoint>;
    fn fill_key_areas(&self, grid: &dyn OccupancyGrid, key_points: &[GridPoint]) -> AreaGrid;
    /// Cells with an 8-neighbour in a different area.
    fn find_key_area_borders(&self, areas: &AreaGrid) -> Vec<GridPoint>;
}
