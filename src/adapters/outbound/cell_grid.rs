use crate::common::{DomainError, DomainResult, GridPoint};
use crate::domains::grid::OccupancyGrid;
use std::sync::Arc;

const FREE: u8 = 0b001;
const OBSTACLE: u8 = 0b010;
const FINAL_TOPOLOGY: u8 = 0b100;

/// Dense occupancy grid with one flag byte per cell. Cells start unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: i32,
    height: i32,
    cells: Vec<u8>,
}

impl CellGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![0; (width * height) as usize],
        }
    }

    /// Every cell known and free.
    pub fn open_field(width: i32, height: i32) -> Self {
        let mut grid = Self::new(width, height);
        grid.cells.iter_mut().for_each(|c| *c = FREE);
        grid
    }

    /// Parse a map drawn with `.` for free space, `#` for obstacles and `?` for unknown.
    /// Rows shorter than the widest one are padded with unknown cells.
    pub fn from_ascii(text: &str) -> DomainResult<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end())
            .filter(|l| !l.is_empty())
            .collect();
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let (x, y) = (x as i32, y as i32);
                match ch {
                    '.' => grid.set_free_space(x, y),
                    '#' => grid.set_obstacle(x, y),
                    '?' | ' ' => {}
                    other => {
                        return Err(DomainError::InvalidCommand {
                            reason: format!("unexpected map character '{}' at ({}, {})", other, x, y),
                        })
                    }
                }
            }
        }
        Ok(grid)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.location_exists(x, y).then(|| (y * self.width + x) as usize)
    }

    fn flags(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(0)
    }

    pub fn count_known(&self) -> usize {
        self.cells.iter().filter(|c| **c & (FREE | OBSTACLE) != 0).count()
    }

    pub fn count_free(&self) -> usize {
        self.cells.iter().filter(|c| **c & FREE != 0).count()
    }

    pub fn free_cells(&self) -> Vec<GridPoint> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.free_space_at(x, y) {
                    cells.push(GridPoint::new(x, y));
                }
            }
        }
        cells
    }

    fn any_neighbour(&self, x: i32, y: i32, pred: impl Fn(Option<u8>) -> bool) -> bool {
        GridPoint::new(x, y)
            .neighbours8()
            .iter()
            .any(|n| pred(self.index(n.x, n.y).map(|i| self.cells[i])))
    }
}

impl OccupancyGrid for CellGrid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn free_space_at(&self, x: i32, y: i32) -> bool {
        self.flags(x, y) & FREE != 0
    }

    fn obstacle_at(&self, x: i32, y: i32) -> bool {
        self.flags(x, y) & OBSTACLE != 0
    }

    fn frontier_cell_at(&self, x: i32, y: i32) -> bool {
        self.free_space_at(x, y)
            && self.any_neighbour(x, y, |c| matches!(c, Some(flags) if flags & (FREE | OBSTACLE) == 0))
    }

    fn frontier_border_cell_at(&self, x: i32, y: i32) -> bool {
        self.frontier_cell_at(x, y)
            && self.any_neighbour(x, y, |c| match c {
                None => true,
                Some(flags) => flags & OBSTACLE != 0,
            })
    }

    fn obstacle_within_distance(&self, x: i32, y: i32, distance: i32) -> bool {
        for dy in -distance..=distance {
            for dx in -distance..=distance {
                if self.obstacle_at(x + dx, y + dy) {
                    return true;
                }
            }
        }
        false
    }

    fn is_final_topological_map_cell(&self, x: i32, y: i32) -> bool {
        self.flags(x, y) & FINAL_TOPOLOGY != 0
    }

    fn unset_final_topological_map_cell(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] &= !FINAL_TOPOLOGY;
        }
    }

    /// Newly freed cells count as settled topology until a region build says otherwise.
    fn set_free_space(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = FREE | FINAL_TOPOLOGY;
        }
    }

    fn set_obstacle(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = OBSTACLE;
        }
    }

    fn percentage_known(&self) -> f64 {
        if self.cells.is_empty() {
            return 100.0;
        }
        self.count_known() as f64 * 100.0 / self.cells.len() as f64
    }

    fn snapshot(&self) -> Arc<dyn OccupancyGrid> {
        Arc::new(self.clone())
    }
}
