use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer grid coordinate. `y` grows downwards (row index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &GridPoint) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Chessboard distance; 1 for any of the eight neighbours.
    pub fn chebyshev(&self, other: &GridPoint) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn is_adjacent8(&self, other: &GridPoint) -> bool {
        self != other && self.chebyshev(other) == 1
    }

    /// The eight surrounding cells, clockwise from north-east.
    pub fn neighbours8(&self) -> [GridPoint; 8] {
        [
            self.offset(1, -1),
            self.offset(1, 0),
            self.offset(1, 1),
            self.offset(0, 1),
            self.offset(-1, 1),
            self.offset(-1, 0),
            self.offset(-1, -1),
            self.offset(0, -1),
        ]
    }

    pub fn neighbours4(&self) -> [GridPoint; 4] {
        [
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
            self.offset(0, -1),
        ]
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cells crossed by the straight segment `from -> to` (Bresenham), both ends included.
pub fn line_cells(from: GridPoint, to: GridPoint) -> Vec<GridPoint> {
    let mut cells = Vec::new();
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    loop {
        cells.push(GridPoint::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    cells
}
