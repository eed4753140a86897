//! Moore-neighbour contour tracing over frontier cells.
//!
//! The tracer scans the grid row by row and, for each frontier cell not yet
//! claimed by an accepted contour, walks the boundary of its 8-connected
//! component. Diagonal steps are only allowed when both orthogonal cells beside
//! the step are free space, so a contour never squeezes through a blocked corner.

use crate::common::GridPoint;
use crate::domains::grid::OccupancyGrid;
use crate::domains::logger::DynLogger;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Walk directions, clockwise starting north-east. The order drives the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    North,
}

const DIRECTIONS: [Direction; 8] = [
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
    Direction::North,
];

/// Offset (in eighths of a turn) applied to the incoming direction to get the
/// next search start: look back, then sweep forward along the outer boundary.
const BACKTRACK_ROTATION: usize = 6;

impl Direction {
    fn index(self) -> usize {
        self as usize
    }

    pub fn rotate(self, eighths: usize) -> Direction {
        DIRECTIONS[(self.index() + eighths) % 8]
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
            Direction::North => (0, -1),
        }
    }

    pub fn step(self, from: GridPoint) -> GridPoint {
        let (dx, dy) = self.delta();
        from.offset(dx, dy)
    }

    /// Direction of travel from `from` to the adjacent cell `to`.
    pub fn between(from: GridPoint, to: GridPoint) -> Option<Direction> {
        let delta = (to.x - from.x, to.y - from.y);
        DIRECTIONS.iter().copied().find(|d| d.delta() == delta)
    }
}

/// Ordered 8-connected chain of cells produced by one trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<GridPoint>,
}

impl Contour {
    pub fn new(points: Vec<GridPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<GridPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last cell is an 8-neighbour of the first one.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() >= 2 => first.is_adjacent8(last),
            _ => false,
        }
    }
}

pub struct ContourTracer {
    logger: DynLogger,
}

impl ContourTracer {
    pub fn new(logger: DynLogger) -> Self {
        Self { logger }
    }

    /// Trace every interesting frontier contour of `grid`.
    ///
    /// A contour is kept when none of its cells already belongs to an accepted
    /// contour and at least one of them is a frontier-border cell. Accepted
    /// contours are stamped into the label grid; rejected ones are not, so
    /// their cells can still seed later traces.
    pub fn find_all_contours(&self, grid: &dyn OccupancyGrid) -> Vec<Contour> {
        let width = grid.width().max(0);
        let height = grid.height().max(0);
        let mut labels = vec![false; (width * height) as usize];
        let label_index = |p: GridPoint| (p.y * width + p.x) as usize;

        let mut contours = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if !grid.frontier_cell_at(x, y) || labels[label_index(GridPoint::new(x, y))] {
                    continue;
                }

                let contour = self.trace_contour(grid, GridPoint::new(x, y), Direction::NorthEast);
                if contour.len() <= 1 {
                    continue;
                }

                let mut interesting = false;
                for p in contour.points() {
                    if !grid.location_exists(p.x, p.y) {
                        continue;
                    }
                    if labels[label_index(*p)] {
                        interesting = false;
                        break;
                    }
                    if grid.frontier_border_cell_at(p.x, p.y) {
                        interesting = true;
                    }
                }

                if interesting {
                    for p in contour.points() {
                        labels[label_index(*p)] = true;
                    }
                    contours.push(contour);
                }
            }
        }
        contours
    }

    /// Follow the boundary of the component containing `start`.
    ///
    /// Stops when the walk is about to repeat its first move, or when it reaches
    /// a cell it already visited.
    pub fn trace_contour(&self, grid: &dyn OccupancyGrid, start: GridPoint, start_dir: Direction) -> Contour {
        if !grid.frontier_cell_at(start.x, start.y) {
            self.logger.warn(&format!(
                "contour trace started on non-frontier cell {}",
                start
            ));
        }

        let first = start;
        let mut points = vec![first];
        let mut visited: HashSet<GridPoint> = HashSet::from([first]);

        let Some(second) = next_pixel_on_contour(grid, first, start_dir) else {
            return Contour::new(points);
        };

        let mut current = second;
        let mut next = next_pixel_on_contour(grid, current, search_direction(first, second));

        loop {
            let Some(candidate) = next else {
                if visited.insert(current) {
                    points.push(current);
                }
                break;
            };
            if current == first && candidate == second {
                break;
            }
            if !visited.insert(current) {
                break;
            }
            points.push(current);

            let search = search_direction(current, candidate);
            current = candidate;
            next = next_pixel_on_contour(grid, current, search);
        }

        Contour::new(points)
    }
}

fn search_direction(from: GridPoint, to: GridPoint) -> Direction {
    Direction::between(from, to)
        .unwrap_or(Direction::NorthEast)
        .rotate(BACKTRACK_ROTATION)
}

fn next_pixel_on_contour(grid: &dyn OccupancyGrid, pt: GridPoint, dir: Direction) -> Option<GridPoint> {
    for i in 0..8 {
        let candidate_dir = dir.rotate(i);
        let candidate = candidate_dir.step(pt);

        if !grid.location_exists(candidate.x, candidate.y)
            || !grid.frontier_cell_at(candidate.x, candidate.y)
        {
            continue;
        }

        let (dx, dy) = candidate_dir.delta();
        let diagonal = dx != 0 && dy != 0;
        if diagonal && !(grid.free_space_at(pt.x + dx, pt.y) && grid.free_space_at(pt.x, pt.y + dy)) {
            // corner is blocked: the walk has to go the manhattan way
            continue;
        }
        return Some(candidate);
    }
    None
}
