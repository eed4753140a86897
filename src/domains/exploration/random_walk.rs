use crate::common::{line_cells, GridPoint};
use crate::domains::grid::OccupancyGrid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bounded random steps through known free space.
pub struct RandomWalk {
    rng: StdRng,
    attempts: usize,
}

impl RandomWalk {
    pub fn new(seed: u64, attempts: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            attempts: attempts.max(1),
        }
    }

    /// A cell at most `bound` away in each axis reachable over known free cells.
    /// Stays put when no such cell turns up.
    pub fn random_step(&mut self, grid: &dyn OccupancyGrid, from: GridPoint, bound: i32) -> GridPoint {
        let bound = bound.max(1);
        for _ in 0..self.attempts {
            let dx = self.rng.gen_range(-bound..=bound);
            let dy = self.rng.gen_range(-bound..=bound);
            if dx == 0 && dy == 0 {
                continue;
            }
            let target = from.offset(dx, dy);
            let clear = line_cells(from, target)
                .iter()
                .skip(1)
                .all(|c| grid.free_space_at(c.x, c.y));
            if clear {
                return target;
            }
        }
        from
    }
}
