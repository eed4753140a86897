use super::path::{Path, PathKey};
use super::ports::PathPlanner;
use crate::common::{DomainError, DomainResult, GridPoint};
use crate::domains::grid::OccupancyGrid;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared store of anchor-to-anchor paths.
///
/// Insert-if-absent: a path already stored under a key is never replaced, so
/// concurrent callers computing the same pair end up sharing one `Arc<Path>`.
/// Entries are never evicted during a run; regenerated topology uses new
/// anchor pairs, which simply miss the cache.
#[derive(Debug, Default)]
pub struct PathCache {
    paths: RwLock<HashMap<PathKey, Arc<Path>>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self {
            paths: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PathKey, Arc<Path>>> {
        self.paths.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PathKey, Arc<Path>>> {
        self.paths.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, start: GridPoint, goal: GridPoint) -> Option<Arc<Path>> {
        self.read().get(&PathKey::new(start, goal)).cloned()
    }

    pub fn contains(&self, start: GridPoint, goal: GridPoint) -> bool {
        self.read().contains_key(&PathKey::new(start, goal))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Store `path` and its reverse. Returns whatever ends up stored under the forward key.
    pub fn insert(&self, path: Path) -> Arc<Path> {
        let reverse = path.reverse();
        let mut paths = self.write();
        let forward = paths
            .entry(path.key())
            .or_insert_with(|| Arc::new(path))
            .clone();
        paths
            .entry(reverse.key())
            .or_insert_with(|| Arc::new(reverse));
        forward
    }

    /// Fetch the path between two anchors, planning and caching it on a miss.
    ///
    /// Both the cached and the freshly planned path are checked against the
    /// requested anchors; a mismatch means the cache is keyed inconsistently.
    pub fn get_or_calculate(
        &self,
        grid: &dyn OccupancyGrid,
        planner: &dyn PathPlanner,
        start: GridPoint,
        goal: GridPoint,
    ) -> DomainResult<Arc<Path>> {
        if let Some(cached) = self.get(start, goal) {
            ensure_anchors(&cached, start, goal)?;
            return Ok(cached);
        }

        let path = planner.calculate_path(grid, start, goal);
        ensure_anchors(&path, start, goal)?;
        Ok(self.insert(path))
    }
}

fn ensure_anchors(path: &Path, start: GridPoint, goal: GridPoint) -> DomainResult<()> {
    if path.matches_anchors(start, goal) {
        Ok(())
    } else {
        Err(DomainError::GeometryInconsistency {
            reason: format!(
                "path requested from {} to {} but covers {} to {}",
                start,
                goal,
                path.start(),
                path.goal()
            ),
        })
    }
}
