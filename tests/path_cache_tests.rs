use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use team_explore::adapters::outbound::{AStarPlanner, CellGrid};
use team_explore::common::{DomainError, GridPoint};
use team_explore::domains::grid::OccupancyGrid;
use team_explore::domains::path::{Path, PathCache, PathPlanner};

/// Counts calls and delegates to A*.
#[derive(Default)]
struct CountingPlanner {
    calls: AtomicUsize,
    inner: AStarPlanner,
}

impl PathPlanner for CountingPlanner {
    fn calculate_path(&self, grid: &dyn OccupancyGrid, start: GridPoint, goal: GridPoint) -> Path {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.calculate_path(grid, start, goal)
    }
}

/// Answers every request with a path between the wrong anchors.
struct MisroutingPlanner;

impl PathPlanner for MisroutingPlanner {
    fn calculate_path(&self, _grid: &dyn OccupancyGrid, start: GridPoint, _goal: GridPoint) -> Path {
        Path::new(start, start, vec![start])
    }
}

#[test]
fn test_miss_then_hit_plans_once() {
    let grid = CellGrid::open_field(20, 20);
    let planner = CountingPlanner::default();
    let cache = PathCache::new();
    let a = GridPoint::new(1, 1);
    let b = GridPoint::new(15, 9);

    let first = cache.get_or_calculate(&grid, &planner, a, b).unwrap();
    let second = cache.get_or_calculate(&grid, &planner, a, b).unwrap();
    assert_eq!(planner.calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));

    // the reverse direction was stored alongside
    let back = cache.get_or_calculate(&grid, &planner, b, a).unwrap();
    assert_eq!(planner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(back.start(), b);
    assert_eq!(back.goal(), a);
    assert_eq!(back.length(), first.length());
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_insert_never_replaces() {
    let cache = PathCache::new();
    let a = GridPoint::new(0, 0);
    let b = GridPoint::new(2, 0);
    let direct = Path::new(a, b, vec![a, GridPoint::new(1, 0), b]);
    let detour = Path::new(a, b, vec![a, GridPoint::new(1, 1), b]);

    let kept = cache.insert(direct.clone());
    let again = cache.insert(detour);
    assert!(Arc::ptr_eq(&kept, &again));
    assert_eq!(again.points(), direct.points());
    assert!(cache.contains(b, a));
}

#[test]
fn test_mismatched_anchors_are_rejected() {
    let grid = CellGrid::open_field(5, 5);
    let cache = PathCache::new();
    let result = cache.get_or_calculate(&grid, &MisroutingPlanner, GridPoint::new(0, 0), GridPoint::new(4, 4));
    assert!(matches!(result, Err(DomainError::GeometryInconsistency { .. })));
    assert!(cache.is_empty());
}

#[test]
fn test_unreachable_goal_is_cached_as_not_found() {
    let grid = CellGrid::from_ascii("..#..").unwrap();
    let planner = CountingPlanner::default();
    let cache = PathCache::new();
    let path = cache
        .get_or_calculate(&grid, &planner, GridPoint::new(0, 0), GridPoint::new(4, 0))
        .unwrap();
    assert!(!path.found());
    cache
        .get_or_calculate(&grid, &planner, GridPoint::new(0, 0), GridPoint::new(4, 0))
        .unwrap();
    assert_eq!(planner.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_builders_share_one_path() {
    let grid = CellGrid::open_field(30, 30);
    let planner = AStarPlanner::default();
    let cache = Arc::new(PathCache::new());
    let a = GridPoint::new(2, 3);
    let b = GridPoint::new(27, 25);

    let results: Vec<Arc<Path>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let grid = &grid;
                let planner = &planner;
                scope.spawn(move || cache.get_or_calculate(grid, planner, a, b).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for path in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], path));
    }
    assert_eq!(cache.len(), 2);
}
