use team_explore::adapters::outbound::{init_noop_logger, CellGrid, MemoryLogger};
use team_explore::common::GridPoint;
use team_explore::domains::frontier::{calculate_frontiers, ContourTracer, Direction};
use team_explore::domains::grid::OccupancyGrid;
use std::sync::Arc;

fn tracer() -> ContourTracer {
    ContourTracer::new(init_noop_logger())
}

/// `width` x `height` grid with the left `known_columns` columns free and the rest unknown.
fn half_known(width: i32, height: i32, known_columns: i32) -> CellGrid {
    let mut grid = CellGrid::new(width, height);
    for y in 0..height {
        for x in 0..known_columns {
            grid.set_free_space(x, y);
        }
    }
    grid
}

/// Fully free grid with an unknown square pocket in the middle.
fn grid_with_pocket(size: i32, pocket_from: i32, pocket_to: i32) -> CellGrid {
    let mut grid = CellGrid::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let in_pocket = (pocket_from..=pocket_to).contains(&x) && (pocket_from..=pocket_to).contains(&y);
            if !in_pocket {
                grid.set_free_space(x, y);
            }
        }
    }
    grid
}

#[test]
fn test_fully_known_grid_has_no_frontiers() {
    let grid = CellGrid::open_field(50, 50);
    assert!(tracer().find_all_contours(&grid).is_empty());
    assert!(calculate_frontiers(&tracer(), &grid, 1).is_empty());
}

#[test]
fn test_straight_frontier_touching_map_edge() {
    let grid = half_known(10, 6, 5);
    let contours = tracer().find_all_contours(&grid);
    assert_eq!(contours.len(), 1);

    let points = contours[0].points();
    assert_eq!(points.len(), 6);
    assert_eq!(points[0], GridPoint::new(4, 0));
    for y in 0..6 {
        assert!(points.contains(&GridPoint::new(4, y)));
    }

    let frontiers = calculate_frontiers(&tracer(), &grid, 2);
    assert_eq!(frontiers.len(), 1);
    assert_eq!(frontiers[0].size(), 6);
    assert_eq!(frontiers[0].centroid(), GridPoint::new(4, 3));
    assert_eq!(frontiers[0].closest_point(GridPoint::new(0, 5)), GridPoint::new(4, 5));
}

#[test]
fn test_min_size_filters_frontiers() {
    let grid = half_known(10, 6, 5);
    assert!(calculate_frontiers(&tracer(), &grid, 7).is_empty());
}

#[test]
fn test_enclosed_pocket_is_not_interesting() {
    let grid = grid_with_pocket(9, 3, 5);
    // the ring around the pocket is all frontier, but nothing on it touches an obstacle or the edge
    assert!(grid.frontier_cell_at(2, 2));
    assert!(!grid.frontier_border_cell_at(2, 4));
    assert!(tracer().find_all_contours(&grid).is_empty());
}

#[test]
fn test_pocket_next_to_obstacle_is_traced_as_closed_ring() {
    let mut grid = grid_with_pocket(9, 3, 5);
    grid.set_obstacle(1, 4);
    assert!(grid.frontier_border_cell_at(2, 4));

    let contours = tracer().find_all_contours(&grid);
    assert_eq!(contours.len(), 1);
    let ring = &contours[0];
    assert_eq!(ring.len(), 16);
    assert!(ring.is_closed());
    assert!(ring.points().iter().all(|p| grid.frontier_cell_at(p.x, p.y)));
}

#[test]
fn test_separate_pockets_give_disjoint_contours() {
    let mut grid = CellGrid::new(20, 9);
    for y in 0..9 {
        for x in 0..20 {
            let in_left = (3..=5).contains(&x) && (3..=5).contains(&y);
            let in_right = (13..=15).contains(&x) && (3..=5).contains(&y);
            if !in_left && !in_right {
                grid.set_free_space(x, y);
            }
        }
    }
    grid.set_obstacle(1, 4);
    grid.set_obstacle(17, 4);

    let contours = tracer().find_all_contours(&grid);
    assert_eq!(contours.len(), 2);
    assert!(contours.iter().all(|c| c.len() == 16 && c.is_closed()));

    let mut labelled = std::collections::HashSet::new();
    for contour in &contours {
        for p in contour.points() {
            assert!(labelled.insert(*p), "{} belongs to two contours", p);
        }
    }
    assert!(contours[0].points().iter().all(|p| p.x <= 6));
    assert!(contours[1].points().iter().all(|p| p.x >= 12));
}

#[test]
fn test_contour_cells_are_unique_and_adjacent() {
    let grid = half_known(12, 12, 7);
    for contour in tracer().find_all_contours(&grid) {
        let mut seen = std::collections::HashSet::new();
        assert!(contour.points().iter().all(|p| seen.insert(*p)));
        for pair in contour.points().windows(2) {
            assert!(pair[0].is_adjacent8(&pair[1]));
        }
    }
}

#[test]
fn test_trace_from_non_frontier_cell_warns() {
    let logger = Arc::new(MemoryLogger::new());
    let tracer = ContourTracer::new(logger.clone());
    let grid = half_known(10, 6, 5);

    let contour = tracer.trace_contour(&grid, GridPoint::new(0, 0), Direction::NorthEast);
    assert!(logger.contains("non-frontier"));
    assert_eq!(contour.points()[0], GridPoint::new(0, 0));
}

#[test]
fn test_single_pixel_frontier_short_circuits() {
    let mut grid = CellGrid::new(5, 5);
    grid.set_free_space(2, 2);

    let contour = tracer().trace_contour(&grid, GridPoint::new(2, 2), Direction::NorthEast);
    assert_eq!(contour.points(), &[GridPoint::new(2, 2)]);
    assert!(!contour.is_closed());
    assert!(tracer().find_all_contours(&grid).is_empty());
}
