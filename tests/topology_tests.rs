use std::sync::Arc;
use team_explore::adapters::outbound::{init_noop_logger, AStarPlanner, CellGrid, ThinningSkeletonizer};
use team_explore::common::{DomainError, GridPoint};
use team_explore::domains::grid::OccupancyGrid;
use team_explore::domains::path::PathCache;
use team_explore::domains::topology::{TopologicalMap, TopologyStage, TopologyView, UNEXPLORED_NODE_ID};

const CORRIDOR: &str = "\
####################
#..................#
#..................#
#..................#
####################";

const HALF_KNOWN_CORRIDOR: &str = "\
###########?????????
#..........?????????
#..........?????????
#..........?????????
###########?????????";

fn new_map(cache: Arc<PathCache>) -> TopologicalMap {
    TopologicalMap::new(
        Arc::new(ThinningSkeletonizer::new(4.0)),
        Arc::new(AStarPlanner::default()),
        cache,
        init_noop_logger(),
    )
}

#[test]
fn test_stages_must_run_in_order() {
    let mut grid = CellGrid::from_ascii(CORRIDOR).unwrap();
    let mut map = new_map(Arc::new(PathCache::new()));
    assert_eq!(map.stage(), TopologyStage::RawGrid);

    assert!(matches!(map.find_key_points(&grid), Err(DomainError::InvalidStage { .. })));
    assert!(matches!(map.generate_key_areas(&mut grid), Err(DomainError::InvalidStage { .. })));

    map.generate_skeleton(&grid);
    assert_eq!(map.stage(), TopologyStage::Skeleton);
    assert!(!map.skeleton_points().is_empty());
    assert!(matches!(map.generate_key_areas(&mut grid), Err(DomainError::InvalidStage { .. })));

    map.find_key_points(&grid).unwrap();
    map.generate_key_areas(&mut grid).unwrap();
    assert_eq!(map.stage(), TopologyStage::KeyAreas);
}

#[test]
fn test_nodes_partition_free_space() {
    let mut grid = CellGrid::from_ascii(CORRIDOR).unwrap();
    let mut map = new_map(Arc::new(PathCache::new()));
    map.rebuild(&mut grid).unwrap();

    assert!(map.node(UNEXPLORED_NODE_ID).is_some());
    let explored: Vec<_> = map.nodes().values().filter(|n| !n.is_unexplored()).collect();
    assert!(explored.len() >= 2);
    assert_eq!(explored.len(), map.key_points().len());

    let covered: usize = explored.iter().map(|n| n.cells().len()).sum();
    assert_eq!(covered, grid.count_free());

    for cell in grid.free_cells() {
        let id = map.area_of(cell).unwrap();
        let node = map.node(id).unwrap();
        assert!(node.cells().contains(&cell));
    }
    assert_eq!(map.area_of(GridPoint::new(0, 0)), None);
}

#[test]
fn test_edges_are_symmetric_and_cached() {
    let mut grid = CellGrid::from_ascii(CORRIDOR).unwrap();
    let cache = Arc::new(PathCache::new());
    let mut map = new_map(cache.clone());
    map.rebuild(&mut grid).unwrap();

    let mut edges = 0;
    for node in map.nodes().values() {
        for (other_id, path) in node.neighbours() {
            let Some(path) = path else { continue };
            edges += 1;
            let other = map.node(*other_id).unwrap();
            assert!(path.found());
            assert!(path.matches_anchors(node.position(), other.position()));

            let back = other.path_to(node.id()).unwrap();
            let mut reversed = path.points().to_vec();
            reversed.reverse();
            assert_eq!(back.points(), reversed.as_slice());

            let cached = cache.get(node.position(), other.position()).unwrap();
            assert!(Arc::ptr_eq(&cached, path));
        }
    }
    assert!(edges >= 2);
    assert!(!map.border_points().is_empty());

    let view = TopologyView::from_map(&map);
    assert_eq!(view.nodes.len(), map.key_points().len());
    assert_eq!(view.edge_count() * 2, edges);
}

#[test]
fn test_shared_cache_reuses_paths_across_maps() {
    let mut grid = CellGrid::from_ascii(CORRIDOR).unwrap();
    let cache = Arc::new(PathCache::new());

    let mut first = new_map(cache.clone());
    first.rebuild(&mut grid).unwrap();
    let cached = cache.len();
    assert!(cached > 0);

    let mut second = new_map(cache.clone());
    second.rebuild(&mut grid).unwrap();
    assert_eq!(cache.len(), cached);

    for node in first.nodes().values() {
        for (other, path) in node.neighbours() {
            if let Some(path) = path {
                let again = second.node(node.id()).and_then(|n| n.path_to(*other)).unwrap();
                assert!(Arc::ptr_eq(path, again));
            }
        }
    }
}

#[test]
fn test_areas_bordering_unknown_lose_final_flag() {
    let mut grid = CellGrid::from_ascii(HALF_KNOWN_CORRIDOR).unwrap();
    let mut map = new_map(Arc::new(PathCache::new()));
    map.rebuild(&mut grid).unwrap();

    let sentinel = map.node(UNEXPLORED_NODE_ID).unwrap();
    let unknown_cells = (grid.width() * grid.height()) as usize - grid.count_known();
    assert_eq!(sentinel.cells().len(), unknown_cells);
    assert!(!sentinel.neighbours().is_empty());

    for node in map.nodes().values().filter(|n| !n.is_unexplored()) {
        let borders_unknown = node.has_neighbour(UNEXPLORED_NODE_ID);
        if borders_unknown {
            assert!(node.path_to(UNEXPLORED_NODE_ID).is_none());
        }
        for cell in node.cells() {
            assert_eq!(grid.is_final_topological_map_cell(cell.x, cell.y), !borders_unknown);
        }
    }
}

#[test]
fn test_region_route_spans_the_corridor() {
    let mut grid = CellGrid::from_ascii(CORRIDOR).unwrap();
    let mut map = new_map(Arc::new(PathCache::new()));
    map.rebuild(&mut grid).unwrap();

    let from = GridPoint::new(1, 1);
    let to = GridPoint::new(18, 3);
    let (cost, route) = map.region_route(from, to).unwrap();
    assert_eq!(route.first().copied(), map.area_of(from));
    assert_eq!(route.last().copied(), map.area_of(to));
    assert!(route.len() >= 2);
    assert!(cost > 0.0);

    let (graph, index) = map.region_graph();
    assert_eq!(graph.node_count(), map.key_points().len());
    assert!(!index.contains_key(&UNEXPLORED_NODE_ID));
}
