use super::node::{NodeId, TopologicalNode, NO_AREA, UNEXPLORED_NODE_ID};
use super::ports::{AreaGrid, SkeletonGrid, SkeletonService};
use crate::common::{DomainError, DomainResult, GridPoint};
use crate::domains::grid::OccupancyGrid;
use crate::domains::logger::DynLogger;
use crate::domains::path::{Path, PathCache, PathPlanner};
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Build progress of the region graph. Each stage needs the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TopologyStage {
    RawGrid,
    Skeleton,
    KeyPoints,
    KeyAreas,
}

/// Region graph over the explored part of one agent's grid.
pub struct TopologicalMap {
    skeleton_service: Arc<dyn SkeletonService>,
    planner: Arc<dyn PathPlanner>,
    path_cache: Arc<PathCache>,
    logger: DynLogger,
    stage: TopologyStage,
    skeleton: Option<SkeletonGrid>,
    skeleton_points: Vec<GridPoint>,
    key_points: Vec<GridPoint>,
    area_grid: Option<AreaGrid>,
    border_points: Option<Vec<GridPoint>>,
    nodes: BTreeMap<NodeId, TopologicalNode>,
}

impl TopologicalMap {
    pub fn new(
        skeleton_service: Arc<dyn SkeletonService>,
        planner: Arc<dyn PathPlanner>,
        path_cache: Arc<PathCache>,
        logger: DynLogger,
    ) -> Self {
        Self {
            skeleton_service,
            planner,
            path_cache,
            logger,
            stage: TopologyStage::RawGrid,
            skeleton: None,
            skeleton_points: Vec::new(),
            key_points: Vec::new(),
            area_grid: None,
            border_points: None,
            nodes: BTreeMap::new(),
        }
    }

    pub fn stage(&self) -> TopologyStage {
        self.stage
    }

    pub fn path_cache(&self) -> &Arc<PathCache> {
        &self.path_cache
    }

    fn require_stage(&self, expected: TopologyStage) -> DomainResult<()> {
        if self.stage < expected {
            return Err(DomainError::InvalidStage {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", self.stage),
            });
        }
        Ok(())
    }

    pub fn generate_skeleton(&mut self, grid: &dyn OccupancyGrid) {
        let skeleton = self.skeleton_service.skeletonize(grid);
        self.skeleton_points = skeleton.points();
        self.skeleton = Some(skeleton);
        self.key_points.clear();
        self.area_grid = None;
        self.border_points = None;
        self.nodes.clear();
        self.stage = TopologyStage::Skeleton;
        self.logger.debug(&format!(
            "skeleton generated with {} points",
            self.skeleton_points.len()
        ));
    }

    pub fn find_key_points(&mut self, grid: &dyn OccupancyGrid) -> DomainResult<()> {
        self.require_stage(TopologyStage::Skeleton)?;
        let Some(skeleton) = self.skeleton.as_ref() else {
            return Err(DomainError::InvalidStage {
                expected: "Skeleton".to_string(),
                actual: "RawGrid".to_string(),
            });
        };
        self.key_points = self.skeleton_service.find_key_points(skeleton, grid);
        self.stage = TopologyStage::KeyPoints;
        Ok(())
    }

    /// Rebuild the node set and every adjacency edge from the current key points.
    ///
    /// Edges between explored areas carry the anchor-to-anchor path, shared
    /// through the path cache. Edges touching the unexplored node carry no path,
    /// and the explored side loses its final-topology flag since it still borders
    /// unknown space.
    pub fn generate_key_areas(&mut self, grid: &mut dyn OccupancyGrid) -> DomainResult<()> {
        self.require_stage(TopologyStage::KeyPoints)?;

        let mut nodes: BTreeMap<NodeId, TopologicalNode> = self
            .key_points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let id = (i + 1) as NodeId;
                (id, TopologicalNode::new(id, *p))
            })
            .collect();
        nodes.insert(UNEXPLORED_NODE_ID, TopologicalNode::unexplored());

        let areas = self.skeleton_service.fill_key_areas(&*grid, &self.key_points);
        for y in 0..areas.height() {
            for x in 0..areas.width() {
                let id = areas.get(x, y);
                if let Some(node) = nodes.get_mut(&id) {
                    node.add_cell(GridPoint::new(x, y));
                }
            }
        }

        let borders = self.skeleton_service.find_key_area_borders(&areas);

        for p in &borders {
            let current = areas.get(p.x, p.y);
            if current == NO_AREA || !nodes.contains_key(&current) {
                continue;
            }
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let other = areas.get(p.x + dx, p.y + dy);
                    if other == current || other == NO_AREA || !nodes.contains_key(&other) {
                        continue;
                    }
                    if nodes.get(&current).map(|n| n.has_neighbour(other)).unwrap_or(true) {
                        continue;
                    }

                    if current != UNEXPLORED_NODE_ID && other != UNEXPLORED_NODE_ID {
                        let (from, to) = match (nodes.get(&current), nodes.get(&other)) {
                            (Some(a), Some(b)) => (a.position(), b.position()),
                            _ => continue,
                        };
                        let (forward, reverse) = self.edge_paths(&*grid, from, to)?;
                        if let Some(node) = nodes.get_mut(&current) {
                            node.add_neighbour(other, Some(forward));
                        }
                        if let Some(node) = nodes.get_mut(&other) {
                            node.add_neighbour(current, Some(reverse));
                        }
                    } else {
                        if let Some(node) = nodes.get_mut(&current) {
                            node.add_neighbour(other, None);
                        }
                        if let Some(node) = nodes.get_mut(&other) {
                            node.add_neighbour(current, None);
                        }
                        let explored = if other == UNEXPLORED_NODE_ID { current } else { other };
                        if let Some(node) = nodes.get(&explored) {
                            for cell in node.cells() {
                                grid.unset_final_topological_map_cell(cell.x, cell.y);
                            }
                        }
                    }
                }
            }
        }

        self.logger.debug(&format!(
            "key areas generated: {} nodes, {} border points, {} cached paths",
            nodes.len(),
            borders.len(),
            self.path_cache.len()
        ));

        self.nodes = nodes;
        self.area_grid = Some(areas);
        self.border_points = Some(borders);
        self.stage = TopologyStage::KeyAreas;
        Ok(())
    }

    fn edge_paths(
        &self,
        grid: &dyn OccupancyGrid,
        from: GridPoint,
        to: GridPoint,
    ) -> DomainResult<(Arc<Path>, Arc<Path>)> {
        let forward = self
            .path_cache
            .get_or_calculate(grid, self.planner.as_ref(), from, to)
            .map_err(|e| {
                self.logger.error(&format!("region edge {} -> {}: {}", from, to, e));
                e
            })?;
        let reverse = self
            .path_cache
            .get(to, from)
            .unwrap_or_else(|| Arc::new(forward.reverse()));
        Ok((forward, reverse))
    }

    /// Run all three stages against `grid`.
    pub fn rebuild(&mut self, grid: &mut dyn OccupancyGrid) -> DomainResult<()> {
        self.generate_skeleton(&*grid);
        self.find_key_points(&*grid)?;
        self.generate_key_areas(grid)
    }

    pub fn skeleton_grid(&self) -> Option<&SkeletonGrid> {
        self.skeleton.as_ref()
    }

    pub fn skeleton_points(&self) -> &[GridPoint] {
        &self.skeleton_points
    }

    pub fn key_points(&self) -> &[GridPoint] {
        &self.key_points
    }

    pub fn area_grid(&self) -> Option<&AreaGrid> {
        self.area_grid.as_ref()
    }

    /// Area borders; computed on first access if the key areas were filled without them.
    pub fn border_points(&mut self) -> &[GridPoint] {
        if self.border_points.is_none() {
            let borders = self
                .area_grid
                .as_ref()
                .map(|areas| self.skeleton_service.find_key_area_borders(areas))
                .unwrap_or_default();
            self.border_points = Some(borders);
        }
        self.border_points.as_deref().unwrap_or(&[])
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, TopologicalNode> {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&TopologicalNode> {
        self.nodes.get(&id)
    }

    /// Area id of the cell, if key areas have been generated.
    pub fn area_of(&self, p: GridPoint) -> Option<NodeId> {
        self.area_grid
            .as_ref()
            .map(|areas| areas.get(p.x, p.y))
            .filter(|id| *id != NO_AREA)
    }

    /// Explored nodes with an edge per cached path, weighted by path length.
    pub fn region_graph(&self) -> (UnGraph<NodeId, f64>, HashMap<NodeId, NodeIndex>) {
        let mut graph = UnGraph::new_undirected();
        let mut index = HashMap::new();
        for id in self.nodes.keys().filter(|id| **id != UNEXPLORED_NODE_ID) {
            index.insert(*id, graph.add_node(*id));
        }
        for node in self.nodes.values() {
            for (other, path) in node.neighbours() {
                let Some(path) = path else { continue };
                if node.id() > *other || !path.found() {
                    continue;
                }
                if let (Some(a), Some(b)) = (index.get(&node.id()), index.get(other)) {
                    graph.add_edge(*a, *b, path.length());
                }
            }
        }
        (graph, index)
    }

    /// Cheapest chain of areas from the area containing `from` to the one containing `to`.
    pub fn region_route(&self, from: GridPoint, to: GridPoint) -> Option<(f64, Vec<NodeId>)> {
        let start = self.area_of(from).filter(|id| *id != UNEXPLORED_NODE_ID)?;
        let goal = self.area_of(to).filter(|id| *id != UNEXPLORED_NODE_ID)?;
        let (graph, index) = self.region_graph();
        let start_index = *index.get(&start)?;
        let goal_index = *index.get(&goal)?;
        let (cost, route) = astar(&graph, start_index, |n| n == goal_index, |e| *e.weight(), |_| 0.0)?;
        Some((cost, route.into_iter().map(|n| graph[n]).collect()))
    }
}
