use super::map::{TopologicalMap, TopologyStage};
use super::node::{NodeId, UNEXPLORED_NODE_ID};
use crate::common::GridPoint;
use serde::{Deserialize, Serialize};

/// Read-only summary of the region graph for display and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyView {
    pub stage: TopologyStage,
    pub skeleton_points: usize,
    pub key_points: Vec<GridPoint>,
    pub nodes: Vec<NodeView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub position: GridPoint,
    pub cell_count: usize,
    pub neighbours: Vec<NodeId>,
    /// Whether any edge of this node leads into unexplored space.
    pub borders_unexplored: bool,
}

impl TopologyView {
    pub fn from_map(map: &TopologicalMap) -> Self {
        let nodes = map
            .nodes()
            .values()
            .filter(|n| !n.is_unexplored())
            .map(|n| NodeView {
                id: n.id(),
                position: n.position(),
                cell_count: n.cells().len(),
                neighbours: n.neighbours().keys().copied().collect(),
                borders_unexplored: n.has_neighbour(UNEXPLORED_NODE_ID),
            })
            .collect();
        Self {
            stage: map.stage(),
            skeleton_points: map.skeleton_points().len(),
            key_points: map.key_points().to_vec(),
            nodes,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| n.neighbours.iter().map(move |m| (n.id, *m)))
            .filter(|(a, b)| a < b)
            .count()
    }
}
