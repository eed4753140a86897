use crate::common::GridPoint;
use crate::domains::path::Path;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type NodeId = u32;

/// Area id for cells no node owns (obstacles).
pub const NO_AREA: NodeId = 0;

/// Reserved node that catches every cell not yet explored.
pub const UNEXPLORED_NODE_ID: NodeId = u32::MAX;

/// One key area of the region graph.
#[derive(Debug, Clone)]
pub struct TopologicalNode {
    id: NodeId,
    position: GridPoint,
    cells: Vec<GridPoint>,
    /// Edge to each neighbour; `None` when the edge touches unexplored space.
    neighbours: BTreeMap<NodeId, Option<Arc<Path>>>,
}

impl TopologicalNode {
    pub fn new(id: NodeId, position: GridPoint) -> Self {
        Self {
            id,
            position,
            cells: Vec::new(),
            neighbours: BTreeMap::new(),
        }
    }

    pub fn unexplored() -> Self {
        Self::new(UNEXPLORED_NODE_ID, GridPoint::new(-1, -1))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> GridPoint {
        self.position
    }

    pub fn is_unexplored(&self) -> bool {
        self.id == UNEXPLORED_NODE_ID
    }

    pub fn cells(&self) -> &[GridPoint] {
        &self.cells
    }

    pub(crate) fn add_cell(&mut self, cell: GridPoint) {
        self.cells.push(cell);
    }

    pub fn has_neighbour(&self, id: NodeId) -> bool {
        self.neighbours.contains_key(&id)
    }

    pub(crate) fn add_neighbour(&mut self, id: NodeId, path: Option<Arc<Path>>) {
        self.neighbours.insert(id, path);
    }

    pub fn neighbours(&self) -> &BTreeMap<NodeId, Option<Arc<Path>>> {
        &self.neighbours
    }

    pub fn path_to(&self, id: NodeId) -> Option<&Arc<Path>> {
        self.neighbours.get(&id).and_then(|p| p.as_ref())
    }
}
