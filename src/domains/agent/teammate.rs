use super::role::{AgentId, Role};
use crate::common::{GridPoint, Snapshot};
use crate::domains::grid::OccupancyGrid;
use crate::domains::rendezvous::RendezvousAgentData;
use std::sync::Arc;

/// What an agent publishes about itself when it talks to a teammate.
#[derive(Debug, Clone)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub role: Role,
    pub location: GridPoint,
    pub comm_range: f64,
    pub goal: Option<GridPoint>,
    pub mission_complete: bool,
    pub rendezvous: RendezvousAgentData,
    pub grid: Arc<dyn OccupancyGrid>,
}

/// Local belief about a peer. May lag behind the peer's real state.
#[derive(Debug, Clone)]
pub struct TeammateAgent {
    id: AgentId,
    name: String,
    role: Role,
    location: GridPoint,
    comm_range: f64,
    in_range: bool,
    goal: Option<GridPoint>,
    mission_complete: bool,
    rendezvous: RendezvousAgentData,
    grid: Option<Arc<dyn OccupancyGrid>>,
    last_snapshot_tick: Option<u32>,
}

impl TeammateAgent {
    pub fn new(id: AgentId, name: &str, role: Role, location: GridPoint, comm_range: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            role,
            location,
            comm_range,
            in_range: false,
            goal: None,
            mission_complete: false,
            rendezvous: RendezvousAgentData::new(),
            grid: None,
            last_snapshot_tick: None,
        }
    }

    /// Belief built entirely from a received snapshot.
    pub fn from_snapshot(snapshot: &Snapshot<AgentSnapshot>) -> Self {
        let data = snapshot.data();
        let mut mate = Self::new(data.id, &data.name, data.role, data.location, data.comm_range);
        mate.absorb(snapshot);
        mate
    }

    /// Overwrite the belief with a newer snapshot. Older snapshots are ignored.
    pub fn absorb(&mut self, snapshot: &Snapshot<AgentSnapshot>) {
        if self
            .last_snapshot_tick
            .map(|t| snapshot.taken_at_tick < t)
            .unwrap_or(false)
        {
            return;
        }
        let data = snapshot.data();
        self.role = data.role;
        self.location = data.location;
        self.comm_range = data.comm_range;
        self.goal = data.goal;
        self.mission_complete = data.mission_complete;
        self.rendezvous = data.rendezvous.clone();
        self.grid = Some(Arc::clone(&data.grid));
        self.last_snapshot_tick = Some(snapshot.taken_at_tick);
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn location(&self) -> GridPoint {
        self.location
    }

    pub fn comm_range(&self) -> f64 {
        self.comm_range
    }

    pub fn is_in_range(&self) -> bool {
        self.in_range
    }

    pub fn set_in_range(&mut self, in_range: bool) {
        self.in_range = in_range;
    }

    pub fn goal(&self) -> Option<GridPoint> {
        self.goal
    }

    pub fn mission_complete(&self) -> bool {
        self.mission_complete
    }

    pub fn rendezvous(&self) -> &RendezvousAgentData {
        &self.rendezvous
    }

    pub fn grid(&self) -> Option<&Arc<dyn OccupancyGrid>> {
        self.grid.as_ref()
    }

    /// Ticks since the last snapshot, `None` if nothing was ever received.
    pub fn staleness(&self, now_tick: u32) -> Option<u32> {
        self.last_snapshot_tick.map(|t| now_tick.saturating_sub(t))
    }
}
