use super::events::ExplorationEvent;
use super::role::{AgentId, AgentState, CompletionReason, RandomStepReason, Role, BASE_STATION_ID};
use super::teammate::{AgentSnapshot, TeammateAgent};
use crate::common::{AggregateRoot, DomainError, DomainResult, GridPoint, Snapshot};
use crate::domains::frontier::{Frontier, FrontierChoice};
use crate::domains::grid::OccupancyGrid;
use crate::domains::path::Path;
use crate::domains::rendezvous::{Rendezvous, RendezvousAgentData};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Static description of an agent, as configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: AgentId,
    pub name: String,
    pub role: Role,
    pub location: GridPoint,
    pub comm_range: f64,
    pub speed: u32,
    pub parent_id: AgentId,
    pub child_id: Option<AgentId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub time_since_last_plan: u32,
    pub time_last_direct_contact_cs: u32,
    pub distance_traveled: f64,
    pub communication_failures: u32,
    /// Consecutive frontier recomputations that learned nothing new.
    pub stale_frontier_recomputations: u32,
    pub last_percentage_known: f64,
    pub random_steps: u32,
}

impl AgentStats {
    pub fn increment_time_since_last_plan(&mut self) {
        self.time_since_last_plan = self.time_since_last_plan.saturating_add(1);
    }

    pub fn increment_last_direct_contact_cs(&mut self) {
        self.time_last_direct_contact_cs = self.time_last_direct_contact_cs.saturating_add(1);
    }
}

/// One exploring agent: its belief grid, plan, teammates and rendezvous bookkeeping.
#[derive(Debug)]
pub struct ExplorationAgent {
    profile: AgentProfile,
    state: AgentState,
    location: GridPoint,
    previous_location: GridPoint,
    grid: Box<dyn OccupancyGrid>,
    /// Remaining route, starting with the current cell.
    route: VecDeque<GridPoint>,
    current_goal: GridPoint,
    frontiers: Vec<Frontier>,
    frontier: Option<Frontier>,
    stats: AgentStats,
    env_error: bool,
    mission_complete: bool,
    backtracking: bool,
    rendezvous: RendezvousAgentData,
    teammates: BTreeMap<AgentId, TeammateAgent>,
    version: u64,
    uncommitted_events: Vec<ExplorationEvent>,
}

impl ExplorationAgent {
    pub fn new(profile: AgentProfile, grid: Box<dyn OccupancyGrid>, tick: u32) -> Self {
        let location = profile.location;
        let mut agent = Self {
            state: AgentState::Initial,
            location,
            previous_location: location,
            grid,
            route: VecDeque::new(),
            current_goal: location,
            frontiers: Vec::new(),
            frontier: None,
            stats: AgentStats::default(),
            env_error: false,
            mission_complete: false,
            backtracking: false,
            rendezvous: RendezvousAgentData::new(),
            teammates: BTreeMap::new(),
            version: 0,
            uncommitted_events: Vec::new(),
            profile,
        };
        agent.record(ExplorationEvent::AgentRegistered {
            agent_id: agent.profile.id,
            role: agent.profile.role,
            location,
            tick,
            timestamp: Utc::now(),
        });
        agent
    }

    pub fn id(&self) -> AgentId {
        self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn is_explorer(&self) -> bool {
        self.profile.role == Role::Explorer
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn location(&self) -> GridPoint {
        self.location
    }

    pub fn previous_location(&self) -> GridPoint {
        self.previous_location
    }

    pub fn comm_range(&self) -> f64 {
        self.profile.comm_range
    }

    pub fn speed(&self) -> u32 {
        self.profile.speed.max(1)
    }

    pub fn parent_id(&self) -> AgentId {
        self.profile.parent_id
    }

    pub fn child_id(&self) -> Option<AgentId> {
        self.profile.child_id
    }

    pub fn grid(&self) -> &dyn OccupancyGrid {
        self.grid.as_ref()
    }

    pub fn grid_mut(&mut self) -> &mut dyn OccupancyGrid {
        self.grid.as_mut()
    }

    /// Move to `location`. Called once per tick after the environment accepted the step.
    pub fn move_to(&mut self, location: GridPoint) {
        self.stats.distance_traveled += self.location.distance(&location);
        self.previous_location = self.location;
        self.location = location;
        if self.route.front() != Some(&location) {
            // moved off the planned route
            self.route.clear();
        }
    }

    pub fn env_error(&self) -> bool {
        self.env_error
    }

    pub fn set_env_error(&mut self, env_error: bool) {
        self.env_error = env_error;
    }

    pub fn mission_complete(&self) -> bool {
        self.mission_complete
    }

    pub fn backtracking(&self) -> bool {
        self.backtracking
    }

    pub fn stats(&self) -> &AgentStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut AgentStats {
        &mut self.stats
    }

    pub fn rendezvous_data(&self) -> &RendezvousAgentData {
        &self.rendezvous
    }

    pub fn rendezvous_data_mut(&mut self) -> &mut RendezvousAgentData {
        &mut self.rendezvous
    }

    // route

    pub fn set_route(&mut self, path: &Path) {
        self.route = path.points().iter().copied().collect();
        if self.route.front() != Some(&self.location) {
            self.route.push_front(self.location);
        }
        self.current_goal = path.goal();
    }

    pub fn clear_route(&mut self) {
        self.route.clear();
    }

    pub fn route(&self) -> &VecDeque<GridPoint> {
        &self.route
    }

    /// At least one step left on the planned route.
    pub fn has_route_points(&self) -> bool {
        self.route.len() >= 2
    }

    /// Advance along the route. The returned cell becomes the route's head.
    pub fn next_path_point(&mut self) -> Option<GridPoint> {
        if !self.has_route_points() {
            return None;
        }
        self.route.pop_front();
        self.route.front().copied()
    }

    pub fn current_goal(&self) -> GridPoint {
        self.current_goal
    }

    // frontiers

    pub fn frontiers(&self) -> &[Frontier] {
        &self.frontiers
    }

    pub fn frontier(&self) -> Option<&Frontier> {
        self.frontier.as_ref()
    }

    /// Forget the cached frontier list so the next replan traces the grid again.
    pub fn invalidate_frontiers(&mut self) {
        self.frontiers.clear();
    }

    // teammates

    pub fn add_teammate(&mut self, mate: TeammateAgent) {
        self.teammates.insert(mate.id(), mate);
    }

    pub fn teammates(&self) -> &BTreeMap<AgentId, TeammateAgent> {
        &self.teammates
    }

    pub fn teammate(&self, id: AgentId) -> DomainResult<&TeammateAgent> {
        self.teammates
            .get(&id)
            .ok_or(DomainError::MissingTeammate { id })
    }

    pub fn teammate_mut(&mut self, id: AgentId) -> DomainResult<&mut TeammateAgent> {
        self.teammates
            .get_mut(&id)
            .ok_or(DomainError::MissingTeammate { id })
    }

    pub fn parent_teammate(&self) -> DomainResult<&TeammateAgent> {
        self.teammate(self.profile.parent_id)
    }

    pub fn child_teammate(&self) -> DomainResult<&TeammateAgent> {
        match self.profile.child_id {
            Some(id) => self.teammate(id),
            None => Err(DomainError::InvalidCommand {
                reason: format!("agent {} has no child", self.profile.id),
            }),
        }
    }

    pub fn base_station(&self) -> DomainResult<&TeammateAgent> {
        self.teammate(BASE_STATION_ID)
    }

    /// Whether the parent link is up. An unknown parent counts as out of range.
    pub fn parent_in_range(&self) -> bool {
        self.parent_teammate().map(|p| p.is_in_range()).unwrap_or(false)
    }

    pub fn snapshot(&self, tick: u32) -> Snapshot<AgentSnapshot> {
        Snapshot::new(
            &self.aggregate_id(),
            self.version,
            tick,
            AgentSnapshot {
                id: self.profile.id,
                name: self.profile.name.clone(),
                role: self.profile.role,
                location: self.location,
                comm_range: self.profile.comm_range,
                goal: self.frontier.as_ref().map(|f| f.centroid()),
                mission_complete: self.mission_complete,
                rendezvous: self.rendezvous.clone(),
                grid: self.grid.snapshot(),
            },
        )
    }

    // commands

    pub fn frontiers_recomputed(&mut self, frontiers: Vec<Frontier>, tick: u32) {
        let percentage_known = self.grid.percentage_known();
        let count = frontiers.len();
        self.frontiers = frontiers;
        self.record(ExplorationEvent::FrontiersRecomputed {
            agent_id: self.profile.id,
            count,
            percentage_known,
            tick,
            timestamp: Utc::now(),
        });
    }

    pub fn adopt_frontier(&mut self, choice: FrontierChoice, tick: u32) {
        self.set_route(&choice.path);
        self.record(ExplorationEvent::FrontierChosen {
            agent_id: self.profile.id,
            path_length: choice.path.length(),
            frontier: choice.frontier,
            tick,
            timestamp: Utc::now(),
        });
    }

    pub fn drop_frontier(&mut self, tick: u32) {
        if self.frontier.is_none() && self.frontiers.is_empty() {
            return;
        }
        self.record(ExplorationEvent::FrontierDropped {
            agent_id: self.profile.id,
            tick,
            timestamp: Utc::now(),
        });
    }

    pub fn random_step_taken(&mut self, reason: RandomStepReason, to: GridPoint, tick: u32) {
        self.stats.random_steps += 1;
        self.record(ExplorationEvent::RandomStepTaken {
            agent_id: self.profile.id,
            reason,
            to,
            tick,
            timestamp: Utc::now(),
        });
    }

    pub fn parent_link_lost(&mut self, failures: u32, tick: u32) {
        self.record(ExplorationEvent::ParentLinkLost {
            agent_id: self.profile.id,
            parent_id: self.profile.parent_id,
            failures,
            tick,
            timestamp: Utc::now(),
        });
    }

    pub fn parent_link_restored(&mut self, tick: u32) {
        self.record(ExplorationEvent::ParentLinkRestored {
            agent_id: self.profile.id,
            parent_id: self.profile.parent_id,
            tick,
            timestamp: Utc::now(),
        });
    }

    pub fn rendezvous_calculated(&mut self, rendezvous: Rendezvous, tick: u32) {
        self.record(ExplorationEvent::RendezvousCalculated {
            agent_id: self.profile.id,
            rendezvous,
            tick,
            timestamp: Utc::now(),
        });
    }

    pub fn change_state(&mut self, to: AgentState, tick: u32) {
        if self.state == to {
            return;
        }
        self.record(ExplorationEvent::StateChanged {
            agent_id: self.profile.id,
            from: self.state,
            to,
            tick,
            timestamp: Utc::now(),
        });
    }

    /// Mark the mission complete. Only the first call records anything.
    pub fn complete_mission(&mut self, reason: CompletionReason, tick: u32) {
        if self.mission_complete {
            return;
        }
        self.record(ExplorationEvent::MissionCompleted {
            agent_id: self.profile.id,
            reason,
            tick,
            timestamp: Utc::now(),
        });
    }

    fn record(&mut self, event: ExplorationEvent) {
        self.mutate(&event);
        self.add_event(event);
    }

    fn mutate(&mut self, event: &ExplorationEvent) {
        match event {
            ExplorationEvent::FrontierChosen { frontier, .. } => {
                self.frontier = Some(frontier.clone());
                self.state = AgentState::Explore;
            }
            ExplorationEvent::FrontierDropped { .. } => {
                self.frontier = None;
                self.frontiers.clear();
            }
            ExplorationEvent::ParentLinkLost { failures, .. } => {
                self.stats.communication_failures = *failures;
                self.backtracking = true;
                self.state = AgentState::ReturnToParent;
            }
            ExplorationEvent::ParentLinkRestored { .. } => {
                self.stats.communication_failures = 0;
                self.backtracking = false;
            }
            ExplorationEvent::StateChanged { to, .. } => {
                self.state = *to;
            }
            ExplorationEvent::MissionCompleted { .. } => {
                self.mission_complete = true;
            }
            ExplorationEvent::AgentRegistered { .. }
            | ExplorationEvent::FrontiersRecomputed { .. }
            | ExplorationEvent::RandomStepTaken { .. }
            | ExplorationEvent::RendezvousCalculated { .. } => {}
        }
        self.version += 1;
    }
}

impl AggregateRoot for ExplorationAgent {
    type Event = ExplorationEvent;

    fn aggregate_id(&self) -> String {
        format!("agent-{}", self.profile.id)
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) -> DomainResult<()> {
        if event.agent_id() != self.profile.id {
            return Err(DomainError::InvalidCommand {
                reason: format!(
                    "event for agent {} applied to agent {}",
                    event.agent_id(),
                    self.profile.id
                ),
            });
        }
        self.mutate(event);
        Ok(())
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
    }
}
