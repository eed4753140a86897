//! Tick-by-tick driver for a leader-follower exploration team.
//!
//! Each tick runs the same phases for every agent: sense, exchange snapshots
//! and merge maps with teammates in range, rebuild the shared topology when
//! due, decide, move. Events raised along the way are appended to the event
//! store per agent with optimistic versioning.

use crate::adapters::outbound::{
    AStarPlanner, CellGrid, CircleCommModel, SimulatedEnvironment, ThinningSkeletonizer, UtilityFrontierChooser,
};
use crate::common::{
    AggregateRoot, ApplicationError, ApplicationResult, EventEnvelope, EventMetadata, EventStore, Snapshot,
};
use crate::config::{Config, SimulationConfig};
use crate::domains::agent::{AgentId, AgentSnapshot, ExplorationAgent, Role, TeammateAgent};
use crate::domains::exploration::{CommunicationModel, ExplorationController, MissionProjection};
use crate::domains::frontier::{calculate_frontiers, ContourTracer, Frontier, FrontierChooser};
use crate::domains::grid::OccupancyGrid;
use crate::domains::logger::DynLogger;
use crate::domains::path::{PathCache, PathPlanner};
use crate::domains::rendezvous::SinglePointRendezvousStrategy;
use crate::domains::topology::{SkeletonService, TopologicalMap, TopologyView};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

const AGGREGATE_TYPE: &str = "ExplorationAgent";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub ticks_run: u32,
    /// Every explorer finished before the tick limit.
    pub completed: bool,
    pub percentage_known: BTreeMap<AgentId, f64>,
    pub mission: MissionProjection,
    pub topology: Option<TopologyView>,
    pub cached_paths: usize,
}

pub struct SimulationService {
    run_id: Uuid,
    settings: SimulationConfig,
    environment: SimulatedEnvironment,
    comm_model: Arc<dyn CommunicationModel>,
    agents: Vec<ExplorationAgent>,
    controllers: HashMap<AgentId, ExplorationController>,
    topology: TopologicalMap,
    tracer: ContourTracer,
    min_frontier_size: usize,
    event_store: Arc<dyn EventStore>,
    projection: MissionProjection,
    logger: DynLogger,
    tick: u32,
}

impl SimulationService {
    /// Wire the reference adapters from `config` around the given environment.
    pub fn new(
        config: &Config,
        environment: SimulatedEnvironment,
        event_store: Arc<dyn EventStore>,
        logger: DynLogger,
    ) -> ApplicationResult<Self> {
        let settings = config.simulation.clone();
        let planner: Arc<dyn PathPlanner> = Arc::new(AStarPlanner::default());
        let skeleton_service: Arc<dyn SkeletonService> =
            Arc::new(ThinningSkeletonizer::new(settings.key_point_spacing));
        let chooser: Arc<dyn FrontierChooser> = Arc::new(UtilityFrontierChooser::default());
        let comm_model: Arc<dyn CommunicationModel> = Arc::new(CircleCommModel::new(settings.line_of_sight_comm));

        validate_team(&settings, &environment)?;

        let mut agents = Vec::with_capacity(settings.agents.len());
        let mut controllers = HashMap::new();
        for profile in &settings.agents {
            let grid = CellGrid::new(environment.width(), environment.height());
            let mut agent = ExplorationAgent::new(profile.clone(), Box::new(grid), 0);
            for other in settings.agents.iter().filter(|o| o.id != profile.id) {
                agent.add_teammate(TeammateAgent::new(
                    other.id,
                    &other.name,
                    other.role,
                    other.location,
                    other.comm_range,
                ));
            }
            if profile.role.is_mobile() {
                let strategy = SinglePointRendezvousStrategy::new(
                    config.rendezvous.clone(),
                    Arc::clone(&skeleton_service),
                    Arc::clone(&planner),
                    Arc::clone(&logger),
                );
                controllers.insert(
                    profile.id,
                    ExplorationController::new(
                        config.exploration.clone(),
                        Arc::clone(&chooser),
                        Arc::clone(&planner),
                        Box::new(strategy),
                        settings.seed.wrapping_add(profile.id as u64),
                        Arc::clone(&logger),
                    ),
                );
            }
            agents.push(agent);
        }

        let topology = TopologicalMap::new(
            skeleton_service,
            Arc::clone(&planner),
            Arc::new(PathCache::new()),
            Arc::clone(&logger),
        );

        Ok(Self {
            run_id: Uuid::new_v4(),
            settings,
            environment,
            comm_model,
            agents,
            controllers,
            topology,
            tracer: ContourTracer::new(Arc::clone(&logger)),
            min_frontier_size: config.exploration.min_frontier_size,
            event_store,
            projection: MissionProjection::new(),
            logger,
            tick: 0,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn agents(&self) -> &[ExplorationAgent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&ExplorationAgent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn topology(&self) -> &TopologicalMap {
        &self.topology
    }

    pub fn projection(&self) -> &MissionProjection {
        &self.projection
    }

    pub fn environment(&self) -> &SimulatedEnvironment {
        &self.environment
    }

    /// Frontiers currently visible in an agent's own map.
    pub fn frontiers_of(&self, id: AgentId) -> Vec<Frontier> {
        self.agent(id)
            .map(|a| calculate_frontiers(&self.tracer, a.grid(), self.min_frontier_size))
            .unwrap_or_default()
    }

    /// Every explorer has completed its mission. False for a team without explorers.
    pub fn explorers_complete(&self) -> bool {
        let mut explorers = self.agents.iter().filter(|a| a.is_explorer()).peekable();
        explorers.peek().is_some() && explorers.all(|a| a.mission_complete())
    }

    /// Run until every explorer is done or the tick limit is hit.
    pub async fn run(&mut self) -> ApplicationResult<SimulationReport> {
        self.logger.info(&format!(
            "simulation {} starting: {} agents on {}x{}",
            self.run_id,
            self.agents.len(),
            self.environment.width(),
            self.environment.height()
        ));
        self.publish_events().await?;

        while self.tick < self.settings.max_ticks && !self.explorers_complete() {
            self.step().await?;
        }

        let completed = self.explorers_complete();
        if completed {
            self.logger.info(&format!("all explorers finished after {} ticks", self.tick));
        } else {
            self.logger.warn(&format!("tick limit {} reached before explorers finished", self.settings.max_ticks));
        }
        Ok(self.report(completed))
    }

    /// Advance the whole team by one tick.
    pub async fn step(&mut self) -> ApplicationResult<()> {
        let tick = self.tick;
        self.sense();
        self.communicate(tick);
        self.rebuild_topology(tick);
        self.decide_and_move(tick);
        self.publish_events().await?;
        self.tick += 1;
        Ok(())
    }

    fn sense(&mut self) {
        for agent in &mut self.agents {
            let location = agent.location();
            if self.environment.sense(agent.grid_mut(), location) > 0 {
                agent.invalidate_frontiers();
            }
        }
    }

    /// Decide links for this tick, then deliver snapshots and merge maps over every live link.
    fn communicate(&mut self, tick: u32) {
        let snapshots: Vec<Snapshot<AgentSnapshot>> = self.agents.iter().map(|a| a.snapshot(tick)).collect();
        let truth = self.environment.truth();

        for agent in &mut self.agents {
            for snapshot in &snapshots {
                let other = snapshot.data();
                if other.id == agent.id() {
                    continue;
                }
                let linked = self.comm_model.can_communicate(
                    truth,
                    agent.location(),
                    agent.comm_range(),
                    other.location,
                    other.comm_range,
                );
                let Ok(mate) = agent.teammate_mut(other.id) else {
                    continue;
                };
                mate.set_in_range(linked);
                if !linked {
                    continue;
                }
                mate.absorb(snapshot);
                if agent.grid_mut().merge_from(other.grid.as_ref()) > 0 {
                    agent.invalidate_frontiers();
                }
            }
        }
    }

    /// The team's region graph lives on the base station's merged map.
    fn rebuild_topology(&mut self, tick: u32) {
        let interval = self.settings.topology_rebuild_interval;
        if interval == 0 || tick % interval != 0 {
            return;
        }
        let Some(base) = self.agents.iter_mut().find(|a| a.role() == Role::BaseStation) else {
            return;
        };
        if let Err(e) = self.topology.rebuild(base.grid_mut()) {
            self.logger.warn(&format!("tick {}: topology rebuild failed: {}", tick, e));
        }
    }

    fn decide_and_move(&mut self, tick: u32) {
        for agent in &mut self.agents {
            let Some(controller) = self.controllers.get_mut(&agent.id()) else {
                continue;
            };
            controller.handle_communication(agent, tick);
            let from = agent.location();
            let to = controller.take_step(agent, tick);
            if to == from {
                continue;
            }
            if self.environment.valid_move(from, to) {
                agent.move_to(to);
            } else {
                self.logger.debug(&format!("{}: move {} -> {} rejected", agent.name(), from, to));
                agent.set_env_error(true);
            }
        }
    }

    async fn publish_events(&mut self) -> ApplicationResult<()> {
        let metadata = EventMetadata::for_run(self.run_id, "simulation");
        for agent in &mut self.agents {
            let events = agent.take_uncommitted_events();
            if events.is_empty() {
                continue;
            }
            let expected_version = agent.version() - events.len() as u64;
            let envelopes = events
                .iter()
                .map(|e| EventEnvelope::new(e, AGGREGATE_TYPE, metadata.clone()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ApplicationError::EventStore(e.to_string()))?;
            self.event_store
                .append_events(&agent.aggregate_id(), expected_version, envelopes)
                .await
                .map_err(ApplicationError::EventStore)?;
            events.iter().for_each(|e| self.projection.apply(e));
        }
        Ok(())
    }

    fn report(&self, completed: bool) -> SimulationReport {
        SimulationReport {
            run_id: self.run_id,
            ticks_run: self.tick,
            completed,
            percentage_known: self
                .agents
                .iter()
                .map(|a| (a.id(), a.grid().percentage_known()))
                .collect(),
            mission: self.projection.clone(),
            topology: (!self.topology.nodes().is_empty()).then(|| TopologyView::from_map(&self.topology)),
            cached_paths: self.topology.path_cache().len(),
        }
    }
}

fn validate_team(settings: &SimulationConfig, environment: &SimulatedEnvironment) -> ApplicationResult<()> {
    let invalid = |reason: String| ApplicationError::Configuration(anyhow::anyhow!(reason));
    if settings.agents.is_empty() {
        return Err(invalid("no agents configured".to_string()));
    }
    for profile in &settings.agents {
        let p = profile.location;
        if !environment.truth().free_space_at_point(p) {
            return Err(invalid(format!("{} starts on a blocked cell {}", profile.name, p)));
        }
        if profile.id != profile.parent_id && !settings.agents.iter().any(|a| a.id == profile.parent_id) {
            return Err(invalid(format!("{} has unknown parent {}", profile.name, profile.parent_id)));
        }
    }
    Ok(())
}
