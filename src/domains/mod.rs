pub mod agent;
pub mod exploration;
pub mod frontier;
pub mod grid;
pub mod logger;
pub mod path;
pub mod rendezvous;
pub mod topology;

pub use agent::{AgentId, AgentProfile, AgentState, ExplorationAgent, ExplorationEvent, Role, TeammateAgent};
pub use exploration::{CommunicationModel, ExplorationController, ExplorationSettings, MissionProjection};
pub use frontier::{calculate_frontiers, Contour, ContourTracer, Frontier, FrontierChooser};
pub use grid::OccupancyGrid;
pub use logger::{DomainLogger, DynLogger, LogLevel};
pub use path::{Path, PathCache, PathPlanner};
pub use rendezvous::{Rendezvous, RendezvousSettings, RendezvousStrategy, SinglePointRendezvousStrategy};
pub use topology::{SkeletonService, TopologicalMap, TopologyView};
