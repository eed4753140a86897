pub mod adapters;
pub mod application;
pub mod common;
pub mod config;
pub mod domains;

pub use config::Config;

// Re-export the types most callers need
pub use common::{ApplicationError, ApplicationResult, DomainError, DomainResult, EventEnvelope, EventStore, GridPoint};
pub use domains::{ExplorationAgent, ExplorationController, OccupancyGrid, TopologicalMap};
