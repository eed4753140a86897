use super::role::{AgentId, AgentState, CompletionReason, RandomStepReason, Role};
use crate::common::{DomainEvent, GridPoint};
use crate::domains::frontier::Frontier;
use crate::domains::rendezvous::Rendezvous;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExplorationEvent {
    AgentRegistered {
        agent_id: AgentId,
        role: Role,
        location: GridPoint,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    FrontiersRecomputed {
        agent_id: AgentId,
        count: usize,
        percentage_known: f64,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    FrontierChosen {
        agent_id: AgentId,
        frontier: Frontier,
        path_length: f64,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    FrontierDropped {
        agent_id: AgentId,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    RandomStepTaken {
        agent_id: AgentId,
        reason: RandomStepReason,
        to: GridPoint,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    ParentLinkLost {
        agent_id: AgentId,
        parent_id: AgentId,
        failures: u32,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    ParentLinkRestored {
        agent_id: AgentId,
        parent_id: AgentId,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    RendezvousCalculated {
        agent_id: AgentId,
        rendezvous: Rendezvous,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    StateChanged {
        agent_id: AgentId,
        from: AgentState,
        to: AgentState,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
    MissionCompleted {
        agent_id: AgentId,
        reason: CompletionReason,
        tick: u32,
        timestamp: DateTime<Utc>,
    },
}

impl ExplorationEvent {
    pub fn agent_id(&self) -> AgentId {
        match self {
            ExplorationEvent::AgentRegistered { agent_id, .. }
            | ExplorationEvent::FrontiersRecomputed { agent_id, .. }
            | ExplorationEvent::FrontierChosen { agent_id, .. }
            | ExplorationEvent::FrontierDropped { agent_id, .. }
            | ExplorationEvent::RandomStepTaken { agent_id, .. }
            | ExplorationEvent::ParentLinkLost { agent_id, .. }
            | ExplorationEvent::ParentLinkRestored { agent_id, .. }
            | ExplorationEvent::RendezvousCalculated { agent_id, .. }
            | ExplorationEvent::StateChanged { agent_id, .. }
            | ExplorationEvent::MissionCompleted { agent_id, .. } => *agent_id,
        }
    }
}

impl DomainEvent for ExplorationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ExplorationEvent::AgentRegistered { .. } => "AgentRegistered",
            ExplorationEvent::FrontiersRecomputed { .. } => "FrontiersRecomputed",
            ExplorationEvent::FrontierChosen { .. } => "FrontierChosen",
            ExplorationEvent::FrontierDropped { .. } => "FrontierDropped",
            ExplorationEvent::RandomStepTaken { .. } => "RandomStepTaken",
            ExplorationEvent::ParentLinkLost { .. } => "ParentLinkLost",
            ExplorationEvent::ParentLinkRestored { .. } => "ParentLinkRestored",
            ExplorationEvent::RendezvousCalculated { .. } => "RendezvousCalculated",
            ExplorationEvent::StateChanged { .. } => "StateChanged",
            ExplorationEvent::MissionCompleted { .. } => "MissionCompleted",
        }
    }

    fn aggregate_id(&self) -> String {
        format!("agent-{}", self.agent_id())
    }

    fn tick(&self) -> u32 {
        match self {
            ExplorationEvent::AgentRegistered { tick, .. }
            | ExplorationEvent::FrontiersRecomputed { tick, .. }
            | ExplorationEvent::FrontierChosen { tick, .. }
            | ExplorationEvent::FrontierDropped { tick, .. }
            | ExplorationEvent::RandomStepTaken { tick, .. }
            | ExplorationEvent::ParentLinkLost { tick, .. }
            | ExplorationEvent::ParentLinkRestored { tick, .. }
            | ExplorationEvent::RendezvousCalculated { tick, .. }
            | ExplorationEvent::StateChanged { tick, .. }
            | ExplorationEvent::MissionCompleted { tick, .. } => *tick,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ExplorationEvent::AgentRegistered { timestamp, .. }
            | ExplorationEvent::FrontiersRecomputed { timestamp, .. }
            | ExplorationEvent::FrontierChosen { timestamp, .. }
            | ExplorationEvent::FrontierDropped { timestamp, .. }
            | ExplorationEvent::RandomStepTaken { timestamp, .. }
            | ExplorationEvent::ParentLinkLost { timestamp, .. }
            | ExplorationEvent::ParentLinkRestored { timestamp, .. }
            | ExplorationEvent::RendezvousCalculated { timestamp, .. }
            | ExplorationEvent::StateChanged { timestamp, .. }
            | ExplorationEvent::MissionCompleted { timestamp, .. } => *timestamp,
        }
    }
}
