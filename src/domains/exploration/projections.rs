use crate::common::{DomainResult, EventEnvelope};
use crate::domains::agent::{AgentId, CompletionReason, ExplorationEvent, RandomStepReason, Role};
use crate::domains::rendezvous::Rendezvous;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentProgress {
    pub role: Option<Role>,
    pub frontiers_chosen: u32,
    pub frontier_recomputations: u32,
    pub random_steps: u32,
    pub startup_steps: u32,
    pub link_losses: u32,
    pub rendezvous_count: u32,
    pub last_rendezvous: Option<Rendezvous>,
    pub last_percentage_known: f64,
    pub completed_at: Option<u32>,
    pub completion_reason: Option<CompletionReason>,
}

/// Mission summary folded from the exploration event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionProjection {
    pub agents: BTreeMap<AgentId, AgentProgress>,
    pub events_seen: usize,
    pub last_tick: u32,
}

impl MissionProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_envelopes(envelopes: &[EventEnvelope]) -> DomainResult<Self> {
        let mut projection = Self::new();
        for envelope in envelopes {
            let event: ExplorationEvent = envelope.decode()?;
            projection.apply(&event);
        }
        Ok(projection)
    }

    pub fn apply(&mut self, event: &ExplorationEvent) {
        use crate::common::DomainEvent;

        self.events_seen += 1;
        self.last_tick = self.last_tick.max(event.tick());
        let progress = self.agents.entry(event.agent_id()).or_default();
        match event {
            ExplorationEvent::AgentRegistered { role, .. } => progress.role = Some(*role),
            ExplorationEvent::FrontiersRecomputed { percentage_known, .. } => {
                progress.frontier_recomputations += 1;
                progress.last_percentage_known = *percentage_known;
            }
            ExplorationEvent::FrontierChosen { .. } => progress.frontiers_chosen += 1,
            ExplorationEvent::RandomStepTaken { reason, .. } => {
                progress.random_steps += 1;
                if *reason == RandomStepReason::Startup {
                    progress.startup_steps += 1;
                }
            }
            ExplorationEvent::ParentLinkLost { .. } => progress.link_losses += 1,
            ExplorationEvent::RendezvousCalculated { rendezvous, .. } => {
                progress.rendezvous_count += 1;
                progress.last_rendezvous = Some(rendezvous.clone());
            }
            ExplorationEvent::MissionCompleted { reason, tick, .. } => {
                progress.completed_at = Some(*tick);
                progress.completion_reason = Some(*reason);
            }
            ExplorationEvent::FrontierDropped { .. }
            | ExplorationEvent::ParentLinkRestored { .. }
            | ExplorationEvent::StateChanged { .. } => {}
        }
    }

    /// Every explorer has finished. Relays complete as soon as they start following.
    pub fn explorers_complete(&self) -> bool {
        let mut explorers = self
            .agents
            .values()
            .filter(|p| p.role == Some(Role::Explorer))
            .peekable();
        explorers.peek().is_some() && explorers.all(|p| p.completed_at.is_some())
    }
}
