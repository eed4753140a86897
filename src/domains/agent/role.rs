use serde::{Deserialize, Serialize};
use std::fmt;

pub type AgentId = u32;

/// The base station is always teammate 1.
pub const BASE_STATION_ID: AgentId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Explorer,
    Relay,
    BaseStation,
    RelayStation,
}

impl Role {
    /// Stations never move; only explorers and relays run a controller.
    pub fn is_mobile(&self) -> bool {
        matches!(self, Role::Explorer | Role::Relay)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Explorer => "explorer",
            Role::Relay => "relay",
            Role::BaseStation => "base-station",
            Role::RelayStation => "relay-station",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Initial,
    Explore,
    ReturnToParent,
    GoToChild,
    ReturnToBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RandomStepReason {
    Startup,
    EnvironmentError,
    NoFrontierChosen,
    NoPathFound,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionReason {
    NoFrontiers,
    NoNewKnowledge,
    CompletionPercentageReached,
    FollowingChild,
}
