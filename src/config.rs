use crate::common::GridPoint;
use crate::domains::agent::{AgentProfile, Role, BASE_STATION_ID};
use crate::domains::exploration::ExplorationSettings;
use crate::domains::logger::LogLevel;
use crate::domains::rendezvous::RendezvousSettings;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "TEAM_EXPLORE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub exploration: ExplorationSettings,
    pub rendezvous: RendezvousSettings,
    pub logging: LoggingConfig,
    pub event_log: EventLogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub width: i32,
    pub height: i32,
    /// ASCII map (`.` free, `#` obstacle). An open field of `width` x `height` when unset.
    pub map_file: Option<String>,
    pub max_ticks: u32,
    pub sensor_range: f64,
    pub seed: u64,
    pub topology_rebuild_interval: u32,
    pub line_of_sight_comm: bool,
    pub key_point_spacing: f64,
    pub agents: Vec<AgentProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// fast_log output file. Console only when unset.
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// Directory for the JSON-lines event log. Events stay in memory when unset.
    pub directory: Option<String>,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then the optional TOML file, then `TEAM_EXPLORE__SECTION__KEY` variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder().add_source(::config::Config::try_from(&Config::default())?);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            map_file: None,
            max_ticks: 3000,
            sensor_range: 8.0,
            seed: 7,
            topology_rebuild_interval: 10,
            line_of_sight_comm: false,
            key_point_spacing: 8.0,
            agents: default_team(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
        }
    }
}

/// Base station, one relay and one explorer chained parent to child.
pub fn default_team() -> Vec<AgentProfile> {
    let start = GridPoint::new(1, 1);
    vec![
        AgentProfile {
            id: BASE_STATION_ID,
            name: "base".to_string(),
            role: Role::BaseStation,
            location: start,
            comm_range: 1000.0,
            speed: 0,
            parent_id: BASE_STATION_ID,
            child_id: Some(2),
        },
        AgentProfile {
            id: 2,
            name: "relay-1".to_string(),
            role: Role::Relay,
            location: start,
            comm_range: 1000.0,
            speed: 1,
            parent_id: BASE_STATION_ID,
            child_id: Some(3),
        },
        AgentProfile {
            id: 3,
            name: "explorer-1".to_string(),
            role: Role::Explorer,
            location: start,
            comm_range: 1000.0,
            speed: 1,
            parent_id: 2,
            child_id: None,
        },
    ]
}
