use std::error::Error;
use std::sync::Arc;
use team_explore::adapters::inbound::{FileEventStore, InMemoryEventStore};
use team_explore::adapters::outbound::{init_combined_logger, init_console_logger, CellGrid, SimulatedEnvironment};
use team_explore::application::SimulationService;
use team_explore::common::EventStore;
use team_explore::Config;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting team-explore");

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;
    info!(
        "Configuration loaded: {} agents, {} ticks max",
        config.simulation.agents.len(),
        config.simulation.max_ticks
    );

    let logger = match &config.logging.file {
        Some(path) => init_combined_logger(path, config.logging.level),
        None => init_console_logger(config.logging.level),
    };

    let truth = match &config.simulation.map_file {
        Some(path) => CellGrid::from_ascii(&tokio::fs::read_to_string(path).await?)?,
        None => CellGrid::open_field(config.simulation.width, config.simulation.height),
    };
    let environment = SimulatedEnvironment::new(truth, config.simulation.sensor_range);

    let event_store: Arc<dyn EventStore> = match &config.event_log.directory {
        Some(dir) => Arc::new(FileEventStore::new(dir)),
        None => Arc::new(InMemoryEventStore::new()),
    };

    let mut simulation = SimulationService::new(&config, environment, event_store, logger)?;
    match simulation.run().await {
        Ok(report) => {
            info!(
                "Run {} finished after {} ticks (completed: {})",
                report.run_id, report.ticks_run, report.completed
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Err(e) => {
            error!("Simulation failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
