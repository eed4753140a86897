use std::sync::Arc;
use team_explore::adapters::inbound::{FileEventStore, InMemoryEventStore};
use team_explore::adapters::outbound::{init_noop_logger, CellGrid, SimulatedEnvironment};
use team_explore::application::SimulationService;
use team_explore::common::{EventStore, GridPoint};
use team_explore::config::{default_team, Config};
use team_explore::domains::agent::Role;
use team_explore::domains::exploration::MissionProjection;
use team_explore::domains::grid::OccupancyGrid;
use tempfile::TempDir;

fn open_field_config(size: i32, max_ticks: u32) -> Config {
    let mut config = Config::default();
    config.simulation.width = size;
    config.simulation.height = size;
    config.simulation.max_ticks = max_ticks;
    config
}

#[tokio::test]
async fn test_open_field_is_explored_until_no_frontiers_remain() {
    let config = open_field_config(50, 4000);
    let environment = SimulatedEnvironment::new(CellGrid::open_field(50, 50), config.simulation.sensor_range);
    let store = Arc::new(InMemoryEventStore::new());
    let mut simulation = SimulationService::new(&config, environment, store.clone(), init_noop_logger()).unwrap();

    let report = simulation.run().await.unwrap();
    assert!(report.completed);
    assert!(report.ticks_run < 4000);

    let explorer = simulation
        .agents()
        .iter()
        .find(|a| a.role() == Role::Explorer)
        .unwrap();
    assert!(explorer.mission_complete());
    assert!(simulation.frontiers_of(explorer.id()).is_empty());
    assert!(report.percentage_known[&explorer.id()] > 50.0);

    // every agent's event stream made it into the store
    assert_eq!(store.aggregate_ids().await.len(), 3);
    assert!(report.mission.explorers_complete());
    let explorer_progress = &report.mission.agents[&explorer.id()];
    assert_eq!(explorer_progress.startup_steps, 3);
    assert!(explorer_progress.frontiers_chosen >= 1);
}

#[tokio::test]
async fn test_relay_keeps_up_with_explorer_and_maps_are_shared() {
    let config = open_field_config(30, 60);
    let environment = SimulatedEnvironment::new(CellGrid::open_field(30, 30), config.simulation.sensor_range);
    let mut simulation =
        SimulationService::new(&config, environment, Arc::new(InMemoryEventStore::new()), init_noop_logger())
            .unwrap();

    for _ in 0..40 {
        simulation.step().await.unwrap();
    }
    assert_eq!(simulation.current_tick(), 40);

    let base = simulation.agent(1).unwrap();
    let explorer = simulation.agent(3).unwrap();
    // the base never moves, so everything it knows beyond its own sensor came from teammates
    assert_eq!(base.location(), GridPoint::new(1, 1));
    assert!(base.grid().percentage_known() > 10.0);
    assert!(explorer.teammate(2).unwrap().is_in_range());
    assert!(simulation.topology().nodes().len() >= 2);
}

#[tokio::test]
async fn test_walled_map_with_file_event_log() {
    let map = "\
..........#.........
..........#.........
..........#.........
....................
..........#.........
..........#.........";
    let truth = CellGrid::from_ascii(map).unwrap();
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FileEventStore::new(temp.path()));

    let mut config = Config::default();
    config.simulation.max_ticks = 600;
    config.simulation.sensor_range = 4.0;
    let environment = SimulatedEnvironment::new(truth, config.simulation.sensor_range);
    let mut simulation = SimulationService::new(&config, environment, store.clone(), init_noop_logger()).unwrap();
    let report = simulation.run().await.unwrap();

    let explorer_events = store.load_events("agent-3", 0).await.unwrap();
    assert!(!explorer_events.is_empty());
    assert_eq!(explorer_events[0].event_type, "AgentRegistered");

    let replayed = MissionProjection::from_envelopes(&explorer_events).unwrap();
    assert_eq!(
        replayed.agents[&3].frontiers_chosen,
        report.mission.agents[&3].frontiers_chosen
    );

    // nobody walked through the wall
    for agent in simulation.agents() {
        let p = agent.location();
        assert!(simulation.environment().truth().free_space_at(p.x, p.y));
    }
}

#[test]
fn test_team_starting_inside_a_wall_is_rejected() {
    let mut config = Config::default();
    config.simulation.agents = default_team();
    config.simulation.agents[2].location = GridPoint::new(0, 0);
    let mut truth = CellGrid::open_field(10, 10);
    truth.set_obstacle(0, 0);
    let environment = SimulatedEnvironment::new(truth, 3.0);

    let result = SimulationService::new(&config, environment, Arc::new(InMemoryEventStore::new()), init_noop_logger());
    assert!(result.is_err());
}
