use std::sync::Arc;
use team_explore::adapters::outbound::{
    init_noop_logger, AStarPlanner, CellGrid, MemoryLogger, ThinningSkeletonizer, UtilityFrontierChooser,
};
use team_explore::common::{AggregateRoot, GridPoint};
use team_explore::domains::agent::{
    AgentProfile, AgentState, CompletionReason, ExplorationAgent, ExplorationEvent, RandomStepReason, Role,
    TeammateAgent, BASE_STATION_ID,
};
use team_explore::domains::exploration::{ExplorationController, ExplorationSettings};
use team_explore::domains::grid::OccupancyGrid;
use team_explore::domains::logger::DynLogger;
use team_explore::domains::rendezvous::{Rendezvous, RendezvousSettings, SinglePointRendezvousStrategy};

const BASE: GridPoint = GridPoint { x: 1, y: 1 };
const RELAY_ID: u32 = 2;
const EXPLORER_ID: u32 = 3;

fn controller(logger: DynLogger) -> ExplorationController {
    controller_with(ExplorationSettings::default(), logger)
}

fn controller_with(settings: ExplorationSettings, logger: DynLogger) -> ExplorationController {
    let planner = Arc::new(AStarPlanner::default());
    let strategy = SinglePointRendezvousStrategy::new(
        RendezvousSettings::default(),
        Arc::new(ThinningSkeletonizer::default()),
        planner.clone(),
        logger.clone(),
    );
    ExplorationController::new(
        settings,
        Arc::new(UtilityFrontierChooser::default()),
        planner,
        Box::new(strategy),
        11,
        logger,
    )
}

/// Agent with the base station, relay and explorer registered as teammates at `mates`.
fn agent(role: Role, location: GridPoint, grid: CellGrid, mates: &[(u32, GridPoint, bool)]) -> ExplorationAgent {
    let (id, parent_id, child_id) = match role {
        Role::Explorer => (EXPLORER_ID, RELAY_ID, None),
        _ => (RELAY_ID, BASE_STATION_ID, Some(EXPLORER_ID)),
    };
    let profile = AgentProfile {
        id,
        name: format!("{}", role),
        role,
        location,
        comm_range: 100.0,
        speed: 1,
        parent_id,
        child_id,
    };
    let mut agent = ExplorationAgent::new(profile, Box::new(grid), 0);
    for (mate_id, mate_location, in_range) in mates {
        let mate_role = match *mate_id {
            BASE_STATION_ID => Role::BaseStation,
            RELAY_ID => Role::Relay,
            _ => Role::Explorer,
        };
        let mut mate = TeammateAgent::new(*mate_id, "mate", mate_role, *mate_location, 100.0);
        mate.set_in_range(*in_range);
        agent.add_teammate(mate);
    }
    agent.take_uncommitted_events();
    agent
}

fn half_known(width: i32, height: i32, known_columns: i32) -> CellGrid {
    let mut grid = CellGrid::new(width, height);
    for y in 0..height {
        for x in 0..known_columns {
            grid.set_free_space(x, y);
        }
    }
    grid
}

#[test]
fn test_explorer_startup_takes_random_step_and_resets_timer() {
    let mut controller = controller(init_noop_logger());
    let start = GridPoint::new(10, 10);
    let mut explorer = agent(
        Role::Explorer,
        start,
        CellGrid::open_field(20, 20),
        &[(BASE_STATION_ID, BASE, true), (RELAY_ID, GridPoint::new(9, 9), true)],
    );

    for tick in 0..3 {
        let step = controller.take_step(&mut explorer, tick);
        assert_eq!(explorer.stats().time_since_last_plan, 0);
        assert!(step != start);
        assert!(step.chebyshev(&start) <= 2);
    }

    let events = explorer.take_uncommitted_events();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| matches!(
        e,
        ExplorationEvent::RandomStepTaken { reason: RandomStepReason::Startup, .. }
    )));
}

#[test]
fn test_relay_holds_still_during_startup_and_completes_once() {
    let mut controller = controller(init_noop_logger());
    let start = GridPoint::new(5, 5);
    let mut relay = agent(
        Role::Relay,
        start,
        CellGrid::open_field(20, 20),
        &[(BASE_STATION_ID, BASE, true), (EXPLORER_ID, GridPoint::new(8, 5), true)],
    );

    assert_eq!(controller.take_step(&mut relay, 0), start);
    assert_eq!(controller.take_step(&mut relay, 1), start);
    assert!(relay.mission_complete());

    let completions = relay
        .take_uncommitted_events()
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                ExplorationEvent::MissionCompleted { reason: CompletionReason::FollowingChild, .. }
            )
        })
        .count();
    assert_eq!(completions, 1);
}

#[test]
fn test_relay_backtracks_on_link_loss_and_returns_to_child() {
    let logger = Arc::new(MemoryLogger::new());
    let mut controller = controller(logger.clone());
    let mut relay = agent(
        Role::Relay,
        GridPoint::new(10, 10),
        CellGrid::open_field(30, 30),
        &[(BASE_STATION_ID, BASE, false), (EXPLORER_ID, GridPoint::new(20, 10), true)],
    );

    let step = controller.take_step(&mut relay, 5);
    assert!(relay.backtracking());
    assert_eq!(relay.state(), AgentState::ReturnToParent);
    assert_eq!(step, GridPoint::new(9, 9));
    assert!(logger.contains("backtracking"));

    relay.teammate_mut(BASE_STATION_ID).unwrap().set_in_range(true);
    let step = controller.take_step(&mut relay, 6);
    assert!(!relay.backtracking());
    assert_eq!(relay.state(), AgentState::GoToChild);
    assert_eq!(step, GridPoint::new(11, 10));
    assert_eq!(relay.current_goal(), GridPoint::new(20, 10));

    let events = relay.take_uncommitted_events();
    assert!(events.iter().any(|e| matches!(e, ExplorationEvent::ParentLinkLost { .. })));
    assert!(events.iter().any(|e| matches!(e, ExplorationEvent::ParentLinkRestored { .. })));
}

#[test]
fn test_explorer_chooses_frontier_and_follows_route() {
    let mut controller = controller(init_noop_logger());
    let start = GridPoint::new(2, 5);
    let mut explorer = agent(
        Role::Explorer,
        start,
        half_known(30, 10, 8),
        &[(BASE_STATION_ID, BASE, true), (RELAY_ID, GridPoint::new(2, 4), true)],
    );

    let step = controller.take_step(&mut explorer, 3);
    assert!(step.is_adjacent8(&start));
    assert_eq!(explorer.state(), AgentState::Explore);
    let frontier = explorer.frontier().cloned().unwrap();
    assert!(frontier.outline().iter().all(|p| p.x == 7));
    assert_eq!(explorer.current_goal().x, 7);

    explorer.move_to(step);
    let next = controller.take_step(&mut explorer, 4);
    assert!(next.is_adjacent8(&step));

    let events = explorer.take_uncommitted_events();
    assert!(events.iter().any(|e| matches!(e, ExplorationEvent::FrontiersRecomputed { count: 1, .. })));
    assert!(events.iter().any(|e| matches!(e, ExplorationEvent::FrontierChosen { .. })));
    assert!(explorer.rendezvous_data().parent_rendezvous.is_some());
}

#[test]
fn test_explorer_without_frontiers_heads_home() {
    let mut controller = controller(init_noop_logger());
    let mut explorer = agent(
        Role::Explorer,
        GridPoint::new(10, 10),
        CellGrid::open_field(20, 20),
        &[(BASE_STATION_ID, BASE, true), (RELAY_ID, GridPoint::new(9, 9), true)],
    );

    let step = controller.take_step(&mut explorer, 3);
    assert!(explorer.mission_complete());
    assert_eq!(explorer.state(), AgentState::ReturnToBase);
    assert_eq!(step, GridPoint::new(9, 9));

    let events = explorer.take_uncommitted_events();
    assert!(events.iter().any(|e| matches!(
        e,
        ExplorationEvent::MissionCompleted { reason: CompletionReason::NoFrontiers, .. }
    )));
}

#[test]
fn test_explorer_turns_back_after_repeated_link_failures() {
    let mut controller = controller(init_noop_logger());
    let here = GridPoint::new(10, 10);
    let mut explorer = agent(
        Role::Explorer,
        here,
        CellGrid::open_field(20, 20),
        &[(BASE_STATION_ID, BASE, false), (RELAY_ID, GridPoint::new(2, 2), false)],
    );

    for tick in 3..8 {
        controller.take_step(&mut explorer, tick);
        assert!(!explorer.backtracking());
    }
    assert_eq!(explorer.stats().communication_failures, 5);

    let step = controller.take_step(&mut explorer, 8);
    assert!(explorer.backtracking());
    assert_eq!(explorer.state(), AgentState::ReturnToParent);
    assert_eq!(step, GridPoint::new(9, 9));
    assert_eq!(
        explorer.rendezvous_data().child_rendezvous.as_ref().map(|r| r.child_location()),
        Some(here)
    );
    assert!(explorer.frontier().is_none());
}

#[test]
fn test_environment_error_forces_short_random_step() {
    let mut controller = controller(init_noop_logger());
    let start = GridPoint::new(10, 10);
    let mut explorer = agent(
        Role::Explorer,
        start,
        CellGrid::open_field(20, 20),
        &[(BASE_STATION_ID, BASE, true), (RELAY_ID, GridPoint::new(9, 9), true)],
    );
    explorer.stats_mut().time_since_last_plan = 7;
    explorer.set_env_error(true);

    let step = controller.take_step(&mut explorer, 20);
    assert!(!explorer.env_error());
    assert_eq!(explorer.stats().time_since_last_plan, 0);
    assert!(step.chebyshev(&start) <= 1);

    let events = explorer.take_uncommitted_events();
    assert!(matches!(
        events.last(),
        Some(ExplorationEvent::RandomStepTaken { reason: RandomStepReason::EnvironmentError, .. })
    ));
}

#[test]
fn test_handle_communication_sets_meeting_on_reconnect() {
    let mut controller = controller(init_noop_logger());
    let start = GridPoint::new(3, 3);
    let mut explorer = agent(
        Role::Explorer,
        start,
        CellGrid::open_field(40, 40),
        &[(BASE_STATION_ID, BASE, true), (RELAY_ID, GridPoint::new(2, 2), true)],
    );
    let route = team_explore::domains::path::PathPlanner::calculate_path(
        &AStarPlanner::default(),
        explorer.grid(),
        start,
        GridPoint::new(35, 3),
    );
    explorer.set_route(&route);
    explorer.rendezvous_data_mut().time_since_last_rv_calc = 4;

    controller.handle_communication(&mut explorer, 9);
    let rvd = explorer.rendezvous_data();
    let parent_rv = rvd.parent_rendezvous.clone().unwrap();
    assert_eq!(parent_rv.child_location(), GridPoint::new(35, 3));
    assert!(parent_rv.time_meeting() >= 9);
    assert_eq!(rvd.time_since_last_rv_calc, 5);
}

#[test]
fn test_explorer_heads_for_parent_not_meeting_point_after_link_failures() {
    let mut controller = controller(init_noop_logger());
    let parent = GridPoint::new(2, 2);
    let mut explorer = agent(
        Role::Explorer,
        GridPoint::new(10, 10),
        CellGrid::open_field(20, 20),
        &[(BASE_STATION_ID, BASE, false), (RELAY_ID, parent, false)],
    );
    explorer.rendezvous_data_mut().parent_rendezvous = Some(Rendezvous::at(GridPoint::new(18, 18)));

    for tick in 3..8 {
        controller.take_step(&mut explorer, tick);
    }
    let step = controller.take_step(&mut explorer, 8);

    assert!(explorer.backtracking());
    assert_eq!(step, GridPoint::new(9, 9));
    assert_eq!(explorer.current_goal(), parent);
}

#[test]
fn test_explorer_returns_home_once_completion_percentage_reached() {
    let settings = ExplorationSettings {
        completion_percentage: 20.0,
        ..ExplorationSettings::default()
    };
    let mut controller = controller_with(settings, init_noop_logger());
    // 80 of 300 cells known
    let mut explorer = agent(
        Role::Explorer,
        GridPoint::new(2, 5),
        half_known(30, 10, 8),
        &[(BASE_STATION_ID, BASE, true), (RELAY_ID, GridPoint::new(2, 4), true)],
    );

    controller.take_step(&mut explorer, 3);
    assert!(explorer.mission_complete());
    assert_eq!(explorer.state(), AgentState::ReturnToBase);
    assert_eq!(explorer.current_goal(), BASE);

    let events = explorer.take_uncommitted_events();
    assert!(events.iter().any(|e| matches!(
        e,
        ExplorationEvent::MissionCompleted { reason: CompletionReason::CompletionPercentageReached, .. }
    )));
    assert!(!events.iter().any(|e| matches!(e, ExplorationEvent::FrontierChosen { .. })));
}

#[test]
fn test_explorer_gives_up_after_recomputations_without_new_knowledge() {
    let mut controller = controller(init_noop_logger());
    let mut explorer = agent(
        Role::Explorer,
        GridPoint::new(2, 5),
        half_known(30, 10, 8),
        &[(BASE_STATION_ID, BASE, true), (RELAY_ID, GridPoint::new(2, 4), true)],
    );

    // the first recomputation learns the map, the next four learn nothing
    for tick in 3..8 {
        explorer.invalidate_frontiers();
        controller.replan_explorer(&mut explorer, tick);
        assert!(!explorer.mission_complete());
    }
    assert_eq!(explorer.stats().stale_frontier_recomputations, 4);

    explorer.invalidate_frontiers();
    controller.replan_explorer(&mut explorer, 8);
    assert_eq!(explorer.stats().stale_frontier_recomputations, 5);
    assert!(explorer.mission_complete());
    assert_eq!(explorer.state(), AgentState::ReturnToBase);

    let events = explorer.take_uncommitted_events();
    let recomputations = events
        .iter()
        .filter(|e| matches!(e, ExplorationEvent::FrontiersRecomputed { count: 1, .. }))
        .count();
    assert_eq!(recomputations, 6);
    assert!(events.iter().any(|e| matches!(
        e,
        ExplorationEvent::MissionCompleted { reason: CompletionReason::NoNewKnowledge, tick: 8, .. }
    )));
}

#[test]
fn test_new_knowledge_resets_the_watchdog() {
    let mut controller = controller(init_noop_logger());
    let mut explorer = agent(
        Role::Explorer,
        GridPoint::new(2, 5),
        half_known(30, 10, 8),
        &[(BASE_STATION_ID, BASE, true), (RELAY_ID, GridPoint::new(2, 4), true)],
    );

    for tick in 3..7 {
        explorer.invalidate_frontiers();
        controller.replan_explorer(&mut explorer, tick);
    }
    assert_eq!(explorer.stats().stale_frontier_recomputations, 3);

    for y in 0..10 {
        explorer.grid_mut().set_free_space(8, y);
    }
    explorer.invalidate_frontiers();
    controller.replan_explorer(&mut explorer, 7);
    assert_eq!(explorer.stats().stale_frontier_recomputations, 0);
    assert!(!explorer.mission_complete());
}
