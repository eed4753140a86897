//! Per-tick decision loop for explorers and relays in a leader-follower team.
//!
//! Every tick yields a step: branches that cannot produce one fall through to a
//! bounded random step.

use super::random_walk::RandomWalk;
use super::settings::ExplorationSettings;
use crate::common::GridPoint;
use crate::domains::agent::{
    AgentState, CompletionReason, ExplorationAgent, RandomStepReason, Role,
};
use crate::domains::frontier::{calculate_frontiers, ContourTracer, FrontierChooser, FrontierRequest};
use crate::domains::logger::DynLogger;
use crate::domains::path::PathPlanner;
use crate::domains::rendezvous::RendezvousStrategy;
use std::sync::Arc;

pub struct ExplorationController {
    settings: ExplorationSettings,
    tracer: ContourTracer,
    chooser: Arc<dyn FrontierChooser>,
    planner: Arc<dyn PathPlanner>,
    strategy: Box<dyn RendezvousStrategy>,
    walk: RandomWalk,
    logger: DynLogger,
    parent_link_up: bool,
}

impl ExplorationController {
    pub fn new(
        settings: ExplorationSettings,
        chooser: Arc<dyn FrontierChooser>,
        planner: Arc<dyn PathPlanner>,
        strategy: Box<dyn RendezvousStrategy>,
        seed: u64,
        logger: DynLogger,
    ) -> Self {
        let walk = RandomWalk::new(seed, settings.random_step_attempts);
        Self {
            tracer: ContourTracer::new(Arc::clone(&logger)),
            settings,
            chooser,
            planner,
            strategy,
            walk,
            logger,
            parent_link_up: false,
        }
    }

    pub fn settings(&self) -> &ExplorationSettings {
        &self.settings
    }

    pub fn strategy(&self) -> &dyn RendezvousStrategy {
        self.strategy.as_ref()
    }

    pub fn take_step(&mut self, agent: &mut ExplorationAgent, tick: u32) -> GridPoint {
        if agent.env_error() {
            self.logger.info(&format!(
                "{}: environment reports error, taking random step",
                agent.name()
            ));
            let step = self.random_step(agent, RandomStepReason::EnvironmentError, tick);
            agent.set_env_error(false);
            agent.stats_mut().time_since_last_plan = 0;
            return step;
        }

        let step = match agent.role() {
            Role::Explorer => self.take_step_explorer(agent, tick),
            Role::Relay => self.take_step_relay(agent, tick),
            Role::BaseStation | Role::RelayStation => Some(agent.location()),
        };

        match step {
            Some(step) => step,
            None => self.random_step(agent, RandomStepReason::Fallback, tick),
        }
    }

    pub fn take_step_explorer(&mut self, agent: &mut ExplorationAgent, tick: u32) -> Option<GridPoint> {
        agent.stats_mut().increment_time_since_last_plan();

        let step = if tick < self.settings.startup_ticks {
            self.logger.debug(&format!("{}: starting up, taking random step", agent.name()));
            agent.stats_mut().time_since_last_plan = 0;
            Some(self.random_step(agent, RandomStepReason::Startup, tick))
        } else if agent.stats().time_since_last_plan >= self.settings.time_between_plans
            || agent.backtracking()
        {
            agent.stats_mut().time_since_last_plan = 0;
            self.replan_explorer(agent, tick)
        } else if agent.has_route_points() {
            agent.next_path_point()
        } else {
            agent.stats_mut().time_since_last_plan = 0;
            self.replan_explorer(agent, tick)
        };

        self.update_base_contact(agent);
        step
    }

    pub fn take_step_relay(&mut self, agent: &mut ExplorationAgent, tick: u32) -> Option<GridPoint> {
        agent.stats_mut().increment_time_since_last_plan();
        // relays only follow their child, so they are done from the start
        agent.complete_mission(CompletionReason::FollowingChild, tick);

        let step = if tick < self.settings.startup_ticks {
            agent.stats_mut().time_since_last_plan = 0;
            Some(agent.location())
        } else if !agent.parent_in_range() {
            agent.stats_mut().time_since_last_plan = 0;
            self.return_to_parent(agent, tick)
        } else if agent.backtracking() {
            agent.parent_link_restored(tick);
            self.logger.info(&format!("{}: parent link restored, heading to child", agent.name()));
            agent.stats_mut().time_since_last_plan = 0;
            self.route_to_child(agent, tick)
        } else if agent.stats().time_since_last_plan >= self.settings.time_between_plans {
            agent.stats_mut().time_since_last_plan = 0;
            self.replan_relay(agent, tick)
        } else if agent.has_route_points() {
            agent.next_path_point()
        } else {
            agent.stats_mut().time_since_last_plan = 0;
            self.replan_relay(agent, tick)
        };

        self.update_base_contact(agent);
        step
    }

    /// Follow the child while the parent stays comfortably in range, otherwise step back.
    pub fn replan_relay(&mut self, agent: &mut ExplorationAgent, tick: u32) -> Option<GridPoint> {
        let parent_location = agent.parent_teammate().ok()?.location();
        let slack = agent.comm_range() - agent.speed() as f64;
        if agent.location().distance(&parent_location) < slack {
            self.route_to_child(agent, tick)
        } else {
            Some(agent.previous_location())
        }
    }

    pub fn replan_explorer(&mut self, agent: &mut ExplorationAgent, tick: u32) -> Option<GridPoint> {
        if !agent.parent_in_range() {
            return self.explorer_lost_parent(agent, tick);
        }
        if agent.backtracking() {
            agent.parent_link_restored(tick);
        } else {
            agent.stats_mut().communication_failures = 0;
        }

        if agent.frontiers().is_empty() {
            let frontiers = calculate_frontiers(&self.tracer, agent.grid(), self.settings.min_frontier_size);
            let known = agent.grid().percentage_known();
            let stats = agent.stats_mut();
            if known <= stats.last_percentage_known {
                stats.stale_frontier_recomputations += 1;
            } else {
                stats.stale_frontier_recomputations = 0;
            }
            stats.last_percentage_known = known;
            agent.frontiers_recomputed(frontiers, tick);
        }

        let known = agent.stats().last_percentage_known;
        if agent.frontiers().is_empty() {
            self.logger.info(&format!("{}: no frontiers found, returning home", agent.name()));
            return self.return_to_base(agent, CompletionReason::NoFrontiers, tick);
        }
        if known >= self.settings.completion_percentage {
            return self.return_to_base(agent, CompletionReason::CompletionPercentageReached, tick);
        }
        if agent.stats().stale_frontier_recomputations >= self.settings.watchdog_limit {
            self.logger.warn(&format!(
                "{}: {} frontier recomputations without new knowledge, returning home",
                agent.name(),
                agent.stats().stale_frontier_recomputations
            ));
            return self.return_to_base(agent, CompletionReason::NoNewKnowledge, tick);
        }

        let claimed_goals: Vec<GridPoint> = agent
            .teammates()
            .values()
            .filter_map(|mate| mate.goal())
            .collect();
        let choice = self.chooser.choose_frontier(&FrontierRequest {
            location: agent.location(),
            frontiers: agent.frontiers(),
            claimed_goals: &claimed_goals,
            grid: agent.grid(),
            planner: self.planner.as_ref(),
        });

        let Some(choice) = choice else {
            self.logger.debug(&format!("{}: no frontier chosen, taking random step", agent.name()));
            return Some(self.random_step(agent, RandomStepReason::NoFrontierChosen, tick));
        };
        if !choice.path.found() || choice.path.points().is_empty() {
            self.logger.debug(&format!("{}: no path to frontier, taking random step", agent.name()));
            return Some(self.random_step(agent, RandomStepReason::NoPathFound, tick));
        }

        self.logger.debug(&format!(
            "{}: chose frontier at {} ({} cells)",
            agent.name(),
            choice.frontier.centroid(),
            choice.frontier.size()
        ));
        agent.adopt_frontier(choice, tick);
        self.refresh_rendezvous(agent, tick);
        agent.next_path_point()
    }

    /// Parent link down: count the failure, and past the threshold give up the
    /// frontier and head for the parent's last known location.
    fn explorer_lost_parent(&mut self, agent: &mut ExplorationAgent, tick: u32) -> Option<GridPoint> {
        let failures = agent.stats().communication_failures + 1;
        agent.stats_mut().communication_failures = failures;
        if failures <= self.settings.comm_failure_threshold {
            return agent.next_path_point();
        }

        if !agent.backtracking() {
            self.logger.info(&format!(
                "{}: parent out of range for {} replans, heading back",
                agent.name(),
                failures
            ));
            agent.drop_frontier(tick);
            agent.parent_link_lost(failures, tick);
            self.strategy.process_explorer_starts_heading_to_rv(agent);
        }

        let target = agent.parent_teammate().ok()?.location();
        self.route_to(agent, target)
    }

    fn return_to_parent(&mut self, agent: &mut ExplorationAgent, tick: u32) -> Option<GridPoint> {
        if !agent.backtracking() {
            let failures = agent.stats().communication_failures + 1;
            self.logger.info(&format!("{}: parent link lost, backtracking", agent.name()));
            agent.parent_link_lost(failures, tick);
            self.strategy.process_return_to_parent_replan(agent);
        }
        let target = agent.parent_teammate().ok()?.location();
        self.route_to(agent, target)
            .or_else(|| Some(agent.previous_location()))
    }

    fn route_to_child(&mut self, agent: &mut ExplorationAgent, tick: u32) -> Option<GridPoint> {
        let path = match self.strategy.process_go_to_child_replan(agent) {
            Some(path) => path,
            None => {
                let child = agent.child_teammate().ok()?.location();
                self.planner.calculate_path(agent.grid(), agent.location(), child)
            }
        };
        if !path.found() {
            return None;
        }
        agent.set_route(&path);
        agent.change_state(AgentState::GoToChild, tick);
        agent.next_path_point().or_else(|| Some(agent.location()))
    }

    fn return_to_base(
        &mut self,
        agent: &mut ExplorationAgent,
        reason: CompletionReason,
        tick: u32,
    ) -> Option<GridPoint> {
        agent.complete_mission(reason, tick);
        agent.change_state(AgentState::ReturnToBase, tick);
        let base = agent.base_station().ok()?.location();
        self.route_to(agent, base)
    }

    /// Plan to `target` unless the current route already leads there.
    fn route_to(&mut self, agent: &mut ExplorationAgent, target: GridPoint) -> Option<GridPoint> {
        if agent.location() == target {
            return Some(target);
        }
        if agent.current_goal() != target || !agent.has_route_points() {
            let path = self.planner.calculate_path(agent.grid(), agent.location(), target);
            if !path.found() {
                return None;
            }
            agent.set_route(&path);
        }
        agent.next_path_point()
    }

    fn refresh_rendezvous(&mut self, agent: &mut ExplorationAgent, tick: u32) {
        let due = agent.rendezvous_data().parent_rendezvous.is_none()
            || agent.rendezvous_data().time_since_last_rv_calc >= self.settings.time_between_plans;
        if !due {
            return;
        }
        if let Err(e) = self.strategy.calculate_rendezvous(agent, tick) {
            self.logger.warn(&format!("{}: rendezvous not updated: {}", agent.name(), e));
        }
    }

    /// Run the rendezvous hooks for the links established this tick.
    pub fn handle_communication(&mut self, agent: &mut ExplorationAgent, tick: u32) {
        let parent_up = agent.parent_in_range();
        if parent_up && !self.parent_link_up {
            if let Err(e) = self.strategy.process_just_got_into_parent_range(agent, tick) {
                self.logger.warn(&format!("{}: {}", agent.name(), e));
            }
            match agent.role() {
                Role::Explorer => {
                    if let Err(e) = self.strategy.process_after_give_parent_info_explorer(agent, tick) {
                        self.logger.warn(&format!("{}: {}", agent.name(), e));
                    }
                }
                Role::Relay => self.strategy.process_after_give_parent_info_relay(agent, tick),
                Role::BaseStation | Role::RelayStation => {}
            }
        }
        if agent.child_teammate().map(|c| c.is_in_range()).unwrap_or(false) {
            self.strategy.process_after_get_info_from_child(agent);
        }
        self.parent_link_up = parent_up;
        agent.rendezvous_data_mut().tick();
    }

    fn update_base_contact(&self, agent: &mut ExplorationAgent) {
        let in_contact = agent.base_station().map(|b| b.is_in_range()).unwrap_or(false);
        let stats = agent.stats_mut();
        if in_contact {
            stats.time_last_direct_contact_cs = 0;
        } else {
            stats.increment_last_direct_contact_cs();
        }
    }

    fn random_step(&mut self, agent: &mut ExplorationAgent, reason: RandomStepReason, tick: u32) -> GridPoint {
        let bound = match reason {
            RandomStepReason::EnvironmentError => self.settings.env_error_step_bound,
            _ => self.settings.random_step_bound,
        };
        let step = self.walk.random_step(agent.grid(), agent.location(), bound);
        agent.random_step_taken(reason, step, tick);
        step
    }
}
