use super::points::{find_rendezvous_points, rank_by_frontier_proximity, rank_by_utility};
use super::projections::RendezvousDisplayData;
use super::settings::RendezvousSettings;
use super::types::Rendezvous;
use crate::common::{DomainError, DomainResult, GridPoint};
use crate::domains::agent::{AgentState, ExplorationAgent, BASE_STATION_ID};
use crate::domains::logger::DynLogger;
use crate::domains::path::{Path, PathPlanner};
use crate::domains::topology::SkeletonService;
use std::sync::Arc;

/// Meeting-point selection plus the hooks the controller calls at protocol milestones.
///
/// One strategy instance serves one agent; the agent is passed into every call.
pub trait RendezvousStrategy: Send {
    fn calculate_rendezvous(&mut self, agent: &mut ExplorationAgent, tick: u32) -> DomainResult<Rendezvous>;

    /// Meeting between two relays. Not supported.
    fn calculate_rendezvous_relay_with_relay(
        &mut self,
        agent: &mut ExplorationAgent,
        tick: u32,
    ) -> DomainResult<Rendezvous>;

    fn process_explorer_starts_heading_to_rv(&mut self, agent: &mut ExplorationAgent);
    fn process_explorer_check_due_return_to_rv(&mut self, _agent: &mut ExplorationAgent) {}
    fn process_return_to_parent_replan(&mut self, _agent: &mut ExplorationAgent) {}
    fn process_go_to_child_replan(&mut self, _agent: &mut ExplorationAgent) -> Option<Path> {
        None
    }
    fn process_wait_for_parent(&mut self, agent: &ExplorationAgent) -> GridPoint {
        agent.location()
    }
    fn process_just_got_into_parent_range(&mut self, agent: &mut ExplorationAgent, tick: u32) -> DomainResult<()>;
    fn process_after_give_parent_info_explorer(&mut self, agent: &mut ExplorationAgent, tick: u32) -> DomainResult<()>;
    fn process_after_give_parent_info_relay(&mut self, agent: &mut ExplorationAgent, tick: u32);
    fn process_after_get_info_from_child(&mut self, _agent: &mut ExplorationAgent) {}
    fn process_wait_for_child(&mut self, agent: &ExplorationAgent) -> GridPoint {
        agent.location()
    }
    fn process_wait_for_child_timeout_no_backup(&mut self, agent: &ExplorationAgent) -> GridPoint {
        agent.location()
    }

    fn display_data(&self) -> &RendezvousDisplayData;
}

/// Picks one meeting point near the explorer's frontier from skeleton junctions,
/// endpoints and gap fillers.
pub struct SinglePointRendezvousStrategy {
    settings: RendezvousSettings,
    skeleton_service: Arc<dyn SkeletonService>,
    planner: Arc<dyn PathPlanner>,
    logger: DynLogger,
    display: RendezvousDisplayData,
}

impl SinglePointRendezvousStrategy {
    pub fn new(
        settings: RendezvousSettings,
        skeleton_service: Arc<dyn SkeletonService>,
        planner: Arc<dyn PathPlanner>,
        logger: DynLogger,
    ) -> Self {
        Self {
            settings,
            skeleton_service,
            planner,
            logger,
            display: RendezvousDisplayData::default(),
        }
    }

    pub fn settings(&self) -> &RendezvousSettings {
        &self.settings
    }

    /// Nominal travel speed used for every timing estimate.
    fn speed(&self) -> u32 {
        self.settings.default_speed.max(1)
    }

    fn path(&self, agent: &ExplorationAgent, from: GridPoint, to: GridPoint) -> Path {
        self.planner.calculate_path(agent.grid(), from, to)
    }

    /// Best meeting point for `agent`, or its own location when no candidate survives.
    pub fn calculate_rv_point(&mut self, agent: &ExplorationAgent) -> GridPoint {
        let skeleton = self.skeleton_service.skeletonize(agent.grid());
        let points = find_rendezvous_points(&skeleton, agent.grid(), &self.settings);

        let centre = agent
            .frontier()
            .map(|f| f.centroid())
            .unwrap_or_else(|| agent.location());

        self.display = RendezvousDisplayData {
            skeleton: skeleton.points(),
            rv_points: points.clone(),
            frontier_centre: Some(centre),
        };

        let near = rank_by_frontier_proximity(&points, centre, &self.settings);
        let planner = Arc::clone(&self.planner);
        let grid = agent.grid();
        let mut ranked = rank_by_utility(
            near,
            &skeleton,
            centre,
            self.settings.points_near_frontier_to_consider,
            |from, to| {
                let path = planner.calculate_path(grid, from, to);
                path.found().then(|| path.length())
            },
        );

        match ranked.pop() {
            Some(best) => best.point,
            None => {
                self.logger.debug(&format!(
                    "{}: no rendezvous candidate near {}, meeting at own location",
                    agent.name(),
                    centre
                ));
                agent.location()
            }
        }
    }

    /// Predicted meeting time with the parent, which first reports to base and then
    /// travels to the meeting point.
    fn calculate_parent_time_to_rv(&self, agent: &mut ExplorationAgent, tick: u32) -> DomainResult<()> {
        let Some(parent_rv) = agent.rendezvous_data().parent_rendezvous.clone() else {
            return Ok(());
        };
        let base = agent.base_station()?;
        let (base_location, base_range) = (base.location(), base.comm_range());
        let parent = agent.parent_teammate()?;
        let (parent_location, parent_range) = (parent.location(), parent.comm_range());

        let parent_to_base = self.path(agent, parent_location, base_location);
        let base_to_rv = self.path(agent, base_location, parent_rv.parent_location());

        let base_to_rv_length =
            if base_to_rv.length() == 0.0 && parent_rv.parent_location() != base_location {
                // no route known yet; the parent's own trip home is a better guess than zero
                parent_to_base.length()
            } else {
                base_to_rv.length()
            };

        let mut total = parent_to_base.length() + base_to_rv_length;
        if self.settings.use_simple_circle_comm_model_for_base_range {
            total -= 2.0 * parent_range.min(base_range);
        }

        let speed = self.speed() as f64;
        let mut time_until = (total.max(0.0) / speed).ceil() as u32;

        if self.settings.give_explorer_min_time_near_frontier {
            let frontier_location = agent
                .frontier()
                .map(|f| f.centroid())
                .unwrap_or_else(|| agent.location());
            let here_to_frontier = self.path(agent, agent.location(), frontier_location);
            let frontier_to_rv = self.path(agent, frontier_location, parent_rv.child_location());
            let explorer_time = ((here_to_frontier.length() + frontier_to_rv.length()) / speed) as u32
                + self.settings.frontier_min_explore_time;
            time_until = time_until.max(explorer_time);
        }

        let rvd = agent.rendezvous_data_mut();
        rvd.time_until_rendezvous = time_until;
        rvd.parent_rendezvous = Some(parent_rv.with_timing(
            tick.saturating_add(time_until),
            self.settings.wait_at_rv_before_replan,
        ));
        Ok(())
    }

    /// Backup meeting starts once the primary window has closed.
    fn calculate_parent_time_to_backup_rv(&self, agent: &mut ExplorationAgent) {
        let rvd = agent.rendezvous_data();
        let (Some(primary), Some(backup)) = (rvd.parent_rendezvous.clone(), rvd.parent_backup_rendezvous.clone())
        else {
            return;
        };
        let time_at_start = primary.deadline();

        let me_to_backup = self.path(agent, primary.child_location(), backup.child_location());
        let parent_to_backup = self.path(agent, primary.parent_location(), backup.parent_location());

        let timed = if me_to_backup.found() && parent_to_backup.found() {
            let travel = (me_to_backup.length() as u32).max(parent_to_backup.length() as u32) / self.speed();
            backup.with_timing(
                time_at_start.saturating_add(travel),
                self.settings.wait_at_rv_before_replan,
            )
        } else {
            backup.with_timing(self.settings.max_time, self.settings.max_time)
        };
        agent.rendezvous_data_mut().parent_backup_rendezvous = Some(timed);
    }
}

impl RendezvousStrategy for SinglePointRendezvousStrategy {
    fn calculate_rendezvous(&mut self, agent: &mut ExplorationAgent, tick: u32) -> DomainResult<Rendezvous> {
        agent.rendezvous_data_mut().time_since_last_rv_calc = 0;
        let rendezvous = Rendezvous::at(self.calculate_rv_point(agent));
        agent.rendezvous_data_mut().parent_rendezvous = Some(rendezvous.clone());

        self.calculate_parent_time_to_rv(agent, tick)?;
        self.calculate_parent_time_to_backup_rv(agent);

        let timed = agent
            .rendezvous_data()
            .parent_rendezvous
            .clone()
            .unwrap_or(rendezvous);
        self.logger.info(&format!(
            "{}: rendezvous at {} (meeting tick {})",
            agent.name(),
            timed.child_location(),
            timed.time_meeting()
        ));
        agent.rendezvous_calculated(timed.clone(), tick);
        Ok(timed)
    }

    fn calculate_rendezvous_relay_with_relay(
        &mut self,
        agent: &mut ExplorationAgent,
        _tick: u32,
    ) -> DomainResult<Rendezvous> {
        self.logger.warn(&format!(
            "{}: relay-to-relay rendezvous requested but not supported",
            agent.name()
        ));
        Err(DomainError::NotYetImplemented {
            operation: "relay-to-relay rendezvous".to_string(),
        })
    }

    fn process_explorer_starts_heading_to_rv(&mut self, agent: &mut ExplorationAgent) {
        if !self.settings.use_improved_rendezvous {
            // the next meeting happens where the explorer turned back
            let here = agent.location();
            agent.rendezvous_data_mut().child_rendezvous = Some(Rendezvous::at(here));
        }
    }

    fn process_just_got_into_parent_range(&mut self, agent: &mut ExplorationAgent, tick: u32) -> DomainResult<()> {
        if agent.is_explorer() {
            if self.settings.use_improved_rendezvous {
                self.calculate_rendezvous(agent, tick)?;
            } else {
                let goal = agent.current_goal();
                let rvd_update = goal.distance(&agent.location()) > self.settings.near_goal_threshold;
                let rvd = agent.rendezvous_data_mut();
                if rvd_update {
                    rvd.child_rendezvous = Some(Rendezvous::at(goal));
                }
                rvd.parent_rendezvous = rvd.child_rendezvous.clone();
            }
        } else if agent.parent_id() != BASE_STATION_ID {
            self.calculate_rendezvous_relay_with_relay(agent, tick)?;
        }
        Ok(())
    }

    fn process_after_give_parent_info_explorer(&mut self, agent: &mut ExplorationAgent, tick: u32) -> DomainResult<()> {
        self.calculate_parent_time_to_rv(agent, tick)?;
        self.calculate_parent_time_to_backup_rv(agent);
        Ok(())
    }

    fn process_after_give_parent_info_relay(&mut self, agent: &mut ExplorationAgent, tick: u32) {
        if !self.settings.attempt_exploration_by_relay {
            return;
        }
        let Some(child_rv) = agent.rendezvous_data().child_rendezvous.clone() else {
            return;
        };
        let path = self.path(agent, agent.location(), child_rv.parent_location());
        let arrival = path.length() / self.speed() as f64 + tick as f64;
        let latest = child_rv.time_meeting() as f64 - self.settings.relay_exploration_slack as f64;
        if arrival <= latest {
            agent.change_state(AgentState::Explore, tick);
        }
    }

    fn display_data(&self) -> &RendezvousDisplayData {
        &self.display
    }
}
