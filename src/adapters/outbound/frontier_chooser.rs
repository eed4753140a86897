use crate::common::GridPoint;
use crate::domains::frontier::{Frontier, FrontierChoice, FrontierChooser, FrontierRequest};
use ordered_float::OrderedFloat;

/// Picks the frontier with the best size-per-distance ratio.
///
/// Frontiers are first ranked by straight-line distance; only the best
/// `max_candidates` get a planned path. Frontiers within `claim_radius` of a
/// teammate's goal are skipped unless nothing else is reachable.
#[derive(Debug, Clone)]
pub struct UtilityFrontierChooser {
    max_candidates: usize,
    claim_radius: f64,
}

impl Default for UtilityFrontierChooser {
    fn default() -> Self {
        Self::new(5, 10.0)
    }
}

impl UtilityFrontierChooser {
    pub fn new(max_candidates: usize, claim_radius: f64) -> Self {
        Self {
            max_candidates: max_candidates.max(1),
            claim_radius,
        }
    }

    fn is_claimed(&self, frontier: &Frontier, claimed: &[GridPoint]) -> bool {
        claimed
            .iter()
            .any(|goal| frontier.closest_point(*goal).distance(goal) <= self.claim_radius)
    }

    fn best_of<'f>(
        &self,
        request: &FrontierRequest<'_>,
        candidates: impl Iterator<Item = &'f Frontier>,
    ) -> Option<FrontierChoice> {
        let mut ranked: Vec<(&Frontier, f64)> = candidates
            .map(|f| {
                let estimate = f.size() as f64 / request.location.distance(&f.closest_point(request.location)).max(1.0);
                (f, estimate)
            })
            .collect();
        ranked.sort_by_key(|(_, estimate)| std::cmp::Reverse(OrderedFloat(*estimate)));

        ranked
            .into_iter()
            .take(self.max_candidates)
            .filter_map(|(frontier, _)| {
                let target = frontier.closest_point(request.location);
                let path = request.planner.calculate_path(request.grid, request.location, target);
                if !path.found() {
                    return None;
                }
                let utility = frontier.size() as f64 / path.length().max(1.0);
                Some(FrontierChoice {
                    frontier: frontier.with_utility(utility),
                    path,
                })
            })
            .max_by_key(|choice| OrderedFloat(choice.frontier.utility()))
    }
}

impl FrontierChooser for UtilityFrontierChooser {
    fn choose_frontier(&self, request: &FrontierRequest<'_>) -> Option<FrontierChoice> {
        let unclaimed = request
            .frontiers
            .iter()
            .filter(|f| !self.is_claimed(f, request.claimed_goals));
        self.best_of(request, unclaimed)
            .or_else(|| self.best_of(request, request.frontiers.iter()))
    }
}
