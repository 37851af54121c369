//! Bounded greedy search for routes with better charging coverage.
//!
//! Starting from a base route, each round looks for stations near the largest
//! coverage gaps, asks the directions provider for a route through each one
//! and adopts the best result if it strictly improves on the current route.
//! The search is an explicit state machine so its bounds are visible:
//!
//! ```text
//! Base ──► Iterate { round: 1 } ──► … ──► Iterate { round: max } ──► Done
//!   └───────────────────────────────────────────────────────────────► Done
//! ```
//!
//! Provider calls are capped at `max_iterations × candidate_limit`, and no
//! adopted route is longer than the base route times the detour factor.

use std::collections::HashSet;

use crate::{
    AutoWaypoint, CandidateRoute, DirectionsError, DirectionsProvider, RouteComparator,
    StationStore, WaypointCandidate, WaypointSearchConfig, find_waypoint_candidates,
    insertion_index, largest_gaps,
};

/// Tunables for [`RouteOptimizer`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizerConfig {
    /// Corridor half-width, in miles.
    pub corridor_miles: f64,
    /// Largest accepted ratio of candidate distance to base distance.
    pub detour_factor: f64,
    /// Upper bound on improvement rounds.
    pub max_iterations: usize,
    /// Upper bound on candidates tried per round.
    pub candidate_limit: usize,
    /// Number of largest gaps searched per round.
    pub target_gap_count: usize,
    /// Safety margin subtracted from the vehicle range, in miles.
    pub reserve_miles: f64,
    /// Candidate search and scoring.
    pub waypoints: WaypointSearchConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            corridor_miles: 10.0,
            detour_factor: 1.25,
            max_iterations: 2,
            candidate_limit: 8,
            target_gap_count: 2,
            reserve_miles: 30.0,
            waypoints: WaypointSearchConfig::default(),
        }
    }
}

impl OptimizerConfig {
    /// Largest acceptable gap for a vehicle with `range_miles` of range.
    #[must_use]
    pub fn target_gap_miles(&self, range_miles: f64) -> f64 {
        (range_miles - self.reserve_miles).max(0.0)
    }

    /// Set the corridor half-width.
    #[must_use]
    pub const fn with_corridor_miles(mut self, corridor_miles: f64) -> Self {
        self.corridor_miles = corridor_miles;
        self
    }

    /// Set the detour factor.
    #[must_use]
    pub const fn with_detour_factor(mut self, detour_factor: f64) -> Self {
        self.detour_factor = detour_factor;
        self
    }

    /// Set the round cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the safety reserve.
    #[must_use]
    pub const fn with_reserve_miles(mut self, reserve_miles: f64) -> Self {
        self.reserve_miles = reserve_miles;
        self
    }
}

/// Why the optimiser stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopReason {
    /// The current route keeps every gap within the target.
    TargetMet,
    /// No station near the largest gaps qualified as a waypoint.
    NoCandidates,
    /// No candidate route ranked ahead of the current one.
    NoImprovement,
    /// The round cap was reached.
    IterationCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptimizerState {
    Base,
    Iterate { round: usize },
    Done(StopReason),
}

enum RoundOutcome {
    Improved(Box<CandidateRoute>),
    NoCandidates,
    NoImprovement,
}

/// Outcome of [`RouteOptimizer::optimize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Optimization {
    /// The best route found; the base route when nothing improved on it.
    pub route: CandidateRoute,
    /// Why the search ended.
    pub stop_reason: StopReason,
    /// Rounds that were started.
    pub rounds: usize,
    /// Candidate routes that were fully evaluated.
    pub evaluated_candidates: usize,
    /// Calls made to the directions provider.
    pub provider_calls: usize,
}

#[derive(Debug, Default)]
struct SearchStats {
    evaluated_candidates: usize,
    provider_calls: usize,
}

/// Greedy route optimiser over a station store and a directions provider.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use chargeline_core::{
///     CandidateRoute, DirectionsProvider, RouteOptimizer, StopReason,
/// };
/// use chargeline_core::test_support::{MemoryStationStore, StraightLineDirections};
///
/// let store = MemoryStationStore::default();
/// let directions = StraightLineDirections::default();
/// let via = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 2.0 }];
/// let route = directions.directions(&via, false)?.remove(0);
/// let base = CandidateRoute::evaluate(&store, route, via, Vec::new(), 10.0)?;
///
/// let optimizer = RouteOptimizer::new(&store, &directions);
/// let outcome = optimizer.optimize(base, 100.0)?;
/// assert_eq!(outcome.stop_reason, StopReason::NoCandidates);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RouteOptimizer<S, D>
where
    S: StationStore,
    D: DirectionsProvider,
{
    store: S,
    directions: D,
    config: OptimizerConfig,
}

impl<S, D> RouteOptimizer<S, D>
where
    S: StationStore,
    D: DirectionsProvider,
{
    /// Construct an optimiser using default configuration.
    pub fn new(store: S, directions: D) -> Self {
        Self::with_config(store, directions, OptimizerConfig::default())
    }

    /// Construct an optimiser with explicit configuration.
    pub const fn with_config(store: S, directions: D, config: OptimizerConfig) -> Self {
        Self {
            store,
            directions,
            config,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Improve `base` until its largest gap is within `target_gap_miles` or a
    /// stop condition is reached.
    ///
    /// # Errors
    ///
    /// Returns any [`DirectionsError`] other than
    /// [`DirectionsError::NoRoute`], which only discards the candidate that
    /// caused it.
    pub fn optimize(
        &self,
        base: CandidateRoute,
        target_gap_miles: f64,
    ) -> Result<Optimization, DirectionsError> {
        let comparator = RouteComparator::new(target_gap_miles);
        let detour_cap = base.route.distance_meters * self.config.detour_factor;
        let mut stats = SearchStats::default();
        let mut current = base;
        let mut rounds = 0;
        let mut state = OptimizerState::Base;

        let stop_reason = loop {
            state = match state {
                OptimizerState::Base => self.after_adoption(&comparator, &current, 0),
                OptimizerState::Iterate { round } => {
                    rounds = round;
                    match self.run_round(&current, &comparator, detour_cap, &mut stats)? {
                        RoundOutcome::Improved(next) => {
                            current = *next;
                            log::info!(
                                "round {round}: adopted route with max gap {:.1} mi and {} stations",
                                current.max_gap_miles,
                                current.station_count()
                            );
                            self.after_adoption(&comparator, &current, round)
                        }
                        RoundOutcome::NoCandidates => OptimizerState::Done(StopReason::NoCandidates),
                        RoundOutcome::NoImprovement => {
                            OptimizerState::Done(StopReason::NoImprovement)
                        }
                    }
                }
                OptimizerState::Done(reason) => break reason,
            };
        };

        log::info!(
            "optimisation stopped after {rounds} round(s): {stop_reason:?}; {} candidates evaluated",
            stats.evaluated_candidates
        );
        Ok(Optimization {
            route: current,
            stop_reason,
            rounds,
            evaluated_candidates: stats.evaluated_candidates,
            provider_calls: stats.provider_calls,
        })
    }

    fn after_adoption(
        &self,
        comparator: &RouteComparator,
        current: &CandidateRoute,
        completed_rounds: usize,
    ) -> OptimizerState {
        if comparator.meets_target(&current.metrics()) {
            OptimizerState::Done(StopReason::TargetMet)
        } else if completed_rounds >= self.config.max_iterations {
            OptimizerState::Done(StopReason::IterationCap)
        } else {
            OptimizerState::Iterate {
                round: completed_rounds + 1,
            }
        }
    }

    fn run_round(
        &self,
        current: &CandidateRoute,
        comparator: &RouteComparator,
        detour_cap: f64,
        stats: &mut SearchStats,
    ) -> Result<RoundOutcome, DirectionsError> {
        let gaps = largest_gaps(
            current.stations(),
            current.total_miles(),
            self.config.target_gap_count,
        );
        let excluded: HashSet<u64> = current
            .corridor
            .station_ids()
            .chain(current.auto_waypoints.iter().map(|w| w.station.id))
            .collect();
        let candidates = find_waypoint_candidates(
            &self.store,
            &current.index,
            &gaps,
            self.config.corridor_miles,
            &excluded,
            self.config.candidate_limit,
            &self.config.waypoints,
        );
        if candidates.is_empty() {
            return Ok(RoundOutcome::NoCandidates);
        }

        let mut best: Option<CandidateRoute> = None;
        for candidate in &candidates {
            let Some(evaluated) = self.try_candidate(current, candidate, detour_cap, stats)? else {
                continue;
            };
            let leads = best.as_ref().is_none_or(|leader| {
                comparator.improves(&evaluated.metrics(), &leader.metrics())
            });
            if leads {
                best = Some(evaluated);
            }
        }

        Ok(match best {
            Some(best) if comparator.improves(&best.metrics(), &current.metrics()) => {
                RoundOutcome::Improved(Box::new(best))
            }
            _ => RoundOutcome::NoImprovement,
        })
    }

    fn try_candidate(
        &self,
        current: &CandidateRoute,
        candidate: &WaypointCandidate,
        detour_cap: f64,
        stats: &mut SearchStats,
    ) -> Result<Option<CandidateRoute>, DirectionsError> {
        let station = &candidate.station;
        let Some(position) = insertion_index(
            &current.via,
            &current.index,
            candidate.gap.midpoint_miles,
            station.location,
        ) else {
            log::debug!("station {} duplicates an adjacent via point; skipping", station.id);
            return Ok(None);
        };
        let mut via = current.via.clone();
        via.insert(position, station.location);

        stats.provider_calls += 1;
        let route = match self.directions.directions(&via, false) {
            Ok(routes) => routes.into_iter().next(),
            Err(DirectionsError::NoRoute { message }) => {
                log::debug!("no route via station {}: {message}", station.id);
                None
            }
            Err(err) => return Err(err),
        };
        let Some(route) = route else {
            return Ok(None);
        };
        if route.distance_meters > detour_cap {
            log::debug!(
                "station {} rejected: {:.0} m exceeds detour cap of {detour_cap:.0} m",
                station.id,
                route.distance_meters
            );
            return Ok(None);
        }

        let mut auto_waypoints = current.auto_waypoints.clone();
        auto_waypoints.push(AutoWaypoint::from(candidate));
        match CandidateRoute::evaluate(
            &self.store,
            route,
            via,
            auto_waypoints,
            self.config.corridor_miles,
        ) {
            Ok(evaluated) => {
                stats.evaluated_candidates += 1;
                Ok(Some(evaluated))
            }
            Err(err) => {
                log::debug!("route via station {} is unusable: {err}", station.id);
                Ok(None)
            }
        }
    }
}
