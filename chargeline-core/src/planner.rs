//! Plan a trip end to end.
//!
//! The [`Planner`] resolves stops, asks the directions provider for a route
//! and annotates it with corridor stations. For charger-optimised requests it
//! ranks the provider's alternatives, or, when the provider refuses
//! alternatives, hands the single route to the [`RouteOptimizer`].

use geo::Coord;
use thiserror::Error;

use crate::{
    AutoWaypoint, CandidateRoute, CorridorStation, DirectionsError, DirectionsProvider,
    DirectionsRoute, DistanceSource, GeocodeError, Geocoder, OptimizerConfig, RouteComparator,
    RouteIndexError, RouteOptimizer, StationStore, StopReason,
};

/// How the planner chooses between routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoutePreference {
    /// Take the provider's preferred route as is.
    #[default]
    Fastest,
    /// Prefer routes whose charging gaps fit the vehicle range.
    ChargerOptimized,
}

/// A stop as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Stop {
    /// Free text resolved through the geocoder.
    Query(String),
    /// A literal position.
    Coordinate(Coord<f64>),
}

impl From<Coord<f64>> for Stop {
    fn from(value: Coord<f64>) -> Self {
        Self::Coordinate(value)
    }
}

impl From<&str> for Stop {
    fn from(value: &str) -> Self {
        Self::Query(value.to_owned())
    }
}

/// A stop after geocoding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedStop {
    /// Label chosen by the geocoder; `None` for literal coordinates.
    pub label: Option<String>,
    /// Resolved position.
    pub location: Coord<f64>,
}

/// A trip to plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRequest {
    /// Origin, intermediate stops and destination, in travel order.
    pub stops: Vec<Stop>,
    /// Requested routing preference.
    #[cfg_attr(feature = "serde", serde(default))]
    pub preference: RoutePreference,
    /// Distance the vehicle covers on a full charge, in miles.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vehicle_range_miles: Option<f64>,
}

impl PlanRequest {
    /// A fastest-route request through `stops`.
    pub fn new<I>(stops: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Stop>,
    {
        Self {
            stops: stops.into_iter().map(Into::into).collect(),
            preference: RoutePreference::Fastest,
            vehicle_range_miles: None,
        }
    }

    /// Ask for a charger-optimised route for a vehicle with `range_miles`.
    #[must_use]
    pub const fn charger_optimized(mut self, range_miles: f64) -> Self {
        self.preference = RoutePreference::ChargerOptimized;
        self.vehicle_range_miles = Some(range_miles);
        self
    }

    /// Set the preference without touching the range.
    #[must_use]
    pub const fn with_preference(mut self, preference: RoutePreference) -> Self {
        self.preference = preference;
        self
    }

    /// Set the vehicle range.
    #[must_use]
    pub const fn with_vehicle_range_miles(mut self, range_miles: f64) -> Self {
        self.vehicle_range_miles = Some(range_miles);
        self
    }
}

/// A planned route with its charging coverage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanResponse {
    /// Preference in the request.
    pub preference_requested: RoutePreference,
    /// Preference that produced this route.
    pub preference_used: RoutePreference,
    /// Trip length in metres.
    pub distance_meters: f64,
    /// Trip length in miles.
    pub distance_miles: f64,
    /// Expected driving time in seconds.
    pub duration_seconds: f64,
    /// Route polyline, `x = longitude` and `y = latitude`.
    pub geometry: Vec<Coord<f64>>,
    /// The caller's stops after geocoding.
    pub stops: Vec<ResolvedStop>,
    /// Corridor stations in route order.
    pub stations: Vec<CorridorStation>,
    /// Stations inserted as via points by the optimiser.
    pub auto_waypoints: Vec<AutoWaypoint>,
    /// Routes evaluated for coverage, including the one returned.
    pub evaluated_routes: usize,
    /// Longest uncovered stretch, in miles.
    pub max_gap_miles: f64,
    /// Largest acceptable gap; present when a vehicle range was given.
    pub target_gap_miles: Option<f64>,
    /// How station distances were measured.
    pub distance_source: DistanceSource,
    /// Why the optimiser stopped, when it ran.
    pub stop_reason: Option<StopReason>,
    /// Advice for the caller, such as an unmet coverage target.
    pub warning: Option<String>,
}

/// Errors from [`Planner::plan`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Fewer than two stops were given.
    #[error("a trip needs at least two stops, found {found}")]
    TooFewStops {
        /// Number of stops supplied.
        found: usize,
    },
    /// More stops were given than the planner accepts.
    #[error("a trip accepts at most {max} stops, found {found}")]
    TooManyStops {
        /// Number of stops supplied.
        found: usize,
        /// Configured limit.
        max: usize,
    },
    /// The geocoder found nothing for a stop.
    #[error("no location found for stop {query:?}")]
    StopNotFound {
        /// The unresolved query.
        query: String,
    },
    /// The geocoder failed.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    /// The directions provider failed.
    #[error(transparent)]
    Directions(#[from] DirectionsError),
    /// The provider returned a route that cannot be indexed.
    #[error("unusable route geometry: {0}")]
    Geometry(#[from] RouteIndexError),
}

/// Tunables for [`Planner`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Corridor, detour and search settings shared with the optimiser.
    pub optimizer: OptimizerConfig,
    /// Largest number of stops accepted per request.
    pub max_stops: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::default(),
            max_stops: 25,
        }
    }
}

struct Selection {
    route: CandidateRoute,
    evaluated_routes: usize,
    stop_reason: Option<StopReason>,
}

/// Trip planner over a station store, a directions provider and a geocoder.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use chargeline_core::{PlanRequest, Planner, RoutePreference, StationRecord, Stop};
/// use chargeline_core::test_support::{
///     MemoryStationStore, StraightLineDirections, StubGeocoder,
/// };
///
/// let store = MemoryStationStore::with_stations([
///     StationRecord::new(1, Coord { x: 0.0, y: 0.5 }, 4),
/// ]);
/// let geocoder = StubGeocoder::default().with_place("North", Coord { x: 0.0, y: 1.0 });
/// let planner = Planner::new(store, StraightLineDirections::default(), geocoder);
///
/// let request = PlanRequest::new([Stop::from("North"), Stop::from(Coord { x: 0.0, y: 0.0 })]);
/// let plan = planner.plan(&request)?;
/// assert_eq!(plan.preference_used, RoutePreference::Fastest);
/// assert_eq!(plan.stations.len(), 1);
/// # Ok::<(), chargeline_core::PlanError>(())
/// ```
pub struct Planner<S, D, G>
where
    S: StationStore,
    D: DirectionsProvider,
    G: Geocoder,
{
    store: S,
    directions: D,
    geocoder: G,
    config: PlannerConfig,
}

impl<S, D, G> Planner<S, D, G>
where
    S: StationStore,
    D: DirectionsProvider,
    G: Geocoder,
{
    /// Construct a planner using default configuration.
    pub fn new(store: S, directions: D, geocoder: G) -> Self {
        Self::with_config(store, directions, geocoder, PlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    pub const fn with_config(store: S, directions: D, geocoder: G, config: PlannerConfig) -> Self {
        Self {
            store,
            directions,
            geocoder,
            config,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan `request`.
    ///
    /// A charger-optimised request without a vehicle range is planned as
    /// fastest and says so in the warning.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the stop count is out of bounds, a stop
    /// cannot be resolved, the directions provider fails or its route has no
    /// usable geometry.
    pub fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, PlanError> {
        let found = request.stops.len();
        if found < 2 {
            return Err(PlanError::TooFewStops { found });
        }
        if found > self.config.max_stops {
            return Err(PlanError::TooManyStops {
                found,
                max: self.config.max_stops,
            });
        }

        let stops = request
            .stops
            .iter()
            .map(|stop| self.resolve(stop))
            .collect::<Result<Vec<_>, _>>()?;
        let via: Vec<Coord<f64>> = stops.iter().map(|stop| stop.location).collect();

        let target_gap_miles = request
            .vehicle_range_miles
            .map(|range| self.config.optimizer.target_gap_miles(range));
        let mut warnings = Vec::new();

        let (preference_used, selection) = match (request.preference, target_gap_miles) {
            (RoutePreference::ChargerOptimized, Some(target)) => (
                RoutePreference::ChargerOptimized,
                self.charger_optimized(via, target)?,
            ),
            (RoutePreference::ChargerOptimized, None) => {
                log::warn!("charger-optimised request without a vehicle range; planning fastest");
                warnings.push(
                    "charger-optimised routing needs a vehicle range; returned the fastest route"
                        .to_owned(),
                );
                (RoutePreference::Fastest, self.fastest(via)?)
            }
            (RoutePreference::Fastest, _) => (RoutePreference::Fastest, self.fastest(via)?),
        };

        let Selection {
            route: chosen,
            evaluated_routes,
            stop_reason,
        } = selection;
        if let Some(target) = target_gap_miles
            && chosen.max_gap_miles > target
        {
            warnings.push(format!(
                "longest charging gap is {:.0} mi, beyond the {:.0} mi target for this range",
                chosen.max_gap_miles, target
            ));
        }

        Ok(PlanResponse {
            preference_requested: request.preference,
            preference_used,
            distance_meters: chosen.route.distance_meters,
            distance_miles: chosen.route.distance_miles(),
            duration_seconds: chosen.route.duration_seconds,
            max_gap_miles: chosen.max_gap_miles,
            target_gap_miles,
            distance_source: chosen.corridor.distance_source,
            stations: chosen.corridor.stations,
            auto_waypoints: chosen.auto_waypoints,
            geometry: chosen.route.coordinates,
            stops,
            evaluated_routes,
            stop_reason,
            warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
        })
    }

    fn resolve(&self, stop: &Stop) -> Result<ResolvedStop, PlanError> {
        match stop {
            Stop::Coordinate(location) => Ok(ResolvedStop {
                label: None,
                location: *location,
            }),
            Stop::Query(query) => {
                let place = self
                    .geocoder
                    .geocode(query)?
                    .ok_or_else(|| PlanError::StopNotFound {
                        query: query.clone(),
                    })?;
                Ok(ResolvedStop {
                    label: Some(place.label),
                    location: place.location,
                })
            }
        }
    }

    fn evaluate(
        &self,
        route: DirectionsRoute,
        via: Vec<Coord<f64>>,
    ) -> Result<CandidateRoute, RouteIndexError> {
        CandidateRoute::evaluate(
            &self.store,
            route,
            via,
            Vec::new(),
            self.config.optimizer.corridor_miles,
        )
    }

    fn fastest(&self, via: Vec<Coord<f64>>) -> Result<Selection, PlanError> {
        let route = first_route(self.directions.directions(&via, false)?)?;
        Ok(Selection {
            route: self.evaluate(route, via)?,
            evaluated_routes: 1,
            stop_reason: None,
        })
    }

    fn charger_optimized(
        &self,
        via: Vec<Coord<f64>>,
        target_gap_miles: f64,
    ) -> Result<Selection, PlanError> {
        match self.directions.directions(&via, true) {
            Ok(routes) => self.best_alternative(routes, via, target_gap_miles),
            Err(DirectionsError::AlternativesUnsupported { message }) => {
                log::warn!("provider refused alternatives ({message}); optimising a single route");
                let route = first_route(self.directions.directions(&via, false)?)?;
                let base = self.evaluate(route, via)?;
                let optimizer = RouteOptimizer::with_config(
                    &self.store,
                    &self.directions,
                    self.config.optimizer.clone(),
                );
                let outcome = optimizer.optimize(base, target_gap_miles)?;
                Ok(Selection {
                    route: outcome.route,
                    evaluated_routes: 1 + outcome.evaluated_candidates,
                    stop_reason: Some(outcome.stop_reason),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn best_alternative(
        &self,
        routes: Vec<DirectionsRoute>,
        via: Vec<Coord<f64>>,
        target_gap_miles: f64,
    ) -> Result<Selection, PlanError> {
        let comparator = RouteComparator::new(target_gap_miles);
        let mut evaluated_routes = 0;
        let mut best: Option<CandidateRoute> = None;
        let mut unusable = None;
        for route in routes {
            let candidate = match self.evaluate(route, via.clone()) {
                Ok(candidate) => candidate,
                Err(err) => {
                    log::debug!("skipping alternative route: {err}");
                    unusable = Some(err);
                    continue;
                }
            };
            evaluated_routes += 1;
            let leads = best.as_ref().is_none_or(|leader| {
                comparator.improves(&candidate.metrics(), &leader.metrics())
            });
            if leads {
                best = Some(candidate);
            }
        }
        let route = match (best, unusable) {
            (Some(route), _) => route,
            (None, Some(err)) => return Err(err.into()),
            (None, None) => return Err(no_routes().into()),
        };
        log::debug!(
            "picked route with max gap {:.1} mi from {evaluated_routes} alternative(s)",
            route.max_gap_miles
        );
        Ok(Selection {
            route,
            evaluated_routes,
            stop_reason: None,
        })
    }
}

fn no_routes() -> DirectionsError {
    DirectionsError::NoRoute {
        message: "provider returned no routes".to_owned(),
    }
}

fn first_route(routes: Vec<DirectionsRoute>) -> Result<DirectionsRoute, DirectionsError> {
    routes.into_iter().next().ok_or_else(no_routes)
}
