//! Core engine for corridor charging-station matching.
//!
//! Routes from a directions provider are indexed by distance, charging
//! stations near the road are projected onto them, and the gaps between
//! stations are measured. The optimiser inserts stations as via points to
//! shrink the worst gap within a detour budget, and the planner ties it all
//! together for a single trip request.
//!
//! External services sit behind the [`StationStore`], [`DirectionsProvider`]
//! and [`Geocoder`] traits.

pub mod candidate;
pub mod compare;
pub mod corridor;
pub mod directions;
pub mod gaps;
pub mod geocode;
pub mod geometry;
pub mod optimizer;
pub mod planner;
pub mod route_index;
pub mod station;
pub mod store;
pub mod waypoints;

#[doc(hidden)]
pub mod test_support;

pub use candidate::{AutoWaypoint, CandidateRoute};
pub use compare::{RouteComparator, RouteMetrics};
pub use corridor::{CorridorScan, CorridorStation, DistanceSource, locate_corridor_stations};
pub use directions::{DirectionsError, DirectionsProvider, DirectionsRoute};
pub use gaps::{Gap, coverage_gaps, largest_gaps, max_gap_miles};
pub use geocode::{GeocodeError, GeocodedPlace, Geocoder};
pub use geometry::PathGeometry;
pub use optimizer::{Optimization, OptimizerConfig, RouteOptimizer, StopReason};
pub use planner::{
    PlanError, PlanRequest, PlanResponse, Planner, PlannerConfig, ResolvedStop, RoutePreference,
    Stop,
};
pub use route_index::{Projection, RouteIndex, RouteIndexError, RouteSegment};
pub use station::{StationRecord, StationStatus};
pub use store::{StationQueryError, StationStore};
pub use waypoints::{
    WaypointCandidate, WaypointSearchConfig, find_waypoint_candidates, insertion_index,
};

#[cfg(feature = "store-sqlite")]
pub use store::{
    SpatialIndexError, SpatialIndexWriteError, SqliteStationStore, SqliteStationStoreError,
    write_spatial_index,
};
