//! Facade crate for the Chargeline corridor charging engine.
//!
//! This crate re-exports the core domain types and exposes the SQLite station
//! store and the HTTP service adapters behind feature flags.

#![forbid(unsafe_code)]

pub use chargeline_core::{
    AutoWaypoint, CandidateRoute, CorridorScan, CorridorStation, DirectionsError,
    DirectionsProvider, DirectionsRoute, DistanceSource, Gap, GeocodeError, GeocodedPlace,
    Geocoder, Optimization, OptimizerConfig, PlanError, PlanRequest, PlanResponse, Planner,
    PlannerConfig, Projection, ResolvedStop, RouteComparator, RouteIndex, RouteIndexError,
    RouteMetrics, RouteOptimizer, RoutePreference, StationQueryError, StationRecord,
    StationStatus, StationStore, Stop, StopReason, WaypointCandidate, WaypointSearchConfig,
};

#[cfg(feature = "store-sqlite")]
pub use chargeline_core::{SqliteStationStore, SqliteStationStoreError, write_spatial_index};

#[cfg(feature = "http")]
pub use chargeline_data::geocoding::{HttpGeocoder, HttpGeocoderConfig};
#[cfg(feature = "http")]
pub use chargeline_data::routing::{HttpDirectionsProvider, HttpDirectionsProviderConfig};
#[cfg(feature = "http")]
pub use chargeline_data::{ProviderBuildError, load_stations_json, persist_stations_to_sqlite};
