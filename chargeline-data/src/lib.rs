//! Adapters between the Chargeline engine and the outside world.
//!
//! Responsibilities:
//! - Implement the engine's directions and geocoding traits over HTTP.
//! - Import station datasets and persist the SQLite and R\*-tree artefacts
//!   read by `chargeline_core::SqliteStationStore`.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `chargeline-core`).
//! - Block on async HTTP clients internally so the engine stays synchronous.
//!
//! Invariants:
//! - No global mutable state.

mod http;

pub mod geocoding;
pub mod routing;
pub mod stations;

pub use http::ProviderBuildError;
pub use stations::{
    PersistStationsError, StationImportError, load_stations_json, persist_stations_to_sqlite,
};
