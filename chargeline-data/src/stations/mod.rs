//! Station dataset import and persistence.
//!
//! Station exports arrive as JSON arrays and are written to the
//! `stations.db` and `stations.rstar` artefacts consumed by
//! `chargeline_core::SqliteStationStore`.

mod json;
mod sqlite;

pub use json::{StationImportError, load_stations_json};
pub use sqlite::{PersistStationsError, persist_stations_to_sqlite};
