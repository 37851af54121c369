//! SQLite-backed store for persisted charging stations.
//!
//! Station rows live in `stations.db`; `stations.rstar` carries the same
//! records for the in-memory R\*-tree. Opening the store checks that every
//! indexed station still exists in the database.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use geo::{LineString, Rect};
use rstar::{AABB, RTree};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use thiserror::Error;

use crate::StationRecord;
use crate::geometry::{haversine_miles_to_path, meters_to_miles, padded_bbox};

use super::spatial_index::{SpatialIndexError, load_index_entries};
use super::{StationQueryError, StationStore};

/// SQLite limits bound parameters per statement to 999 by default. The store
/// chunks `IN` queries to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

/// Error raised when opening persisted station artefacts.
#[derive(Debug, Error)]
pub enum SqliteStationStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Loading or validating the persisted R\*-tree failed.
    #[error(transparent)]
    SpatialIndex(#[from] SpatialIndexError),
    /// The database did not contain a station referenced by the index.
    #[error("station {id} listed in the index is missing from the database")]
    MissingStation {
        /// Identifier of the missing station.
        id: u64,
    },
    /// Generic SQLite error when reading station rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Read-only station store backed by SQLite and a persisted R\*-tree.
///
/// Answers both dataset capabilities: bounding boxes through the tree, and
/// line-distance queries by narrowing with the padded path envelope before
/// measuring haversine distance to the closest point on the path.
pub struct SqliteStationStore {
    index: RTree<StationRecord>,
}

impl fmt::Debug for SqliteStationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStationStore")
            .field("entries", &self.index.size())
            .finish_non_exhaustive()
    }
}

impl SqliteStationStore {
    /// Open a store backed by the SQLite database and R\*-tree artefact.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStationStoreError`] when either artefact cannot be read
    /// or the index references stations absent from the database.
    pub fn open<P, Q>(database_path: P, index_path: Q) -> Result<Self, SqliteStationStoreError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let database_path = database_path.as_ref();
        let connection =
            Connection::open_with_flags(database_path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
                |source| SqliteStationStoreError::OpenDatabase {
                    path: database_path.to_path_buf(),
                    source,
                },
            )?;

        let entries = load_index_entries(index_path.as_ref())?;
        ensure_indexed_stations_exist(&connection, &entries)?;

        Ok(Self::from_stations(entries))
    }

    /// Build a store directly from station records.
    #[must_use]
    pub fn from_stations(stations: Vec<StationRecord>) -> Self {
        Self {
            index: RTree::bulk_load(stations),
        }
    }

    fn locate(&self, bbox: &Rect<f64>) -> Vec<StationRecord> {
        let envelope =
            AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
        let mut stations: Vec<_> = self
            .index
            .locate_in_envelope_intersecting(&envelope)
            .cloned()
            .collect();
        stations.sort_unstable_by_key(|station| station.id);
        stations
    }
}

impl StationStore for SqliteStationStore {
    fn stations_in_bbox(
        &self,
        bbox: &Rect<f64>,
    ) -> Box<dyn Iterator<Item = StationRecord> + Send + '_> {
        Box::new(self.locate(bbox).into_iter())
    }

    fn stations_near_path(
        &self,
        path: &LineString<f64>,
        max_distance_meters: f64,
    ) -> Result<Vec<StationRecord>, StationQueryError> {
        let limit_miles = meters_to_miles(max_distance_meters);
        let bbox = padded_bbox(&path.0, limit_miles).ok_or_else(|| {
            StationQueryError::InvalidQuery {
                reason: "path has no vertices".to_owned(),
            }
        })?;

        Ok(self
            .locate(&bbox)
            .into_iter()
            .filter(|station| {
                haversine_miles_to_path(path, station.location)
                    .is_some_and(|miles| miles <= limit_miles)
            })
            .collect())
    }
}

fn ensure_indexed_stations_exist(
    connection: &Connection,
    entries: &[StationRecord],
) -> Result<(), SqliteStationStoreError> {
    let mut ids: Vec<u64> = entries.iter().map(|entry| entry.id).collect();
    ids.sort_unstable();
    ids.dedup();

    for chunk in ids.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
        let found = load_station_ids(connection, chunk)?;
        if let Some(missing) = chunk.iter().find(|id| found.binary_search(id).is_err()) {
            return Err(SqliteStationStoreError::MissingStation { id: *missing });
        }
    }

    Ok(())
}

fn load_station_ids(
    connection: &Connection,
    ids: &[u64],
) -> Result<Vec<u64>, SqliteStationStoreError> {
    let placeholders = vec!["?"; ids.len()].join(", ");
    let query = format!("SELECT id FROM stations WHERE id IN ({placeholders})");
    let mut statement = connection.prepare(&query)?;
    let mut found = statement
        .query_map(params_from_iter(ids.iter()), |row| row.get::<_, u64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    found.sort_unstable();
    Ok(found)
}
