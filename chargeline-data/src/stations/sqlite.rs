//! SQLite persistence for imported charging stations.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use chargeline_core::StationRecord;
use rusqlite::{Connection, Error as SqliteError, Transaction};
use thiserror::Error;

/// Errors raised when persisting stations to SQLite.
#[derive(Debug, Error)]
pub enum PersistStationsError {
    /// Failed to create the parent directory for the SQLite artefact.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin station persistence transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `stations` table failed.
    #[error("failed to create stations table")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A station identifier could not be represented as an SQLite integer.
    #[error("station id {station_id} exceeds SQLite i64 range")]
    StationIdOutOfRange {
        /// Identifier that failed the conversion.
        station_id: u64,
    },
    /// Preparing the insert statement failed.
    #[error("failed to prepare station insert statement")]
    PrepareInsert {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a station row failed.
    #[error("failed to persist station {station_id}")]
    PersistRow {
        /// Identifier of the station being persisted.
        station_id: u64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit station persistence transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Persist charging stations to a SQLite database on disk.
///
/// Rows are replaced when identifiers already exist, so re-importing a
/// dataset is idempotent. Parent directories are created automatically and
/// the `stations` table is initialised if missing.
///
/// # Errors
///
/// Returns [`PersistStationsError`] describing the step that failed. Nothing
/// is committed unless every row is written.
pub fn persist_stations_to_sqlite(
    path: &Utf8Path,
    stations: &[StationRecord],
) -> Result<(), PersistStationsError> {
    ensure_parent_dir(path)?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| PersistStationsError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let transaction = connection
        .transaction()
        .map_err(|source| PersistStationsError::BeginTransaction { source })?;

    create_schema(&transaction)?;
    persist_rows(&transaction, stations)?;

    transaction
        .commit()
        .map_err(|source| PersistStationsError::Commit { source })
}

/// Create the parent directory of `path` when it does not exist yet.
fn ensure_parent_dir(path: &Utf8Path) -> Result<(), PersistStationsError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let create_error = |source| PersistStationsError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    };
    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };
    fs_utf8::Dir::open_ambient_dir(base, ambient_authority())
        .and_then(|dir| dir.create_dir_all(relative))
        .map_err(create_error)
}

fn create_schema(transaction: &Transaction<'_>) -> Result<(), PersistStationsError> {
    transaction
        .execute(
            "CREATE TABLE IF NOT EXISTS stations (
                id INTEGER PRIMARY KEY,
                name TEXT,
                lon REAL NOT NULL,
                lat REAL NOT NULL,
                fast_chargers INTEGER NOT NULL,
                max_power_kw REAL,
                facility_type TEXT,
                status TEXT NOT NULL
            )",
            [],
        )
        .map(|_| ())
        .map_err(|source| PersistStationsError::CreateSchema { source })
}

fn persist_rows(
    transaction: &Transaction<'_>,
    stations: &[StationRecord],
) -> Result<(), PersistStationsError> {
    if stations.is_empty() {
        return Ok(());
    }

    let mut statement = transaction
        .prepare(
            "INSERT OR REPLACE INTO stations
                (id, name, lon, lat, fast_chargers, max_power_kw, facility_type, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(|source| PersistStationsError::PrepareInsert { source })?;

    for station in stations {
        let station_id = i64::try_from(station.id).map_err(|_| {
            PersistStationsError::StationIdOutOfRange {
                station_id: station.id,
            }
        })?;
        statement
            .execute((
                station_id,
                station.name.as_deref(),
                station.location.x,
                station.location.y,
                station.fast_charger_count,
                station.max_power_kw,
                station.facility_type.as_deref(),
                station.status.as_str(),
            ))
            .map_err(|source| PersistStationsError::PersistRow {
                station_id: station.id,
                source,
            })?;
    }

    Ok(())
}
