//! Load station exports encoded as JSON arrays.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use chargeline_core::{StationRecord, StationStatus};
use geo::Coord;
use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while importing a station export.
#[derive(Debug, Error)]
pub enum StationImportError {
    /// The export could not be read.
    #[error("failed to read station export {path:?}")]
    Read {
        /// Path of the export.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The export is not a JSON array of station rows.
    #[error("failed to parse station export {path:?}")]
    Parse {
        /// Path of the export.
        path: Utf8PathBuf,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A row carried a coordinate outside WGS84 bounds.
    #[error("station {id} has invalid coordinate ({lon}, {lat})")]
    InvalidCoordinate {
        /// Identifier of the offending row.
        id: u64,
        /// Longitude as read.
        lon: f64,
        /// Latitude as read.
        lat: f64,
    },
    /// A row carried a status this engine does not recognise.
    #[error("station {id} has unknown status {status:?}")]
    UnknownStatus {
        /// Identifier of the offending row.
        id: u64,
        /// Status as read.
        status: String,
    },
}

#[derive(Debug, Deserialize)]
struct StationRow {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    lon: f64,
    lat: f64,
    #[serde(default)]
    fast_charger_count: u32,
    #[serde(default)]
    max_power_kw: Option<f64>,
    #[serde(default)]
    facility_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl StationRow {
    fn into_record(self) -> Result<StationRecord, StationImportError> {
        let valid = self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat);
        if !valid {
            return Err(StationImportError::InvalidCoordinate {
                id: self.id,
                lon: self.lon,
                lat: self.lat,
            });
        }
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => StationStatus::Available,
            Some(raw) => StationStatus::parse(&raw.to_ascii_lowercase()).ok_or_else(|| {
                StationImportError::UnknownStatus {
                    id: self.id,
                    status: raw.to_owned(),
                }
            })?,
        };
        Ok(StationRecord {
            id: self.id,
            name: self.name.filter(|name| !name.trim().is_empty()),
            location: Coord {
                x: self.lon,
                y: self.lat,
            },
            fast_charger_count: self.fast_charger_count,
            // Non-positive or non-finite power ratings are treated as unknown.
            max_power_kw: self.max_power_kw.filter(|kw| kw.is_finite() && *kw > 0.0),
            facility_type: self.facility_type.filter(|kind| !kind.trim().is_empty()),
            status,
        })
    }
}

/// Load stations from a JSON export at `path`.
///
/// The export is an array of objects with `id`, `lon` and `lat` plus the
/// optional `name`, `fast_charger_count`, `max_power_kw`, `facility_type`
/// and `status` fields. Rows sharing an identifier are collapsed, keeping the
/// last occurrence, and the result is ordered by identifier.
///
/// # Errors
///
/// Returns [`StationImportError`] when the file cannot be read or parsed, or
/// when a row fails validation.
pub fn load_stations_json(path: &Utf8Path) -> Result<Vec<StationRecord>, StationImportError> {
    let contents = read_export(path)?;
    let rows: Vec<StationRow> =
        serde_json::from_str(&contents).map_err(|source| StationImportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let row_count = rows.len();

    let mut stations = BTreeMap::new();
    for row in rows {
        let record = row.into_record()?;
        if let Some(previous) = stations.insert(record.id, record) {
            warn!(
                "duplicate station id {} in {path}; keeping the later row",
                previous.id
            );
        }
    }

    info!(
        "loaded {} stations from {row_count} rows in {path}",
        stations.len()
    );
    Ok(stations.into_values().collect())
}

fn read_export(path: &Utf8Path) -> Result<String, StationImportError> {
    let read_error = |source| StationImportError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no file name",
        ))
    })?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(file_name).map_err(read_error)
}
