//! On-disk format for the station R\*-tree artefact (`stations.rstar`).
//!
//! Layout: the `CLSI` tag, a little-endian `u16` format version, then a
//! `bincode` sequence of [`StationRecord`] entries. Station ids are unique
//! within one artefact and every location is finite, so the tree can be
//! bulk-loaded at open time without further checks.

use std::{
    collections::HashSet,
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
};

use bincode::{deserialize_from, serialize_into};
use serde::Serialize;
use thiserror::Error;

use crate::StationRecord;

pub(crate) const SPATIAL_INDEX_MAGIC: [u8; 4] = *b"CLSI";

pub(crate) const SPATIAL_INDEX_VERSION: u16 = 1;

/// Borrowed view written to disk; the loader reads the header by hand.
#[derive(Serialize)]
struct IndexPayload<'a> {
    magic: [u8; 4],
    version: u16,
    entries: &'a [StationRecord],
}

/// Failure to load a `stations.rstar` artefact.
#[derive(Debug, Error)]
pub enum SpatialIndexError {
    /// Opening or reading the artefact failed.
    #[error("failed to read station index {path}: {source}")]
    Io {
        /// Artefact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file ended before the six header bytes.
    #[error("station index {path} is shorter than its header")]
    TruncatedHeader {
        /// Artefact path.
        path: PathBuf,
    },
    /// The file is not a station index.
    #[error("invalid station index tag: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        /// `CLSI`.
        expected: [u8; 4],
        /// The first four bytes of the file.
        found: [u8; 4],
    },
    /// The artefact was written by an incompatible build.
    #[error("unsupported station index version {found}; supported version is {supported}")]
    UnsupportedVersion {
        /// Version in the header.
        found: u16,
        /// Version this build reads.
        supported: u16,
    },
    /// The station entries could not be decoded, usually because the file
    /// was cut short.
    #[error("failed to decode station entries from {path}: {source}")]
    Decode {
        /// Artefact path.
        path: PathBuf,
        /// `bincode` failure.
        #[source]
        source: bincode::Error,
    },
    /// Two entries share a station id.
    #[error("station index {path} lists station {station_id} more than once")]
    DuplicateStation {
        /// Artefact path.
        path: PathBuf,
        /// The repeated id.
        station_id: u64,
    },
}

/// Failure to write a `stations.rstar` artefact.
#[derive(Debug, Error)]
pub enum SpatialIndexWriteError {
    /// Creating, writing or syncing the file failed.
    #[error("failed to write station index {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The entries could not be encoded.
    #[error("failed to encode station index for {path}: {source}")]
    Encode {
        /// Destination path.
        path: PathBuf,
        /// `bincode` failure.
        #[source]
        source: bincode::Error,
    },
    /// A station has a non-finite coordinate and cannot be placed in the
    /// tree.
    #[error("station {station_id} has no finite location")]
    UnlocatedStation {
        /// Offending station.
        station_id: u64,
    },
    /// Two stations share an id.
    #[error("station {station_id} appears more than once")]
    DuplicateStation {
        /// The repeated id.
        station_id: u64,
    },
}

/// Write `stations` as a `stations.rstar` artefact, replacing any existing
/// file at `path`.
///
/// Nothing is written when the input is rejected.
///
/// # Errors
///
/// Returns [`SpatialIndexWriteError::DuplicateStation`] or
/// [`SpatialIndexWriteError::UnlocatedStation`] for invalid input, and the
/// I/O or encoding variants when the file cannot be produced.
pub fn write_spatial_index(
    path: &Path,
    stations: &[StationRecord],
) -> Result<(), SpatialIndexWriteError> {
    check_stations(stations)?;

    let io_error = |source| SpatialIndexWriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(io_error)?;
    let payload = IndexPayload {
        magic: SPATIAL_INDEX_MAGIC,
        version: SPATIAL_INDEX_VERSION,
        entries: stations,
    };
    serialize_into(&mut file, &payload).map_err(|source| SpatialIndexWriteError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(io_error)
}

fn check_stations(stations: &[StationRecord]) -> Result<(), SpatialIndexWriteError> {
    let mut seen = HashSet::with_capacity(stations.len());
    for station in stations {
        let location = station.location;
        if !(location.x.is_finite() && location.y.is_finite()) {
            return Err(SpatialIndexWriteError::UnlocatedStation {
                station_id: station.id,
            });
        }
        if !seen.insert(station.id) {
            return Err(SpatialIndexWriteError::DuplicateStation {
                station_id: station.id,
            });
        }
    }
    Ok(())
}

/// Read the station entries stored in the artefact at `path`.
pub(crate) fn load_index_entries(path: &Path) -> Result<Vec<StationRecord>, SpatialIndexError> {
    let mut file = File::open(path).map_err(|source| SpatialIndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_header(&mut file, path)?;

    let entries: Vec<StationRecord> =
        deserialize_from(&mut file).map_err(|source| SpatialIndexError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = HashSet::with_capacity(entries.len());
    if let Some(repeated) = entries.iter().find(|station| !seen.insert(station.id)) {
        return Err(SpatialIndexError::DuplicateStation {
            path: path.to_path_buf(),
            station_id: repeated.id,
        });
    }
    Ok(entries)
}

fn read_header(reader: &mut impl Read, path: &Path) -> Result<(), SpatialIndexError> {
    let mut header = [0_u8; 6];
    reader.read_exact(&mut header).map_err(|source| {
        if source.kind() == ErrorKind::UnexpectedEof {
            SpatialIndexError::TruncatedHeader {
                path: path.to_path_buf(),
            }
        } else {
            SpatialIndexError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let [m0, m1, m2, m3, v0, v1] = header;
    let magic = [m0, m1, m2, m3];
    if magic != SPATIAL_INDEX_MAGIC {
        return Err(SpatialIndexError::InvalidMagic {
            expected: SPATIAL_INDEX_MAGIC,
            found: magic,
        });
    }
    let version = u16::from_le_bytes([v0, v1]);
    if version != SPATIAL_INDEX_VERSION {
        return Err(SpatialIndexError::UnsupportedVersion {
            found: version,
            supported: SPATIAL_INDEX_VERSION,
        });
    }
    Ok(())
}
