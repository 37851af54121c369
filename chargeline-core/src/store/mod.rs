//! Data access traits for charging stations.
//!
//! The [`StationStore`] trait is the engine's only view of the station
//! dataset. It exposes two capabilities: a bounding-box query every store must
//! answer, and a line-distance query that stores with a geodesic index can
//! override. Callers fall back to the bounding box when the line query is
//! unavailable.

use geo::{LineString, Rect};
use thiserror::Error;

use crate::StationRecord;

#[cfg(feature = "store-sqlite")]
mod spatial_index;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use spatial_index::{SpatialIndexError, SpatialIndexWriteError, write_spatial_index};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteStationStore, SqliteStationStoreError};

/// Errors from [`StationStore::stations_near_path`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationQueryError {
    /// The store cannot answer line-distance queries.
    #[error("station store does not support line-distance queries")]
    LineQueryUnsupported,
    /// The query was rejected, e.g. an empty path.
    #[error("invalid station query: {reason}")]
    InvalidQuery {
        /// Why the query was rejected.
        reason: String,
    },
    /// The backing store failed while answering.
    #[error("station store failed: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

/// Read-only access to the charging station dataset.
///
/// Coordinates use WGS84 with axis order (longitude, latitude) in degrees.
///
/// # Examples
///
/// ```rust
/// use geo::{Coord, Intersects, LineString, Rect};
/// use chargeline_core::{StationQueryError, StationRecord, StationStore};
///
/// struct ScanStore {
///     stations: Vec<StationRecord>,
/// }
///
/// impl StationStore for ScanStore {
///     fn stations_in_bbox(
///         &self,
///         bbox: &Rect<f64>,
///     ) -> Box<dyn Iterator<Item = StationRecord> + Send + '_> {
///         let bbox = *bbox;
///         Box::new(
///             self.stations
///                 .iter()
///                 .filter(move |s| bbox.intersects(&s.location))
///                 .cloned(),
///         )
///     }
/// }
///
/// let store = ScanStore {
///     stations: vec![StationRecord::new(1, Coord { x: 0.0, y: 0.0 }, 2)],
/// };
/// let bbox = Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 });
/// assert_eq!(store.stations_in_bbox(&bbox).count(), 1);
///
/// let path = LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]);
/// assert_eq!(
///     store.stations_near_path(&path, 1_000.0),
///     Err(StationQueryError::LineQueryUnsupported)
/// );
/// ```
pub trait StationStore {
    /// Return all stations inside the bounding box, boundary included.
    ///
    /// The rectangle is axis-aligned in lon/lat space. Regions crossing the
    /// antimeridian must be split by the caller.
    fn stations_in_bbox(
        &self,
        bbox: &Rect<f64>,
    ) -> Box<dyn Iterator<Item = StationRecord> + Send + '_>;

    /// Return stations within `max_distance_meters` geodesic distance of
    /// `path`.
    ///
    /// The default implementation reports
    /// [`StationQueryError::LineQueryUnsupported`].
    ///
    /// # Errors
    ///
    /// Implementations return [`StationQueryError`] when the query cannot be
    /// answered; callers are expected to degrade to
    /// [`StationStore::stations_in_bbox`].
    fn stations_near_path(
        &self,
        path: &LineString<f64>,
        max_distance_meters: f64,
    ) -> Result<Vec<StationRecord>, StationQueryError> {
        let _ = (path, max_distance_meters);
        Err(StationQueryError::LineQueryUnsupported)
    }
}

impl<T> StationStore for &T
where
    T: StationStore + ?Sized,
{
    fn stations_in_bbox(
        &self,
        bbox: &Rect<f64>,
    ) -> Box<dyn Iterator<Item = StationRecord> + Send + '_> {
        (**self).stations_in_bbox(bbox)
    }

    fn stations_near_path(
        &self,
        path: &LineString<f64>,
        max_distance_meters: f64,
    ) -> Result<Vec<StationRecord>, StationQueryError> {
        (**self).stations_near_path(path, max_distance_meters)
    }
}
