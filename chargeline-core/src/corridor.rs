//! Locate charging stations along a route corridor.
//!
//! A station belongs to the corridor when it offers usable fast charging and
//! its lateral distance from the route is within the corridor half-width. Each
//! surviving station is annotated with its along-route mile marker and the
//! distance to its neighbours (or to the route endpoints).

use crate::geometry::{PathGeometry, miles_to_meters, padded_bbox};
use crate::{RouteIndex, StationRecord, StationStore};

/// How the candidate station set was retrieved from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceSource {
    /// The store answered a true line-distance query.
    #[default]
    Geodesic,
    /// The store could not answer the line query; a padded bounding box was
    /// scanned instead.
    BoundingBoxFallback,
}

/// A station annotated with its position along a route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorridorStation {
    /// The underlying station record.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub station: StationRecord,
    /// Distance from the route, in miles.
    pub lateral_miles: f64,
    /// Distance from the route start to the station's projection, in miles.
    pub along_route_miles: f64,
    /// Distance back to the previous station, or to the start.
    pub miles_from_prev: f64,
    /// Distance on to the next station, or to the end.
    pub miles_to_next: f64,
}

/// Stations found along one route, sorted by `along_route_miles`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorridorScan {
    /// Corridor stations in route order.
    pub stations: Vec<CorridorStation>,
    /// Which store query produced the candidates.
    pub distance_source: DistanceSource,
}

impl CorridorScan {
    /// Identifiers of every station in the corridor.
    pub fn station_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.stations.iter().map(|entry| entry.station.id)
    }
}

/// Find usable fast-charging stations within `corridor_miles` of a route.
///
/// The store's line-distance query is tried first. When it fails the path's
/// bounding box, padded by the corridor width, is scanned instead and the
/// result reports [`DistanceSource::BoundingBoxFallback`]. Either way each
/// candidate is projected onto `index` and kept only when its lateral distance
/// is within the corridor.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use chargeline_core::{PathGeometry, RouteIndex, StationRecord, locate_corridor_stations};
/// use chargeline_core::test_support::MemoryStationStore;
///
/// let path: Vec<_> = (0..=10).map(|i| Coord { x: 0.0, y: f64::from(i) * 0.1 }).collect();
/// let path = PathGeometry::new(path, None);
/// let index = RouteIndex::from_geometry(&path)?;
/// let store = MemoryStationStore::with_stations([
///     StationRecord::new(1, Coord { x: 0.01, y: 0.5 }, 4),
/// ]);
///
/// let scan = locate_corridor_stations(&store, &path, &index, 5.0);
/// assert_eq!(scan.stations.len(), 1);
/// # Ok::<(), chargeline_core::RouteIndexError>(())
/// ```
pub fn locate_corridor_stations<S>(
    store: &S,
    path: &PathGeometry,
    index: &RouteIndex,
    corridor_miles: f64,
) -> CorridorScan
where
    S: StationStore + ?Sized,
{
    let (candidates, distance_source) = candidate_stations(store, path, corridor_miles);

    let mut stations: Vec<CorridorStation> = candidates
        .into_iter()
        .filter(StationRecord::has_fast_charging)
        .filter_map(|station| {
            let projection = index.project(station.location).ok()?;
            (projection.lateral_miles <= corridor_miles).then_some(CorridorStation {
                station,
                lateral_miles: projection.lateral_miles,
                along_route_miles: projection.along_route_miles,
                miles_from_prev: 0.0,
                miles_to_next: 0.0,
            })
        })
        .collect();

    stations.sort_by(|a, b| {
        a.along_route_miles
            .total_cmp(&b.along_route_miles)
            .then_with(|| a.station.id.cmp(&b.station.id))
    });
    annotate_neighbours(&mut stations, index.total_miles());

    CorridorScan {
        stations,
        distance_source,
    }
}

fn candidate_stations<S>(
    store: &S,
    path: &PathGeometry,
    corridor_miles: f64,
) -> (Vec<StationRecord>, DistanceSource)
where
    S: StationStore + ?Sized,
{
    match store.stations_near_path(&path.line_string(), miles_to_meters(corridor_miles)) {
        Ok(stations) => (stations, DistanceSource::Geodesic),
        Err(err) => {
            log::warn!("corridor line query failed ({err}); falling back to a bounding box scan");
            let stations = padded_bbox(&path.coordinates, corridor_miles)
                .map(|bbox| store.stations_in_bbox(&bbox).collect())
                .unwrap_or_default();
            (stations, DistanceSource::BoundingBoxFallback)
        }
    }
}

fn annotate_neighbours(stations: &mut [CorridorStation], total_miles: f64) {
    let markers: Vec<f64> = stations.iter().map(|s| s.along_route_miles).collect();
    for (position, station) in stations.iter_mut().enumerate() {
        let previous = position
            .checked_sub(1)
            .and_then(|p| markers.get(p))
            .copied()
            .unwrap_or(0.0);
        let next = markers.get(position + 1).copied().unwrap_or(total_miles);
        station.miles_from_prev = (station.along_route_miles - previous).max(0.0);
        station.miles_to_next = (next - station.along_route_miles).max(0.0);
    }
}
