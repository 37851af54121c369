//! In-memory doubles for the station store, directions provider and geocoder,
//! used by unit, doc and behaviour tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use geo::{Coord, Intersects, LineString, Rect};

use crate::geometry::{haversine_miles, haversine_miles_to_path, meters_to_miles, miles_to_meters};
use crate::{
    DirectionsError, DirectionsProvider, DirectionsRoute, GeocodeError, GeocodedPlace, Geocoder,
    StationQueryError, StationRecord, StationStore,
};

/// In-memory `StationStore` implementation used in tests.
///
/// The store performs a linear scan and is intended only for small datasets.
/// Line-distance queries are refused unless enabled with
/// [`MemoryStationStore::with_line_queries`].
#[derive(Default, Debug, Clone)]
pub struct MemoryStationStore {
    stations: Vec<StationRecord>,
    line_queries: bool,
}

impl MemoryStationStore {
    /// Create a store from a collection of stations.
    pub fn with_stations<I>(stations: I) -> Self
    where
        I: IntoIterator<Item = StationRecord>,
    {
        Self {
            stations: stations.into_iter().collect(),
            line_queries: false,
        }
    }

    /// Answer line-distance queries with a haversine scan.
    #[must_use]
    pub fn with_line_queries(mut self) -> Self {
        self.line_queries = true;
        self
    }
}

impl StationStore for MemoryStationStore {
    fn stations_in_bbox(
        &self,
        bbox: &Rect<f64>,
    ) -> Box<dyn Iterator<Item = StationRecord> + Send + '_> {
        let bbox = *bbox;
        Box::new(
            self.stations
                .iter()
                // `Intersects` treats boundary points as inside the rectangle.
                .filter(move |s| bbox.intersects(&s.location))
                .cloned(),
        )
    }

    fn stations_near_path(
        &self,
        path: &LineString<f64>,
        max_distance_meters: f64,
    ) -> Result<Vec<StationRecord>, StationQueryError> {
        if !self.line_queries {
            return Err(StationQueryError::LineQueryUnsupported);
        }
        let limit = meters_to_miles(max_distance_meters);
        Ok(self
            .stations
            .iter()
            .filter(|s| haversine_miles_to_path(path, s.location).is_some_and(|d| d <= limit))
            .cloned()
            .collect())
    }
}

/// Deterministic `DirectionsProvider` that drives in straight lines.
///
/// Each leg between consecutive waypoints is split into evenly spaced
/// vertices. The reported distance is the haversine length of the legs and
/// the duration assumes a constant speed. Calls are counted so tests can
/// check provider budgets.
#[derive(Debug)]
pub struct StraightLineDirections {
    speed_mph: f64,
    steps_per_leg: u32,
    alternative_via: Option<Coord<f64>>,
    degenerate_alternative: bool,
    reject_alternatives: bool,
    error: Option<DirectionsError>,
    calls: AtomicUsize,
}

impl Default for StraightLineDirections {
    fn default() -> Self {
        Self {
            speed_mph: 60.0,
            steps_per_leg: 10,
            alternative_via: None,
            degenerate_alternative: false,
            reject_alternatives: false,
            error: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl StraightLineDirections {
    /// Fail every request with `error`.
    #[must_use]
    pub fn with_error(mut self, error: DirectionsError) -> Self {
        self.error = Some(error);
        self
    }

    /// Answer requests for alternatives with
    /// [`DirectionsError::AlternativesUnsupported`].
    #[must_use]
    pub fn rejecting_alternatives(mut self) -> Self {
        self.reject_alternatives = true;
        self
    }

    /// When alternatives are requested, also return a route that passes
    /// through `via` before the destination.
    #[must_use]
    pub fn with_alternative_via(mut self, via: Coord<f64>) -> Self {
        self.alternative_via = Some(via);
        self
    }

    /// When alternatives are requested, also return a zero-length route
    /// parked on the destination.
    #[must_use]
    pub fn with_degenerate_alternative(mut self) -> Self {
        self.degenerate_alternative = true;
        self
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// The route this provider returns for `waypoints`.
    #[must_use]
    pub fn route_through(&self, waypoints: &[Coord<f64>]) -> DirectionsRoute {
        let mut coordinates = Vec::new();
        let mut miles = 0.0;
        for pair in waypoints.windows(2) {
            let [from, to] = pair else { continue };
            miles += haversine_miles(*from, *to);
            coordinates.extend((0..self.steps_per_leg).map(|step| {
                let t = f64::from(step) / f64::from(self.steps_per_leg);
                Coord {
                    x: from.x + t * (to.x - from.x),
                    y: from.y + t * (to.y - from.y),
                }
            }));
        }
        coordinates.extend(waypoints.last().copied());
        DirectionsRoute::new(
            coordinates,
            miles_to_meters(miles),
            miles / self.speed_mph * 3_600.0,
        )
    }
}

impl DirectionsProvider for StraightLineDirections {
    fn directions(
        &self,
        waypoints: &[Coord<f64>],
        alternatives: bool,
    ) -> Result<Vec<DirectionsRoute>, DirectionsError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if waypoints.len() < 2 {
            return Err(DirectionsError::TooFewWaypoints {
                found: waypoints.len(),
            });
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if alternatives && self.reject_alternatives {
            return Err(DirectionsError::AlternativesUnsupported {
                message: "alternatives are not available for this distance".to_owned(),
            });
        }

        let mut routes = vec![self.route_through(waypoints)];
        if let (true, Some(detour)) = (alternatives, self.alternative_via) {
            let mut via = waypoints.to_vec();
            via.insert(waypoints.len() - 1, detour);
            routes.push(self.route_through(&via));
        }
        if let (true, Some(spot)) = (alternatives && self.degenerate_alternative, waypoints.last())
        {
            routes.push(DirectionsRoute::new(vec![*spot, *spot], 0.0, 0.0));
        }
        Ok(routes)
    }
}

/// `Geocoder` backed by a fixed lookup table.
#[derive(Default, Debug, Clone)]
pub struct StubGeocoder {
    places: HashMap<String, GeocodedPlace>,
    error: Option<GeocodeError>,
}

impl StubGeocoder {
    /// Register `name` at `location`; lookups are case-insensitive.
    #[must_use]
    pub fn with_place(mut self, name: &str, location: Coord<f64>) -> Self {
        self.places.insert(
            name.trim().to_lowercase(),
            GeocodedPlace::new(name, location),
        );
        self
    }

    /// Fail every non-empty lookup with `error`.
    #[must_use]
    pub fn with_error(mut self, error: GeocodeError) -> Self {
        self.error = Some(error);
        self
    }
}

impl Geocoder for StubGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let key = query.trim().to_lowercase();
        if key.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self.places.get(&key).cloned())
    }
}

/// Write `stations` to a fresh `stations` table at `path`.
///
/// # Errors
///
/// Returns the underlying `rusqlite` error when the database cannot be
/// written.
#[cfg(feature = "store-sqlite")]
pub fn write_sqlite_database(
    path: &std::path::Path,
    stations: &[StationRecord],
) -> Result<(), rusqlite::Error> {
    let mut connection = rusqlite::Connection::open(path)?;
    let transaction = connection.transaction()?;
    transaction.execute(
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
    )?;
    {
        let mut statement = transaction.prepare(
            "INSERT OR REPLACE INTO stations
                (id, name, lon, lat, fast_chargers, max_power_kw, facility_type, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for station in stations {
            statement.execute(rusqlite::params![
                station.id,
                station.name,
                station.location.x,
                station.location.y,
                station.fast_charger_count,
                station.max_power_kw,
                station.facility_type,
                station.status.as_str(),
            ])?;
        }
    }
    transaction.commit()
}
