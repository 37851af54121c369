//! A directions route evaluated for charging coverage.

use geo::Coord;

use crate::{
    CorridorScan, CorridorStation, DirectionsRoute, RouteIndex, RouteIndexError, RouteMetrics,
    StationRecord, StationStore, WaypointCandidate, locate_corridor_stations, max_gap_miles,
};

/// A station the optimiser inserted as a via point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoWaypoint {
    /// The chosen station.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub station: StationRecord,
    /// Mile marker of the gap midpoint that motivated the choice, measured on
    /// the route it was inserted into.
    pub gap_midpoint_miles: f64,
}

impl From<&WaypointCandidate> for AutoWaypoint {
    fn from(candidate: &WaypointCandidate) -> Self {
        Self {
            station: candidate.station.clone(),
            gap_midpoint_miles: candidate.gap.midpoint_miles,
        }
    }
}

/// A route together with its corridor stations and coverage figures.
///
/// Candidates are rebuilt from scratch for every route the planner or the
/// optimiser considers; nothing is carried over between evaluations except
/// the via list and the auto-waypoints that produced the route.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRoute {
    /// The route as returned by the directions provider.
    pub route: DirectionsRoute,
    /// Index over the route polyline.
    pub index: RouteIndex,
    /// Stations along the corridor, in route order.
    pub corridor: CorridorScan,
    /// Longest uncovered stretch, in miles.
    pub max_gap_miles: f64,
    /// Coordinates the route was requested through, origin first.
    pub via: Vec<Coord<f64>>,
    /// Stations inserted by the optimiser, in insertion order.
    pub auto_waypoints: Vec<AutoWaypoint>,
}

impl CandidateRoute {
    /// Index `route`, find its corridor stations and measure its gaps.
    ///
    /// # Errors
    ///
    /// Returns [`RouteIndexError`] when the route polyline is unusable,
    /// including [`RouteIndexError::DegenerateGeometry`] for a polyline with
    /// no length.
    pub fn evaluate<S>(
        store: &S,
        route: DirectionsRoute,
        via: Vec<Coord<f64>>,
        auto_waypoints: Vec<AutoWaypoint>,
        corridor_miles: f64,
    ) -> Result<Self, RouteIndexError>
    where
        S: StationStore + ?Sized,
    {
        let geometry = route.geometry();
        let index = RouteIndex::from_geometry(&geometry)?;
        if index.is_empty() {
            return Err(RouteIndexError::DegenerateGeometry);
        }
        let corridor = locate_corridor_stations(store, &geometry, &index, corridor_miles);
        let max_gap_miles = max_gap_miles(&corridor.stations, index.total_miles());
        Ok(Self {
            route,
            index,
            corridor,
            max_gap_miles,
            via,
            auto_waypoints,
        })
    }

    /// Corridor stations in route order.
    #[must_use]
    pub fn stations(&self) -> &[CorridorStation] {
        &self.corridor.stations
    }

    /// Number of corridor stations.
    #[must_use]
    pub fn station_count(&self) -> usize {
        self.corridor.stations.len()
    }

    /// Reported route length in miles.
    #[must_use]
    pub const fn total_miles(&self) -> f64 {
        self.index.total_miles()
    }

    /// Figures used to rank this route.
    #[must_use]
    pub fn metrics(&self) -> RouteMetrics {
        RouteMetrics {
            max_gap_miles: self.max_gap_miles,
            station_count: self.station_count(),
            distance_meters: self.route.distance_meters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::miles_to_meters;
    use crate::test_support::MemoryStationStore;
    use rstest::rstest;

    fn northbound(distance_miles: f64) -> DirectionsRoute {
        let coords = (0..=10)
            .map(|i| Coord {
                x: 0.0,
                y: f64::from(i) * 0.1,
            })
            .collect();
        DirectionsRoute::new(coords, miles_to_meters(distance_miles), 3_600.0)
    }

    #[rstest]
    fn measures_coverage_of_the_route() {
        let store = MemoryStationStore::with_stations([
            StationRecord::new(1, Coord { x: 0.0, y: 0.2 }, 2),
            StationRecord::new(2, Coord { x: 0.0, y: 0.55 }, 2),
            StationRecord::new(3, Coord { x: 0.0, y: 0.9 }, 2),
        ]);
        let candidate =
            CandidateRoute::evaluate(&store, northbound(100.0), Vec::new(), Vec::new(), 5.0)
                .expect("route evaluates");
        assert_eq!(candidate.station_count(), 3);
        assert!((candidate.max_gap_miles - 35.0).abs() < 1e-6);
        assert!((candidate.total_miles() - 100.0).abs() < 1e-9);
        assert_eq!(candidate.metrics().station_count, 3);
    }

    #[rstest]
    fn empty_corridor_gap_spans_the_route() {
        let store = MemoryStationStore::default();
        let candidate =
            CandidateRoute::evaluate(&store, northbound(80.0), Vec::new(), Vec::new(), 5.0)
                .expect("route evaluates");
        assert!((candidate.max_gap_miles - 80.0).abs() < 1e-9);
    }

    #[rstest]
    fn stationary_route_is_degenerate() {
        let spot = Coord { x: 1.0, y: 1.0 };
        let route = DirectionsRoute::new(vec![spot, spot], 0.0, 0.0);
        let err = CandidateRoute::evaluate(
            &MemoryStationStore::default(),
            route,
            Vec::new(),
            Vec::new(),
            5.0,
        )
        .expect_err("no segments to measure");
        assert_eq!(err, RouteIndexError::DegenerateGeometry);
    }
}
