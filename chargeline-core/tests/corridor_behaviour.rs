//! Behavioural tests for corridor station matching.

use std::cell::{Cell, RefCell};

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use chargeline_core::geometry::miles_to_meters;
use chargeline_core::test_support::MemoryStationStore;
use chargeline_core::{
    CorridorScan, DistanceSource, PathGeometry, RouteIndex, StationRecord, locate_corridor_stations,
    max_gap_miles,
};

/// Shared state for corridor scenarios.
#[derive(Debug, Default)]
struct CorridorWorld {
    path: RefCell<Vec<Coord<f64>>>,
    index: RefCell<Option<RouteIndex>>,
    stations: RefCell<Vec<StationRecord>>,
    line_queries: Cell<bool>,
    scan: RefCell<Option<CorridorScan>>,
}

impl CorridorWorld {
    fn expect_scan(&self) -> CorridorScan {
        self.scan
            .borrow()
            .clone()
            .expect("corridor scan should have run")
    }

    fn total_miles(&self) -> f64 {
        self.index
            .borrow()
            .as_ref()
            .map(RouteIndex::total_miles)
            .expect("route should be indexed")
    }
}

#[fixture]
fn world() -> CorridorWorld {
    CorridorWorld::default()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "unexpected length: {actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "expected {expected:?}, got {actual:?}");
    }
}

fn straight_route(world: &CorridorWorld) {
    let path: Vec<_> = (0..=10)
        .map(|i| Coord {
            x: 0.0,
            y: f64::from(i) * 0.1,
        })
        .collect();
    let index = RouteIndex::build(&path, Some(miles_to_meters(100.0))).expect("index builds");
    world.path.replace(path);
    world.index.replace(Some(index));
}

#[given("a straight 100 mile route with stations at miles 20, 55 and 90")]
fn route_with_stations(world: &CorridorWorld) {
    straight_route(world);
    world.stations.replace(
        [(1, 20.0), (2, 55.0), (3, 90.0)]
            .into_iter()
            .map(|(id, mile)| StationRecord::new(id, Coord { x: 0.0, y: mile / 100.0 }, 4))
            .collect(),
    );
}

#[given("a straight 100 mile route with no stations")]
fn route_without_stations(world: &CorridorWorld) {
    straight_route(world);
}

#[given("a station store that answers line queries")]
fn line_store(world: &CorridorWorld) {
    world.line_queries.set(true);
}

#[given("a station store that only answers bounding-box queries")]
fn bbox_store(world: &CorridorWorld) {
    world.line_queries.set(false);
}

#[when("I locate corridor stations within {miles} miles")]
fn locate(world: &CorridorWorld, miles: f64) {
    let mut store = MemoryStationStore::with_stations(world.stations.borrow().clone());
    if world.line_queries.get() {
        store = store.with_line_queries();
    }
    let scan = {
        let index = world.index.borrow();
        let index = index.as_ref().expect("route should be indexed");
        let path = PathGeometry::new(world.path.borrow().clone(), Some(miles_to_meters(100.0)));
        locate_corridor_stations(&store, &path, index, miles)
    };
    world.scan.replace(Some(scan));
}

#[then("the stations are reported in route order")]
fn in_route_order(world: &CorridorWorld) {
    let ids: Vec<u64> = world.expect_scan().station_ids().collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[then("no corridor stations are found")]
fn none_found(world: &CorridorWorld) {
    assert!(world.expect_scan().stations.is_empty());
}

#[then("the miles from the previous station are 20, 35 and 35")]
fn from_previous(world: &CorridorWorld) {
    let scan = world.expect_scan();
    let miles: Vec<f64> = scan.stations.iter().map(|s| s.miles_from_prev).collect();
    assert_close(&miles, &[20.0, 35.0, 35.0]);
}

#[then("the miles to the next station are 35, 35 and 10")]
fn to_next(world: &CorridorWorld) {
    let scan = world.expect_scan();
    let miles: Vec<f64> = scan.stations.iter().map(|s| s.miles_to_next).collect();
    assert_close(&miles, &[35.0, 35.0, 10.0]);
}

#[then("the largest gap is {miles} miles")]
fn largest_gap(world: &CorridorWorld, miles: f64) {
    let gap = max_gap_miles(&world.expect_scan().stations, world.total_miles());
    assert_close(&[gap], &[miles]);
}

#[then("distances were measured geodesically")]
fn geodesic(world: &CorridorWorld) {
    assert_eq!(world.expect_scan().distance_source, DistanceSource::Geodesic);
}

#[then("distances were measured from the bounding-box fallback")]
fn fallback(world: &CorridorWorld) {
    assert_eq!(
        world.expect_scan().distance_source,
        DistanceSource::BoundingBoxFallback
    );
}

#[scenario(path = "tests/features/corridor.feature", index = 0)]
fn annotated_stations(world: CorridorWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/corridor.feature", index = 1)]
fn bounding_box_fallback(world: CorridorWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/corridor.feature", index = 2)]
fn empty_corridor(world: CorridorWorld) {
    let _ = world;
}
