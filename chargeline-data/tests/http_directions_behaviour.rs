//! Behavioural tests for directions providers.
//!
//! These tests use [`StubDirectionsProvider`] to verify behaviour without
//! requiring a running OSRM service.

use std::cell::RefCell;

use chargeline_core::{DirectionsError, DirectionsProvider, DirectionsRoute};
use chargeline_data::routing::test_support::StubDirectionsProvider;
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Result cell holding the outcome of a directions request.
type ResultCell = RefCell<Result<Vec<DirectionsRoute>, DirectionsError>>;

#[fixture]
fn provider() -> RefCell<Option<StubDirectionsProvider>> {
    RefCell::new(None)
}

#[fixture]
fn result() -> ResultCell {
    RefCell::new(Ok(Vec::new()))
}

fn stops() -> [Coord<f64>; 2] {
    [Coord { x: -0.12, y: 51.5 }, Coord { x: -1.9, y: 52.48 }]
}

fn sample_routes() -> Vec<DirectionsRoute> {
    let [origin, destination] = stops();
    let via = Coord { x: -1.2, y: 52.0 };
    vec![
        DirectionsRoute::new(vec![origin, destination], 190_000.0, 7_800.0),
        DirectionsRoute::new(vec![origin, via, destination], 205_000.0, 8_400.0),
    ]
}

fn request(
    provider: &RefCell<Option<StubDirectionsProvider>>,
    result: &ResultCell,
    waypoints: &[Coord<f64>],
    alternatives: bool,
) {
    let guard = provider.borrow();
    let stub = guard.as_ref().expect("provider must be initialised");
    *result.borrow_mut() = stub.directions(waypoints, alternatives);
}

// --- Given steps ---

#[given("a directions service returning two routes")]
fn service_ok(#[from(provider)] provider: &RefCell<Option<StubDirectionsProvider>>) {
    *provider.borrow_mut() = Some(StubDirectionsProvider::with_routes(sample_routes()));
}

#[given("a directions service that times out")]
fn service_timeout(#[from(provider)] provider: &RefCell<Option<StubDirectionsProvider>>) {
    *provider.borrow_mut() = Some(StubDirectionsProvider::with_error(
        DirectionsError::Timeout {
            url: "http://example.com/route/v1/driving".to_owned(),
            timeout_secs: 30,
        },
    ));
}

#[given("a directions service that finds no route")]
fn service_no_route(#[from(provider)] provider: &RefCell<Option<StubDirectionsProvider>>) {
    *provider.borrow_mut() = Some(StubDirectionsProvider::with_routes(Vec::new()));
}

// --- When steps ---

#[when("I request alternative directions between two stops")]
fn request_alternatives(
    #[from(provider)] provider: &RefCell<Option<StubDirectionsProvider>>,
    #[from(result)] result: &ResultCell,
) {
    request(provider, result, &stops(), true);
}

#[when("I request directions between two stops")]
fn request_primary(
    #[from(provider)] provider: &RefCell<Option<StubDirectionsProvider>>,
    #[from(result)] result: &ResultCell,
) {
    request(provider, result, &stops(), false);
}

#[when("I request directions for a single stop")]
fn request_single(
    #[from(provider)] provider: &RefCell<Option<StubDirectionsProvider>>,
    #[from(result)] result: &ResultCell,
) {
    let [origin, _] = stops();
    request(provider, result, &[origin], false);
}

// --- Then steps ---

#[then("{count} routes are returned")]
fn then_routes(#[from(result)] result: &ResultCell, count: usize) {
    let borrowed = result.borrow();
    let routes = borrowed.as_ref().expect("expected Ok result");
    assert_eq!(routes.len(), count, "unexpected route count");
    assert!(
        routes.iter().all(|route| route.distance_meters > 0.0),
        "routes should carry their distance"
    );
}

#[then("a too few waypoints error is returned")]
fn then_too_few(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Err(DirectionsError::TooFewWaypoints { found: 1 })),
        "expected TooFewWaypoints, got {borrowed:?}"
    );
}

#[then("a timeout error is returned")]
fn then_timeout(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Err(DirectionsError::Timeout { .. })),
        "expected Timeout error, got {borrowed:?}"
    );
}

#[then("a no route error is returned")]
fn then_no_route(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Err(DirectionsError::NoRoute { .. })),
        "expected NoRoute error, got {borrowed:?}"
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/http_directions.feature", name = $title)]
        fn $fn_name(provider: RefCell<Option<StubDirectionsProvider>>, result: ResultCell) {
            let _ = (provider, result);
        }
    };
}

register_scenario!(returning_alternatives, "returning every alternative when asked");
register_scenario!(returning_primary_route, "returning only the primary route otherwise");
register_scenario!(rejecting_single_stop, "rejecting a single stop");
register_scenario!(surfacing_timeouts, "surfacing timeouts");
register_scenario!(reporting_missing_routes, "reporting missing routes");
