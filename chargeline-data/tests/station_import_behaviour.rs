//! Behavioural tests for station import and persistence.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use chargeline_core::{SqliteStationStore, StationStore, write_spatial_index};
use chargeline_data::{StationImportError, load_stations_json, persist_stations_to_sqlite};
use geo::{Coord, Rect};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rusqlite::Connection;
use tempfile::TempDir;

struct ImportWorld {
    dir: TempDir,
    export: RefCell<Option<Utf8PathBuf>>,
    outcome: RefCell<Option<Result<Utf8PathBuf, StationImportError>>>,
}

impl ImportWorld {
    fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf-8 path")
    }

    fn write_export(&self, contents: &str) {
        let path = self.path("stations.json");
        std::fs::write(path.as_std_path(), contents).expect("write export");
        *self.export.borrow_mut() = Some(path);
    }

    fn database(&self) -> Utf8PathBuf {
        match self.outcome.borrow().as_ref() {
            Some(Ok(path)) => path.clone(),
            other => panic!("expected a successful import, got {other:?}"),
        }
    }
}

#[fixture]
fn world() -> ImportWorld {
    ImportWorld {
        dir: TempDir::new().expect("create temp dir"),
        export: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

#[given("a station export with three rows for two stations")]
fn export_with_duplicate(world: &ImportWorld) {
    world.write_export(
        r#"[
            {"id": 12, "name": "Leicester Forest East", "lon": -1.23, "lat": 52.62,
             "fast_charger_count": 2, "status": "planned"},
            {"id": 30, "name": "Watford Gap", "lon": -1.17, "lat": 52.31,
             "fast_charger_count": 8, "max_power_kw": 150.0},
            {"id": 12, "name": "Leicester Forest East", "lon": -1.23, "lat": 52.62,
             "fast_charger_count": 6, "max_power_kw": 350.0, "status": "available"}
        ]"#,
    );
}

#[given("a station export with a latitude of 95 degrees")]
fn export_with_bad_latitude(world: &ImportWorld) {
    world.write_export(r#"[{"id": 4, "lon": 0.0, "lat": 95.0}]"#);
}

#[when("I import the export into a fresh directory")]
fn import_export(world: &ImportWorld) {
    let export = world.export.borrow().clone().expect("export must be written");
    let database = world.path("artefacts/stations.db");
    let index = world.path("artefacts/stations.rstar");
    let outcome = load_stations_json(&export).map(|stations| {
        persist_stations_to_sqlite(&database, &stations).expect("persist stations");
        write_spatial_index(index.as_std_path(), &stations).expect("write spatial index");
        database
    });
    *world.outcome.borrow_mut() = Some(outcome);
}

#[then("the database holds {count} stations")]
fn database_count(world: &ImportWorld, count: i64) {
    let conn = Connection::open(world.database().as_std_path()).expect("open database");
    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM stations", [], |row| row.get(0))
        .expect("count rows");
    assert_eq!(stored, count);
}

#[then("the station store finds station {id} near Leicester")]
fn store_finds_station(world: &ImportWorld, id: u64) {
    let store = SqliteStationStore::open(
        world.database().as_std_path(),
        world.path("artefacts/stations.rstar").as_std_path(),
    )
    .expect("open station store");
    let bbox = Rect::new(Coord { x: -1.3, y: 52.55 }, Coord { x: -1.1, y: 52.7 });

    let found: Vec<_> = store.stations_in_bbox(&bbox).collect();

    let [station] = found.as_slice() else {
        panic!("expected exactly one station, got {found:?}");
    };
    assert_eq!(station.id, id);
    assert_eq!(station.fast_charger_count, 6, "later row should win");
    assert!(station.has_fast_charging());
}

#[then("the import fails with an invalid coordinate error")]
fn import_fails(world: &ImportWorld) {
    let outcome = world.outcome.borrow();
    assert!(
        matches!(
            outcome.as_ref(),
            Some(Err(StationImportError::InvalidCoordinate { id: 4, .. }))
        ),
        "expected InvalidCoordinate, got {outcome:?}"
    );
}

#[scenario(path = "tests/features/station_import.feature", index = 0)]
fn importing_station_artefacts(world: ImportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/station_import.feature", index = 1)]
fn rejecting_invalid_coordinates(world: ImportWorld) {
    let _ = world;
}
