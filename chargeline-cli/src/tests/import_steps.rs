//! Behaviour-driven step definitions driving the import CLI scenarios.

use super::helpers::{utf8_tempdir, write_utf8};
use super::*;
use crate::import::{ImportSummary, run_import_with};
use camino::Utf8PathBuf;
use chargeline_core::{SqliteStationStore, StationStore};
use chargeline_data::StationImportError;
use geo::{Coord, Rect};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct ImportWorld {
    _tmp: TempDir,
    export_path: Utf8PathBuf,
    output_dir: Utf8PathBuf,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl ImportWorld {
    fn new() -> Self {
        let (tmp, root) = utf8_tempdir();
        Self {
            _tmp: tmp,
            export_path: root.join("stations.json"),
            output_dir: root.join("artefacts"),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn summary(&self) -> ImportSummary {
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        serde_json::from_str(&stdout).expect("output should be a JSON import summary")
    }
}

#[fixture]
fn world() -> ImportWorld {
    ImportWorld::new()
}

#[given("a station export with two stations")]
fn export_with_two_stations(#[from(world)] world: &ImportWorld) {
    write_utf8(
        &world.export_path,
        br#"[
            {"id": 1, "name": "Tebay", "lon": -2.6, "lat": 54.43, "fast_charger_count": 6},
            {"id": 2, "name": "Southwaite", "lon": -2.85, "lat": 54.8, "fast_charger_count": 4,
             "max_power_kw": 150.0}
        ]"#,
    );
}

#[given("a station export with an unknown status")]
fn export_with_unknown_status(#[from(world)] world: &ImportWorld) {
    write_utf8(
        &world.export_path,
        br#"[{"id": 3, "lon": -2.6, "lat": 54.43, "status": "demolished"}]"#,
    );
}

#[when("I run the import command")]
fn run_import_command(#[from(world)] world: &ImportWorld) {
    let invocation = vec![
        "chargeline".to_owned(),
        "import".to_owned(),
        world.export_path.as_str().to_owned(),
        format!("--{ARG_OUTPUT_DIR}"),
        world.output_dir.as_str().to_owned(),
    ];
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Import(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_import_with(args, &mut *buffer)
        }
        Command::Plan(_) => panic!("expected import command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command reports {count} imported stations")]
fn reports_imported(#[from(world)] world: &ImportWorld, count: usize) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");

    let summary = world.summary();
    assert_eq!(summary.stations, count);
    assert_eq!(summary.stations_db, world.output_dir.join("stations.db"));
    assert_eq!(summary.spatial_index, world.output_dir.join("stations.rstar"));
}

#[then("the artefacts open as a station store")]
fn artefacts_open(#[from(world)] world: &ImportWorld) {
    let summary = world.summary();
    let store = SqliteStationStore::open(
        summary.stations_db.as_std_path(),
        summary.spatial_index.as_std_path(),
    )
    .expect("open station store");
    let cumbria = Rect::new(Coord { x: -3.0, y: 54.0 }, Coord { x: -2.0, y: 55.0 });

    let ids: Vec<u64> = store.stations_in_bbox(&cumbria).map(|s| s.id).collect();

    assert_eq!(ids, vec![1, 2]);
}

#[then("the command fails because the status is unknown")]
fn command_fails_unknown_status(#[from(world)] world: &ImportWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::ImportStations(StationImportError::UnknownStatus { id, .. }) => {
            assert_eq!(*id, 3);
        }
        other => panic!("expected UnknownStatus, found {other:?}"),
    }
}

macro_rules! register_import_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/import_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ImportWorld) {
            let _ = world;
        }
    };
}

register_import_scenario!(import_happy_path, "importing a station export");
register_import_scenario!(import_unknown_status, "rejecting unknown station statuses");
