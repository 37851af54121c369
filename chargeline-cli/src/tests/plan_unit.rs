//! Focused unit tests covering plan CLI configuration and request parsing.

use super::helpers::{utf8_tempdir, write_utf8};
use super::*;
use crate::plan::{PlanArgs, PlanConfig, config_from_layers_for_test, load_plan_request};
use camino::Utf8PathBuf;
use chargeline_core::{PlannerConfig, RoutePreference, Stop};
use rstest::rstest;

#[derive(Debug, Copy, Clone)]
enum MissingArtefact {
    Request,
    StationsDb,
    SpatialIndex,
}

fn args_with_request(request_path: Utf8PathBuf) -> PlanArgs {
    PlanArgs {
        request_path: Some(request_path),
        ..PlanArgs::default()
    }
}

#[rstest]
fn converting_plan_without_request_errors() {
    let err = PlanConfig::try_from(PlanArgs::default()).expect_err("missing request should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(env, ENV_PLAN_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_derives_default_paths_and_services() {
    let (_tmp, root) = utf8_tempdir();
    let request_path = root.join("request.json");
    let args = PlanArgs {
        artefacts_dir: Some(root.clone()),
        ..args_with_request(request_path.clone())
    };

    let config = PlanConfig::try_from(args).expect("config should build");

    assert_eq!(config.request_path, request_path);
    assert_eq!(config.stations_db, root.join("stations.db"));
    assert_eq!(config.spatial_index, root.join("stations.rstar"));
    assert_eq!(config.osrm_base_url, "http://localhost:5000");
    assert_eq!(config.geocoder_base_url, "https://nominatim.openstreetmap.org");
    assert_eq!(config.planner, PlannerConfig::default());
}

#[rstest]
fn explicit_artefact_paths_override_the_directory() {
    let args = PlanArgs {
        artefacts_dir: Some(Utf8PathBuf::from("artefacts")),
        stations_db: Some(Utf8PathBuf::from("elsewhere/stations.db")),
        ..args_with_request(Utf8PathBuf::from("request.json"))
    };

    let config = PlanConfig::try_from(args).expect("config should build");

    assert_eq!(config.stations_db, Utf8PathBuf::from("elsewhere/stations.db"));
    assert_eq!(
        config.spatial_index,
        Utf8PathBuf::from("artefacts/stations.rstar")
    );
}

#[rstest]
fn tunables_flow_into_the_optimizer() {
    let args = PlanArgs {
        corridor_miles: Some(5.0),
        detour_factor: Some(1.5),
        reserve_miles: Some(0.0),
        max_iterations: Some(4),
        ..args_with_request(Utf8PathBuf::from("request.json"))
    };

    let config = PlanConfig::try_from(args).expect("config should build");

    let optimizer = &config.planner.optimizer;
    assert_eq!(optimizer.corridor_miles, 5.0);
    assert_eq!(optimizer.detour_factor, 1.5);
    assert_eq!(optimizer.reserve_miles, 0.0);
    assert_eq!(optimizer.max_iterations, 4);
}

#[rstest]
#[case::zero_corridor(Some(0.0), None, None, ARG_CORRIDOR_MILES)]
#[case::nan_corridor(Some(f64::NAN), None, None, ARG_CORRIDOR_MILES)]
#[case::shortcut_detour(None, Some(0.9), None, ARG_DETOUR_FACTOR)]
#[case::negative_reserve(None, None, Some(-1.0), ARG_RESERVE_MILES)]
fn invalid_tunables_are_rejected(
    #[case] corridor_miles: Option<f64>,
    #[case] detour_factor: Option<f64>,
    #[case] reserve_miles: Option<f64>,
    #[case] expected_field: &'static str,
) {
    let args = PlanArgs {
        corridor_miles,
        detour_factor,
        reserve_miles,
        ..args_with_request(Utf8PathBuf::from("request.json"))
    };

    let err = PlanConfig::try_from(args).expect_err("tunable should be rejected");
    match err {
        CliError::InvalidTunable { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidTunable, found {other:?}"),
    }
}

#[rstest]
#[case::missing_request(ARG_PLAN_REQUEST, MissingArtefact::Request)]
#[case::missing_db(ARG_STATIONS_DB, MissingArtefact::StationsDb)]
#[case::missing_index(ARG_SPATIAL_INDEX, MissingArtefact::SpatialIndex)]
fn validate_sources_reports_missing_artefacts(
    #[case] expected_field: &'static str,
    #[case] missing: MissingArtefact,
) {
    let (_tmp, root) = utf8_tempdir();
    let request_path = root.join("request.json");
    let db_path = root.join("stations.db");
    let index_path = root.join("stations.rstar");

    if !matches!(missing, MissingArtefact::Request) {
        write_utf8(&request_path, b"{}");
    }
    if !matches!(missing, MissingArtefact::StationsDb) {
        write_utf8(&db_path, b"db");
    }
    if !matches!(missing, MissingArtefact::SpatialIndex) {
        write_utf8(&index_path, b"index");
    }

    let config = PlanConfig {
        request_path,
        stations_db: db_path,
        spatial_index: index_path,
        osrm_base_url: "http://localhost:5000".to_owned(),
        geocoder_base_url: "http://localhost:8080".to_owned(),
        planner: PlannerConfig::default(),
    };

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = utf8_tempdir();
    let request_path = root.join("request.json");
    std::fs::create_dir(&request_path).expect("request directory");

    let config = PlanConfig {
        request_path,
        stations_db: root.join("stations.db"),
        spatial_index: root.join("stations.rstar"),
        osrm_base_url: "http://localhost:5000".to_owned(),
        geocoder_base_url: "http://localhost:8080".to_owned(),
        planner: PlannerConfig::default(),
    };

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_PLAN_REQUEST),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_plan_request_parses_json() {
    let (_tmp, root) = utf8_tempdir();
    let request_path = root.join("request.json");
    write_utf8(
        &request_path,
        br#"{"stops": ["Leeds", {"x": -1.9, "y": 52.48}], "preference": "charger_optimized", "vehicle_range_miles": 220}"#,
    );

    let request = load_plan_request(&request_path).expect("request should parse");

    assert_eq!(request.stops.first(), Some(&Stop::Query("Leeds".to_owned())));
    assert_eq!(request.preference, RoutePreference::ChargerOptimized);
    assert_eq!(request.vehicle_range_miles, Some(220.0));
}

#[rstest]
fn load_plan_request_reports_invalid_json() {
    let (_tmp, root) = utf8_tempdir();
    let request_path = root.join("request.json");
    write_utf8(&request_path, b"{ not json");

    let err = load_plan_request(&request_path).expect_err("invalid JSON should error");
    match err {
        CliError::ParsePlanRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("expected ParsePlanRequest, found {other:?}"),
    }
}

#[rstest]
fn load_plan_request_io_error_returns_open_error() {
    let (_tmp, root) = utf8_tempdir();
    let request_path = root.join("absent.json");

    let err = load_plan_request(&request_path).expect_err("missing request should error");
    match err {
        CliError::OpenPlanRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("expected OpenPlanRequest, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let (_tmp, root) = utf8_tempdir();
    let env_request = root.join("from-env-request.json");
    let cli_dir = root.join("from-cli");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "artefacts_dir": root.join("from-file").as_str(),
            "osrm_base_url": "http://from-file:5000",
            "detour_factor": 1.1,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": env_request.as_str(),
        "artefacts_dir": root.join("from-env").as_str(),
        "detour_factor": 1.4,
    }));
    composer.push_cli(json!({
        "artefacts_dir": cli_dir.as_str(),
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, env_request);
    assert_eq!(config.stations_db, cli_dir.join("stations.db"));
    assert_eq!(config.spatial_index, cli_dir.join("stations.rstar"));
    assert_eq!(config.osrm_base_url, "http://from-file:5000");
    assert_eq!(config.planner.optimizer.detour_factor, 1.4);
}
