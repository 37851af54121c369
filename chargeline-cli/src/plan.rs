//! Plan command implementation for the Chargeline CLI.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chargeline_core::{PlanRequest, PlanResponse, PlannerConfig};
use chargeline_data::geocoding::HttpGeocoderConfig;
use chargeline_data::routing::HttpDirectionsProviderConfig;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{open_utf8_file, require_file};
use crate::{
    ARG_ARTEFACTS_DIR, ARG_CORRIDOR_MILES, ARG_DETOUR_FACTOR, ARG_GEOCODER_BASE_URL,
    ARG_MAX_ITERATIONS, ARG_OSRM_BASE_URL, ARG_PLAN_REQUEST, ARG_RESERVE_MILES, ARG_SPATIAL_INDEX,
    ARG_STATIONS_DB, CliError, ENV_PLAN_REQUEST, SPATIAL_INDEX_FILE, STATIONS_DB_FILE, write_json,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a trip by loading prepared station artefacts \
                 (stations.db, stations.rstar), resolving place names with a \
                 Nominatim instance and querying an OSRM instance for \
                 driving routes. The request itself is provided as a \
                 JSON-encoded PlanRequest.",
    about = "Plan a charging-aware trip"
)]
#[ortho_config(prefix = "CHARGELINE")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing a PlanRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Directory containing the default artefact filenames.
    #[arg(long = ARG_ARTEFACTS_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) artefacts_dir: Option<Utf8PathBuf>,
    /// Override the path to the SQLite station store (`stations.db`).
    #[arg(long = ARG_STATIONS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) stations_db: Option<Utf8PathBuf>,
    /// Override the path to the persisted spatial index (`stations.rstar`).
    #[arg(long = ARG_SPATIAL_INDEX, value_name = "path")]
    #[serde(default)]
    pub(crate) spatial_index: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Base URL for the Nominatim server.
    #[arg(long = ARG_GEOCODER_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_base_url: Option<String>,
    /// Half-width of the station corridor around the route, in miles.
    #[arg(long = ARG_CORRIDOR_MILES, value_name = "miles")]
    #[serde(default)]
    pub(crate) corridor_miles: Option<f64>,
    /// Largest accepted ratio of optimised to base route distance.
    #[arg(long = ARG_DETOUR_FACTOR, value_name = "ratio")]
    #[serde(default)]
    pub(crate) detour_factor: Option<f64>,
    /// Safety margin subtracted from the vehicle range, in miles.
    #[arg(long = ARG_RESERVE_MILES, value_name = "miles")]
    #[serde(default)]
    pub(crate) reserve_miles: Option<f64>,
    /// Upper bound on waypoint insertion rounds.
    #[arg(long = ARG_MAX_ITERATIONS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_iterations: Option<usize>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Path to the `stations.db` SQLite database.
    pub(crate) stations_db: Utf8PathBuf,
    /// Path to the `stations.rstar` persisted spatial index.
    pub(crate) spatial_index: Utf8PathBuf,
    /// Base URL for the OSRM route service.
    pub(crate) osrm_base_url: String,
    /// Base URL for the Nominatim search service.
    pub(crate) geocoder_base_url: String,
    /// Engine tunables.
    pub(crate) planner: PlannerConfig,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_file(&self.request_path, ARG_PLAN_REQUEST)?;
        require_file(&self.stations_db, ARG_STATIONS_DB)?;
        require_file(&self.spatial_index, ARG_SPATIAL_INDEX)?;
        Ok(())
    }
}

fn checked(
    value: f64,
    field: &'static str,
    expected: &'static str,
    accept: impl Fn(f64) -> bool,
) -> Result<f64, CliError> {
    if value.is_finite() && accept(value) {
        Ok(value)
    } else {
        Err(CliError::InvalidTunable {
            field,
            value: value.to_string(),
            expected,
        })
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;

        let artefacts_dir = args.artefacts_dir.unwrap_or_else(|| Utf8PathBuf::from("."));
        let stations_db = args
            .stations_db
            .unwrap_or_else(|| artefacts_dir.join(STATIONS_DB_FILE));
        let spatial_index = args
            .spatial_index
            .unwrap_or_else(|| artefacts_dir.join(SPATIAL_INDEX_FILE));

        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| HttpDirectionsProviderConfig::default().base_url);
        let geocoder_base_url = args
            .geocoder_base_url
            .unwrap_or_else(|| HttpGeocoderConfig::default().base_url);

        let mut planner = PlannerConfig::default();
        let optimizer = &mut planner.optimizer;
        if let Some(miles) = args.corridor_miles {
            optimizer.corridor_miles =
                checked(miles, ARG_CORRIDOR_MILES, "a positive distance", |v| v > 0.0)?;
        }
        if let Some(factor) = args.detour_factor {
            optimizer.detour_factor =
                checked(factor, ARG_DETOUR_FACTOR, "at least 1.0", |v| v >= 1.0)?;
        }
        if let Some(miles) = args.reserve_miles {
            optimizer.reserve_miles =
                checked(miles, ARG_RESERVE_MILES, "a non-negative distance", |v| v >= 0.0)?;
        }
        if let Some(rounds) = args.max_iterations {
            optimizer.max_iterations = rounds;
        }

        Ok(Self {
            request_path,
            stations_db,
            spatial_index,
            osrm_base_url,
            geocoder_base_url,
            planner,
        })
    }
}

/// Answers plan requests for the current invocation.
pub(crate) trait PlanBackend {
    fn plan(&self, config: &PlanConfig, request: &PlanRequest) -> Result<PlanResponse, CliError>;
}

/// Plans against the SQLite station artefacts and the HTTP services.
pub(crate) struct HttpPlanBackend;

impl PlanBackend for HttpPlanBackend {
    #[cfg(feature = "store-sqlite")]
    fn plan(&self, config: &PlanConfig, request: &PlanRequest) -> Result<PlanResponse, CliError> {
        use chargeline_core::{Planner, SqliteStationStore};
        use chargeline_data::geocoding::HttpGeocoder;
        use chargeline_data::routing::HttpDirectionsProvider;

        let store = SqliteStationStore::open(
            config.stations_db.as_std_path(),
            config.spatial_index.as_std_path(),
        )?;
        let directions =
            HttpDirectionsProvider::new(config.osrm_base_url.clone()).map_err(|source| {
                CliError::BuildProvider {
                    service: "directions",
                    base_url: config.osrm_base_url.clone(),
                    source,
                }
            })?;
        let geocoder = HttpGeocoder::new(config.geocoder_base_url.clone()).map_err(|source| {
            CliError::BuildProvider {
                service: "geocoder",
                base_url: config.geocoder_base_url.clone(),
                source,
            }
        })?;
        Planner::with_config(store, directions, geocoder, config.planner.clone())
            .plan(request)
            .map_err(|source| CliError::Plan { source })
    }

    #[cfg(not(feature = "store-sqlite"))]
    fn plan(&self, _config: &PlanConfig, _request: &PlanRequest) -> Result<PlanResponse, CliError> {
        Err(CliError::MissingFeature {
            feature: "store-sqlite",
            action: "planning against station artefacts",
        })
    }
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &HttpPlanBackend, &mut stdout)
}

pub(crate) fn run_plan_with(
    args: PlanArgs,
    backend: &dyn PlanBackend,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let request = load_plan_request(&config.request_path)?;
    let response = backend.plan(&config, &request)?;
    info!(
        "planned {:.1} mi trip past {} stations ({} routes evaluated)",
        response.distance_miles,
        response.stations.len(),
        response.evaluated_routes
    );
    write_json(writer, &response)
}

/// Loads a JSON-encoded [`PlanRequest`] from disk.
pub(crate) fn load_plan_request(path: &Utf8Path) -> Result<PlanRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenPlanRequest {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParsePlanRequest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
