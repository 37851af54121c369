//! Import command: build station artefacts from a JSON export.

use std::io::Write;

use camino::Utf8PathBuf;
use chargeline_core::StationRecord;
use chargeline_data::{load_stations_json, persist_stations_to_sqlite};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{require_directory_or_absent, require_file};
use crate::{
    ARG_OUTPUT_DIR, ARG_STATIONS_JSON, CliError, ENV_STATIONS_JSON, SPATIAL_INDEX_FILE,
    STATIONS_DB_FILE, write_json,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a JSON array of charging stations and write the \
                 stations.db and stations.rstar artefacts used by `plan`. \
                 Re-importing into the same directory replaces rows by id.",
    about = "Build station artefacts from a JSON export"
)]
#[ortho_config(prefix = "CHARGELINE")]
pub(crate) struct ImportArgs {
    /// Path to the JSON station export.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) stations_json: Option<Utf8PathBuf>,
    /// Directory that receives the artefacts.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) stations_json: Utf8PathBuf,
    pub(crate) output_dir: Utf8PathBuf,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let stations_json = args.stations_json.ok_or(CliError::MissingArgument {
            field: ARG_STATIONS_JSON,
            env: ENV_STATIONS_JSON,
        })?;
        Ok(Self {
            stations_json,
            output_dir: args.output_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
        })
    }
}

impl ImportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_file(&self.stations_json, ARG_STATIONS_JSON)?;
        require_directory_or_absent(&self.output_dir)
    }
}

/// Summary printed once the artefacts are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ImportSummary {
    pub(crate) stations: usize,
    pub(crate) stations_db: Utf8PathBuf,
    pub(crate) spatial_index: Utf8PathBuf,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &mut stdout)
}

pub(crate) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = ImportConfig::try_from(merged)?;
    config.validate_sources()?;

    let stations = load_stations_json(&config.stations_json)?;
    let summary = ImportSummary {
        stations: stations.len(),
        stations_db: config.output_dir.join(STATIONS_DB_FILE),
        spatial_index: config.output_dir.join(SPATIAL_INDEX_FILE),
    };
    persist_stations_to_sqlite(&summary.stations_db, &stations).map_err(|source| {
        CliError::PersistStations {
            path: summary.stations_db.clone(),
            source,
        }
    })?;
    write_index(&summary.spatial_index, &stations)?;
    info!(
        "imported {} stations into {}",
        summary.stations, config.output_dir
    );
    write_json(writer, &summary)
}

#[cfg(feature = "store-sqlite")]
fn write_index(path: &camino::Utf8Path, stations: &[StationRecord]) -> Result<(), CliError> {
    chargeline_core::write_spatial_index(path.as_std_path(), stations).map_err(|source| {
        CliError::WriteSpatialIndex {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(feature = "store-sqlite"))]
fn write_index(_path: &camino::Utf8Path, _stations: &[StationRecord]) -> Result<(), CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "writing the station spatial index",
    })
}
