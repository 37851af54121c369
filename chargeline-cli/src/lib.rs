//! Command-line interface for the Chargeline engine.
//!
//! `plan` answers a JSON trip request against prepared station artefacts and
//! live routing and geocoding services. `import` turns a station export into
//! those artefacts.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod fs;
mod import;
mod plan;

pub use error::CliError;

use import::{ImportArgs, run_import};
use plan::{PlanArgs, run_plan};

pub(crate) const ARG_PLAN_REQUEST: &str = "request";
pub(crate) const ARG_ARTEFACTS_DIR: &str = "artefacts-dir";
pub(crate) const ARG_STATIONS_DB: &str = "stations-db";
pub(crate) const ARG_SPATIAL_INDEX: &str = "spatial-index";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_GEOCODER_BASE_URL: &str = "geocoder-base-url";
pub(crate) const ARG_CORRIDOR_MILES: &str = "corridor-miles";
pub(crate) const ARG_DETOUR_FACTOR: &str = "detour-factor";
pub(crate) const ARG_RESERVE_MILES: &str = "reserve-miles";
pub(crate) const ARG_MAX_ITERATIONS: &str = "max-iterations";
pub(crate) const ARG_STATIONS_JSON: &str = "stations-json";
pub(crate) const ARG_OUTPUT_DIR: &str = "output-dir";
pub(crate) const ENV_PLAN_REQUEST: &str = "CHARGELINE_CMDS_PLAN_REQUEST_PATH";
pub(crate) const ENV_STATIONS_JSON: &str = "CHARGELINE_CMDS_IMPORT_STATIONS_JSON";

/// Default artefact file names inside an artefacts directory.
pub(crate) const STATIONS_DB_FILE: &str = "stations.db";
pub(crate) const SPATIAL_INDEX_FILE: &str = "stations.rstar";

/// Run the Chargeline CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration layering or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Import(args) => run_import(args),
    }
}

/// Write `value` to `writer` as pretty-printed JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(CliError::WriteOutput)
}

#[derive(Debug, Parser)]
#[command(
    name = "chargeline",
    about = "Charging-aware trip planning for electric vehicles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a trip and print the response as JSON.
    Plan(PlanArgs),
    /// Build station artefacts from a JSON export.
    Import(ImportArgs),
}

#[cfg(test)]
mod tests;
