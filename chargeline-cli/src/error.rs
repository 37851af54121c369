//! Error types emitted by the Chargeline CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use chargeline_core::PlanError;
#[cfg(feature = "store-sqlite")]
use chargeline_core::{SpatialIndexWriteError, SqliteStationStoreError};
use chargeline_data::{PersistStationsError, ProviderBuildError, StationImportError};
use thiserror::Error;

/// Errors emitted by the Chargeline CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A tunable is outside its accepted range.
    #[error("{field} must be {expected}, got {value}")]
    InvalidTunable {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The output directory exists but is not a directory.
    #[error("output directory {path:?} is not a directory")]
    OutputDirectoryNotDirectory { path: Utf8PathBuf },
    /// Reading the station export failed.
    #[error(transparent)]
    ImportStations(#[from] StationImportError),
    /// Persisting stations to SQLite failed.
    #[error("failed to persist stations to {path:?}: {source}")]
    PersistStations {
        path: Utf8PathBuf,
        #[source]
        source: PersistStationsError,
    },
    /// Writing the spatial index artefact failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to write spatial index to {path:?}: {source}")]
    WriteSpatialIndex {
        path: Utf8PathBuf,
        #[source]
        source: SpatialIndexWriteError,
    },
    /// Opening the plan request file failed.
    #[error("failed to open plan request at {path:?}: {source}")]
    OpenPlanRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Plan request JSON could not be decoded.
    #[error("failed to parse plan request JSON at {path:?}: {source}")]
    ParsePlanRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Opening the station store artefacts failed.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    OpenStationStore(#[from] SqliteStationStoreError),
    /// Constructing an HTTP adapter failed.
    #[error("failed to build {service} client for {base_url:?}: {source}")]
    BuildProvider {
        service: &'static str,
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The planner rejected the request.
    #[error("planning failed: {source}")]
    Plan { source: PlanError },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
