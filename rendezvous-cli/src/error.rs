//! Error types emitted by the rendezvous CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use rendezvous_core::{EngineError, GeoPointError};
use rendezvous_data::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the rendezvous CLI.
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
        /// Name of the configuration field involved.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Name of the configuration field involved.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Name of the configuration field involved.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Name of the configuration field involved.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
        #[source]
        /// Underlying error.
        source: std::io::Error,
    },
    /// Opening the participants request failed.
    #[error("failed to open request at {path:?}: {source}")]
    OpenRequest {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        #[source]
        /// Underlying error.
        source: std::io::Error,
    },
    /// The participants request could not be decoded.
    #[error("failed to parse request JSON at {path:?}: {source}")]
    ParseRequest {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        #[source]
        /// Underlying error.
        source: serde_json::Error,
    },
    /// The routes target is not a valid coordinate.
    #[error("invalid target point: {0}")]
    InvalidTarget(#[source] GeoPointError),
    /// Constructing the routing provider failed.
    #[error("failed to build routing provider for {base_url:?}: {source}")]
    BuildRoutingProvider {
        /// Base URL of the routing provider.
        base_url: String,
        #[source]
        /// Underlying error.
        source: ProviderBuildError,
    },
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    StartRuntime(#[source] std::io::Error),
    /// The engine rejected the request or could not answer it.
    #[error("meeting point computation failed: {0}")]
    Engine(#[from] EngineError),
    /// Serialising the result failed.
    #[error("failed to serialise result: {0}")]
    SerialiseResult(#[source] serde_json::Error),
    /// Writing the result to standard output failed.
    #[error("failed to write result: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing the result to the requested file failed.
    #[error("failed to write result to {path:?}: {source}")]
    WriteOutputFile {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        #[source]
        /// Underlying error.
        source: std::io::Error,
    },
}
