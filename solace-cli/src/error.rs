//! Error types emitted by the Solace CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use solace_core::{InvalidFeedback, NearbyQueryError, SqliteStoreError};
use solace_data::ClientBuildError;
use thiserror::Error;

/// Errors emitted by the Solace CLI.
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
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The nearby coordinates were missing or unparsable.
    #[error(transparent)]
    NearbyQuery(#[from] NearbyQueryError),
    /// The feedback value is not one of the accepted kinds.
    #[error(transparent)]
    InvalidFeedback(#[from] InvalidFeedback),
    /// A limit of zero would never return anything.
    #[error("--limit must be at least 1")]
    ZeroLimit,
    /// Opening an input file failed.
    #[error("failed to open {field} file {path:?}: {source}")]
    OpenInput {
        /// Option that named the file.
        field: &'static str,
        /// Path that could not be opened.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An input file was not valid JSON of the expected shape.
    #[error("failed to parse {field} JSON at {path:?}: {source}")]
    ParseInput {
        /// Option that named the file.
        field: &'static str,
        /// Path of the malformed file.
        path: Utf8PathBuf,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// Opening or querying the database failed.
    #[error("database {path:?}: {source}")]
    Store {
        /// Database path.
        path: Utf8PathBuf,
        /// Store failure.
        #[source]
        source: SqliteStoreError,
    },
    /// No recommendation with that id belongs to the user.
    #[error("recommendation {id} not found for user {user:?}")]
    RecommendationNotFound {
        /// Requested recommendation id.
        id: i64,
        /// User the lookup was scoped to.
        user: String,
    },
    /// Constructing an HTTP client failed.
    #[error("failed to build {client} client: {source}")]
    BuildClient {
        /// Which client failed.
        client: &'static str,
        /// Construction failure.
        #[source]
        source: ClientBuildError,
    },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
