//! Error types for release pipeline operations.
//!
//! Every stage failure is fatal: the pipeline halts, no partial artifact is
//! published, and the failing stage is named in the error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release pipeline operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release pipeline operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// A pipeline stage failed; the run transitions to `Failed`.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// Stage that failed (e.g. "bundling")
        stage: &'static str,
        /// Underlying stage error
        source: StageError,
    },

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Release manifest parse errors
    #[error("manifest error: {0}")]
    Manifest(#[from] toml::de::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl ReleaseError {
    /// Wrap a stage error with the name of the stage it occurred in.
    pub fn stage(stage: &'static str, source: StageError) -> Self {
        Self::Stage { stage, source }
    }
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

/// Errors raised inside individual pipeline stages.
///
/// Every variant is fatal. There is no retry policy and no partial-success
/// state; a failed run requires a new tag push or a manual re-trigger.
#[derive(Error, Debug)]
pub enum StageError {
    /// The trigger tag does not match `<prefix><major>.<minor>.<patch>`.
    ///
    /// Rejected at version extraction rather than surfacing later as a
    /// naming mismatch.
    #[error("tag {tag:?} does not match expected pattern {prefix}<major>.<minor>.<patch>")]
    TagPattern {
        /// The offending tag reference
        tag: String,
        /// Configured tag prefix (normally "v")
        prefix: String,
    },

    /// A required input file or directory is absent.
    #[error("required input missing: {path}")]
    MissingInput {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// A metadata rewrite pattern matched nothing in its target file.
    ///
    /// Treated as fatal: the descriptor is not the file we think it is.
    #[error("no {pattern} found in {path}")]
    PatternNotFound {
        /// Description of the pattern that failed to match
        pattern: String,
        /// File that was searched
        path: PathBuf,
    },

    /// An external tool failed to spawn or exited with failure status.
    #[error("{tool} failed: {reason}")]
    ToolFailed {
        /// Tool name (e.g. "pyinstaller", "iscc")
        tool: String,
        /// Spawn error or captured stderr
        reason: String,
    },

    /// A stage completed but its expected output artifact is absent.
    ///
    /// Covers version-interpolation mismatches between the installer script
    /// and the expected `Sim-CPDLC-<version>.exe` name.
    #[error("expected output was not produced: {path}")]
    OutputMismatch {
        /// Path the artifact was expected at
        path: PathBuf,
    },

    /// The release for this tag already carries an asset with this name.
    ///
    /// Each tag produces at most one release asset; re-runs never silently
    /// replace a published file.
    #[error("release {tag} already has an asset named {asset}")]
    AssetConflict {
        /// Release tag
        tag: String,
        /// Conflicting asset name
        asset: String,
    },

    /// GitHub API failure (transport error or non-success status).
    #[error("GitHub API error: {0}")]
    Api(String),

    /// IO errors during stage execution
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for StageError {
    fn from(e: reqwest::Error) -> Self {
        StageError::Api(e.to_string())
    }
}
