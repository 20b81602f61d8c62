//! Error types for release orchestration.
//!
//! Every failure aborts the whole run. Errors carry the raw content reported
//! by the failing collaborator (git stderr, API body, CLI stderr) so the
//! operator sees exactly what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Configuration could not be loaded or is invalid
    #[error("Config error in {path}: {reason}")]
    Config {
        /// Config file involved
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// A hard precondition failed before any state-mutating step
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Filesystem failure while fingerprinting the project
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A version-control query exited non-zero or wrote to stderr
    #[error("git {command} failed: {stderr}")]
    GitQuery {
        /// Query that was issued (e.g. `log -n 5`)
        command: String,
        /// Raw stderr of the query
        stderr: String,
    },

    /// The last published version label has no usable number in it
    #[error("Cannot parse version label {label:?}: {reason}")]
    VersionParse {
        /// Raw label as reported by the deployment history
        label: String,
        /// Why it could not be parsed
        reason: String,
    },

    /// The deployment history could not be read
    #[error("History query for {platform} failed: {reason}")]
    History {
        /// Platform whose history was requested
        platform: String,
        /// Raw failure output
        reason: String,
    },

    /// The release host rejected the release request
    #[error("Release creation failed: {0}")]
    RemoteRelease(#[from] RemoteReleaseError),

    /// The deployment command failed
    #[error("Deployment of {platform} failed (exit code {exit_code:?}): {stderr}")]
    Deployment {
        /// Platform being deployed
        platform: String,
        /// Exit code, if the process exited normally
        exit_code: Option<i32>,
        /// Captured stderr
        stderr: String,
    },

    /// Operator interaction failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The operator cancelled the run
    #[error("Cancelled by user during {stage}")]
    Cancelled {
        /// Stage that observed the cancellation
        stage: String,
    },

    /// Writing to the terminal failed
    #[error("Terminal output error: {0}")]
    Terminal(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Failure shapes reported by the release host.
///
/// A duplicate tag is a [`RemoteReleaseError::Conflict`], never a silent
/// success, so that tag names stay idempotent identifiers.
#[derive(Error, Debug)]
pub enum RemoteReleaseError {
    /// A release with this tag already exists
    #[error("tag {tag} already exists: {body}")]
    Conflict {
        /// Tag that collided
        tag: String,
        /// Raw response body
        body: String,
    },

    /// The token was missing, invalid, or lacks permission
    #[error("unauthorized (HTTP {status}): {body}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request never produced an HTTP response
    #[error("network error: {0}")]
    Network(String),

    /// Any other rejection
    #[error("HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
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

    /// A required external tool is not installed
    #[error("Required tool not found in PATH: {tool}")]
    ToolNotFound {
        /// Tool name
        tool: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Build an IO error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a cancellation error for `stage`.
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Whether this error is an operator cancellation rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether this error is a duplicate-tag conflict from the release host
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::RemoteRelease(RemoteReleaseError::Conflict { .. })
        )
    }

    /// Process exit code for this failure category
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cli(_) | Self::Config { .. } | Self::Precondition(_) | Self::Prompt(_) => 2,
            Self::GitQuery { .. } => 3,
            Self::VersionParse { .. } => 4,
            Self::RemoteRelease(_) => 5,
            Self::Deployment { .. } => 6,
            Self::Io { .. } => 7,
            Self::History { .. } => 8,
            Self::Cancelled { .. } => 130,
            Self::Terminal(_) | Self::Json(_) | Self::Anyhow(_) => 1,
        }
    }
}
