//! Error types.
//!
//! Library code returns [`PipelineError`]; the binary converts it into an
//! [`AppError`] carrying the process exit code.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while acquiring, merging, splitting or evaluating tables.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    FetchFailed { status: StatusCode, url: String },

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("transport error while requesting {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response from {url}: {reason}")]
    MalformedPayload { url: String, reason: String },

    /// A dimension table contains the same join key more than once.
    #[error("ambiguous join key in `{table}`: {column}={key} appears more than once")]
    AmbiguousJoinKey {
        table: String,
        column: String,
        key: String,
    },

    #[error("table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("non-numeric value in column `{column}` at row {row}")]
    NonNumeric { column: String, row: usize },

    #[error("invalid split fractions: train={train}, validate={validate}")]
    InvalidSplit { train: f64, validate: f64 },

    #[error("cannot parse timestamp '{value}' in column `{column}`")]
    InvalidTimestamp { column: String, value: String },

    #[error("snapshot '{}': {message}", path.display())]
    Snapshot { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[cfg(feature = "mysql")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PipelineError {
    /// Process exit code used by the `tsa` binary for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Config(_) | PipelineError::InvalidSplit { .. } => 2,
            PipelineError::AmbiguousJoinKey { .. }
            | PipelineError::MissingColumn { .. }
            | PipelineError::ShapeMismatch(_)
            | PipelineError::NonNumeric { .. }
            | PipelineError::InvalidTimestamp { .. } => 3,
            PipelineError::FetchFailed { .. }
            | PipelineError::Transport { .. }
            | PipelineError::MalformedPayload { .. } => 4,
            PipelineError::Snapshot { .. } => 5,
            #[cfg(feature = "mysql")]
            PipelineError::Database(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
