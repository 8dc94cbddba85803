//! Benchmark error types

use std::path::PathBuf;
use thiserror::Error;

use kvmesh_core::ConfigError;

/// Errors that stop a benchmark before or after the run
///
/// Failures of individual requests are never errors; they are recorded in
/// the report instead.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Benchmark configuration is malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No ports to send requests to
    #[error("No candidate ports configured")]
    NoCandidatePorts,

    /// The report cannot be written where requested
    #[error("Report path {path} is unusable: {reason}")]
    OutputPath { path: PathBuf, reason: String },

    /// Writing the report failed
    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl BenchError {
    /// Get an error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            BenchError::Config(err) => err.error_code(),
            BenchError::NoCandidatePorts => "NO_CANDIDATE_PORTS",
            BenchError::OutputPath { .. } => "OUTPUT_PATH",
            BenchError::ReportWrite { .. } => "REPORT_WRITE",
            BenchError::Serialization(_) => "SERIALIZATION_ERROR",
            BenchError::Client(_) => "HTTP_CLIENT",
        }
    }

    /// Whether the error concerns persisting the report
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            BenchError::OutputPath { .. } | BenchError::ReportWrite { .. } | BenchError::Serialization(_)
        )
    }
}

/// A request that never produced an HTTP response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

/// Result type for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;
