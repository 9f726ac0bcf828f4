//! Core error types for jobsync

use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;
use crate::validation::ValidationReport;

/// Core error type for validation and reconciliation
#[derive(Debug, Error)]
pub enum JobSyncError {
    /// One or more job definitions violate the schema
    #[error("{0}")]
    Validation(ValidationReport),

    /// Two or more desired definitions share a name
    #[error("Job names must be unique, duplicated: {}", .names.join(", "))]
    DuplicateName { names: Vec<String> },

    /// The remote job store rejected or failed a call
    #[error("Remote call failed: {0}")]
    Remote(#[from] StoreError),

    /// An observed job came back without an identifier
    #[error("Remote job `{0}` has no id")]
    MissingRemoteId(String),

    /// Reading or writing a definitions document failed
    #[error("Definitions file {path}: {message}")]
    Source { path: PathBuf, message: String },

    /// The built-in job schema failed to compile
    #[error("Invalid job schema: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for jobsync core operations
pub type Result<T> = std::result::Result<T, JobSyncError>;

impl From<ValidationReport> for JobSyncError {
    fn from(report: ValidationReport) -> Self {
        JobSyncError::Validation(report)
    }
}

impl JobSyncError {
    /// Short machine-readable code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            JobSyncError::Validation(_) => "VALIDATION_ERROR",
            JobSyncError::DuplicateName { .. } => "DUPLICATE_NAME",
            JobSyncError::Remote(_) => "REMOTE_CALL_ERROR",
            JobSyncError::MissingRemoteId(_) => "MISSING_REMOTE_ID",
            JobSyncError::Source { .. } => "SOURCE_ERROR",
            JobSyncError::Schema(_) => "SCHEMA_ERROR",
            JobSyncError::Io(_) => "IO_ERROR",
            JobSyncError::Yaml(_) => "YAML_ERROR",
            JobSyncError::Json(_) => "JSON_ERROR",
        }
    }
}
