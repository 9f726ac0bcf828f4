//! CLI error types

use thiserror::Error;

/// Errors raised before any job is validated or synced
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The combination of flags is not usable
    #[error("{0}")]
    InvalidArguments(String),

    /// A file that must exist does not
    #[error("{0}")]
    ResourceNotFound(String),

    /// A file that must not exist does
    #[error("{0}")]
    ResourceAlreadyExists(String),
}
