//! Remote job store abstraction

use async_trait::async_trait;
use thiserror::Error;

use crate::job::JobDefinition;

/// Errors raised by a [`JobStore`] implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store answered with a non-success status
    #[error("Remote store returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for job store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Remote system holding the observed job definitions
///
/// Every call is scoped to an account. Implementations perform one blocking
/// round trip per call and do not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// All jobs currently defined in `account_scope_id`
    async fn list(&self, account_scope_id: u64) -> StoreResult<Vec<JobDefinition>>;

    /// Create a job, returning the identifier the store assigned
    async fn create(&self, account_scope_id: u64, definition: &JobDefinition) -> StoreResult<u64>;

    /// Replace the job `id` with `definition`
    async fn update(
        &self,
        account_scope_id: u64,
        id: u64,
        definition: &JobDefinition,
    ) -> StoreResult<()>;

    async fn delete(&self, account_scope_id: u64, id: u64) -> StoreResult<()>;
}
