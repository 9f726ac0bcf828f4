//! Core domain models and logic for jobsync
//!
//! This crate defines job definitions, validates definitions documents,
//! merges desired state onto observed state, and reconciles a remote
//! [`JobStore`] against a set of desired definitions. Transport and
//! configuration live in sibling crates.

pub mod error;
pub mod job;
pub mod merge;
pub mod reconcile;
pub mod source;
pub mod store;
pub mod validation;

// Re-export commonly used types at the crate root
pub use error::{JobSyncError, Result};
pub use job::{
    JobDefinition, JobDefinitionsFile, JobExecution, JobSettings, JobState, JobTriggers, JobType,
    Schedule, ScheduleDate, ScheduleTime,
};
pub use merge::{merge_json, Merge};
pub use reconcile::{
    DeletionPolicy, JobOutcome, OrphanOutcome, Reconciler, RetentionReason, SyncReport,
};
pub use source::DefinitionSource;
pub use store::{JobStore, StoreError, StoreResult};
pub use validation::{JobValidator, ValidationReport, Violation, DEFAULT_COMMAND_PREFIX};
