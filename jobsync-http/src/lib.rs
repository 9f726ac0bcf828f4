//! HTTP client functionality for jobsync
//!
//! Provides [`HttpJobStore`], a [`jobsync_core::JobStore`] backed by the
//! remote job API, configured from the `jobsync-config` domains.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-export main types for convenience
pub use client::HttpJobStore;
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::HttpMethod;
