//! Domain-driven configuration management for jobsync
//!
//! Configuration is split by functional domain, loaded from an optional
//! YAML file, overridden from `JOBSYNC_*` environment variables and then
//! validated domain by domain.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    api::ApiConfig,
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    sync::SyncConfig,
    JobSyncConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration;
