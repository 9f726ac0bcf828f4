//! Domain-specific configuration modules

pub mod api;
pub mod http;
pub mod logging;
pub mod sync;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main jobsync configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobSyncConfig {
    /// Remote job API
    #[serde(default)]
    pub api: api::ApiConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    #[serde(default)]
    pub logging: logging::LoggingConfig,

    /// Validation and deletion settings
    #[serde(default)]
    pub sync: sync::SyncConfig,
}

impl JobSyncConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        self.sync.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = JobSyncConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
