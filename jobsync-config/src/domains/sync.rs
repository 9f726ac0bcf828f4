//! Reconciliation configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Validation and deletion settings for a sync
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Every execution step must start with this
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// When set, only orphaned jobs whose name starts with this are deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_prefix: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            deletion_prefix: None,
        }
    }
}

impl Validatable for SyncConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.command_prefix, "command_prefix", self.domain_name())?;

        if let Some(prefix) = &self.deletion_prefix {
            if prefix.is_empty() {
                return Err(self.validation_error(
                    "deletion_prefix cannot be empty, omit it to allow every orphan",
                ));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "sync"
    }
}

fn default_command_prefix() -> String {
    "dbt ".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.command_prefix, "dbt ");
        assert_eq!(config.deletion_prefix, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sync_config_validation() {
        let mut config = SyncConfig {
            deletion_prefix: Some(String::new()),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());

        config.deletion_prefix = Some("ci_".to_string());
        config.command_prefix = String::new();
        assert!(config.validate().is_err());
    }
}
