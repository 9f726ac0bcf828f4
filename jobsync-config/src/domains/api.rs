//! Remote job API configuration

use crate::error::ConfigResult;
use crate::validation::{validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the remote job store lives and how to authenticate against it
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the job API, without the `/api/v2` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token, only ever read from the environment
    #[serde(skip)]
    pub token: Option<String>,
}

impl ApiConfig {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Validatable for ApiConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.base_url, "base_url", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "api"
    }
}

fn default_base_url() -> String {
    "https://cloud.getdbt.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_never_serialized() {
        let config = ApiConfig {
            base_url: "https://jobs.example.com".to_string(),
            token: Some("secret".to_string()),
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_token_from_file_is_ignored() {
        let config: ApiConfig = serde_yaml::from_str("token: secret\n").unwrap();
        assert_eq!(config.token(), None);
        assert_eq!(config.base_url, "https://cloud.getdbt.com");
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let config = ApiConfig {
            token: Some(String::new()),
            ..ApiConfig::default()
        };
        assert_eq!(config.token(), None);
    }

    #[test]
    fn test_api_config_validation() {
        let mut config = ApiConfig::default();
        assert!(config.validate().is_ok());

        config.base_url = "cloud.getdbt.com".to_string();
        assert!(config.validate().is_err());
    }
}
