//! Integration tests for jobsync-config

use jobsync_config::*;
use std::io::Write;
use std::time::Duration;
use temp_env::{with_vars, with_vars_unset};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_default_config_validation() {
    let config = JobSyncConfig::default();
    assert!(config.validate_all().is_ok());
    assert_eq!(config.api.base_url, "https://cloud.getdbt.com");
    assert_eq!(config.sync.command_prefix, "dbt ");
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("JOBSYNC_API_BASE_URL", Some("https://emea.example.com")),
        ("JOBSYNC_API_TOKEN", Some("token-123")),
        ("JOBSYNC_HTTP_TIMEOUT", Some("60")),
        ("JOBSYNC_LOG_LEVEL", Some("debug")),
        ("JOBSYNC_LOG_FORMAT", Some("json")),
        ("JOBSYNC_COMMAND_PREFIX", Some("tool ")),
        ("JOBSYNC_DELETION_PREFIX", Some("ci_")),
    ];

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();

        assert_eq!(config.api.base_url, "https://emea.example.com");
        assert_eq!(config.api.token(), Some("token-123"));
        assert_eq!(config.http.timeout, Duration::from_secs(60));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.sync.command_prefix, "tool ");
        assert_eq!(config.sync.deletion_prefix.as_deref(), Some("ci_"));
    });
}

#[test]
fn test_invalid_env_override() {
    with_vars(vec![("JOBSYNC_HTTP_TIMEOUT", Some("soon"))], || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
    });

    with_vars(vec![("JOBSYNC_LOG_FORMAT", Some("xml"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });
}

#[test]
fn test_load_picks_file_or_environment() {
    let file = write_config("api:\n  base_url: \"https://file.example.com\"\n");

    with_vars(
        vec![("JOBSYNC_API_BASE_URL", Some("https://env.example.com"))],
        || {
            let from_env = ConfigLoader::new().load(None::<&std::path::Path>).unwrap();
            assert_eq!(from_env.api.base_url, "https://env.example.com");
        },
    );

    with_vars_unset(vec!["JOBSYNC_API_BASE_URL"], || {
        let from_file = ConfigLoader::new().load(Some(file.path())).unwrap();
        assert_eq!(from_file.api.base_url, "https://file.example.com");
    });
}

#[test]
fn test_yaml_config_serialization() {
    let yaml = JobSyncConfig::generate_sample();
    assert!(yaml.contains("command_prefix"));

    let parsed: JobSyncConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
}

#[test]
fn test_config_file_with_env_overrides() {
    let file = write_config(
        r#"
api:
  base_url: "https://au.example.com"
http:
  timeout: 45
  user_agent: "Test Agent"
  verify_ssl: false
logging:
  level: warn
  format: compact
sync:
  deletion_prefix: "team_"
"#,
    );

    with_vars(
        vec![
            ("JOBSYNC_HTTP_TIMEOUT", Some("5")),
            ("JOBSYNC_API_TOKEN", None::<&str>),
        ],
        || {
            let config = ConfigLoader::new().load(Some(file.path())).unwrap();

            assert_eq!(config.api.base_url, "https://au.example.com");
            assert_eq!(config.api.token(), None);
            assert_eq!(config.http.timeout, Duration::from_secs(5));
            assert_eq!(config.http.user_agent, "Test Agent");
            assert!(!config.http.verify_ssl);
            assert_eq!(config.http.max_redirects, 10);
            assert_eq!(config.logging.level, LogLevel::Warn);
            assert_eq!(config.logging.format, LogFormat::Compact);
            assert_eq!(config.sync.command_prefix, "dbt ");
            assert_eq!(config.sync.deletion_prefix.as_deref(), Some("team_"));
        },
    );
}

#[test]
fn test_invalid_config_file_is_rejected() {
    with_vars_unset(["JOBSYNC_API_BASE_URL", "JOBSYNC_HTTP_TIMEOUT"], || {
        let file = write_config("api:\n  base_url: \"not a url\"\n");
        let err = ConfigLoader::new().from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DomainError { ref domain, .. } if domain == "api"));

        let file = write_config("http: [1, 2]\n");
        assert!(matches!(
            ConfigLoader::new().from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    });
}

#[test]
fn test_missing_config_file() {
    let err = ConfigLoader::new()
        .load(Some("/definitely/not/here.yml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileReadError(_)));
}
