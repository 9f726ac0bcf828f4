//! Tracing subscriber setup

use anyhow::{anyhow, Result};
use jobsync_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Pick the filter: `--log-level` first, then `RUST_LOG`, then the configured level
pub fn env_filter(config: &LoggingConfig, cli_level: Option<&str>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'info'", level);
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str())),
    }
}

/// Install the global subscriber, writing to stderr in the configured format
pub fn init_tracing(config: &LoggingConfig, cli_level: Option<&str>) -> Result<()> {
    let filter = env_filter(config, cli_level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobsync_config::LogLevel;

    #[test]
    fn test_cli_level_wins() {
        let config = LoggingConfig {
            level: LogLevel::Error,
            ..LoggingConfig::default()
        };
        assert_eq!(env_filter(&config, Some("debug")).to_string(), "debug");
    }

    #[test]
    fn test_invalid_cli_level_falls_back_to_info() {
        let filter = env_filter(&LoggingConfig::default(), Some("jobsync=loud"));
        assert_eq!(filter.to_string(), "info");
    }
}
