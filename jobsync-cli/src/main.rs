use anyhow::{Context, Result};
use clap::Parser;
use jobsync_cli::logging::init_tracing;
use jobsync_cli::{run, Cli};
use jobsync_config::{ConfigLoader, JobSyncConfig};
use std::path::PathBuf;
use tracing::{error, info};

/// Load configuration from `--config` when given, the environment otherwise
fn load_config(config_path: Option<&PathBuf>) -> Result<JobSyncConfig> {
    ConfigLoader::new().load(config_path).with_context(|| match config_path {
        Some(path) => format!("Failed to load configuration from {:?}", path),
        None => "Failed to load configuration from environment".to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Reject unusable flag combinations before touching any file
    cli.operation()?;

    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.logging, cli.log_level.as_deref())?;

    info!("Running jobsync ({})", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&cli, &config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
