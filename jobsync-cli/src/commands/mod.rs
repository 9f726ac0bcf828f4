//! Command implementations

pub mod import;
pub mod sync;
pub mod validate;

use anyhow::{Context, Result};
use jobsync_config::JobSyncConfig;
use jobsync_core::{DefinitionSource, DeletionPolicy, JobValidator};
use jobsync_http::HttpJobStore;
use tracing::{info, warn};

use crate::cli::{Cli, Operation};

/// Run the operation selected by `cli`
pub async fn run(cli: &Cli, config: &JobSyncConfig) -> Result<()> {
    match cli.operation()? {
        Operation::Import {
            account_scope_id,
            file,
        } => {
            info!("Operation: import");
            let store = remote_store(config)?;
            import::import_jobs(&store, account_scope_id, &DefinitionSource::new(file)).await?;
        }
        Operation::Validate { file } => {
            info!("Operation: validate");
            let source = DefinitionSource::new(&file);
            validate::validate_file(&validator(config)?, &source)?;
            warn!(
                "Pass `--sync` to sync the jobs defined in `{}` to the remote API.",
                file.display()
            );
        }
        Operation::Sync { file } => {
            info!("Operation: sync");
            let source = DefinitionSource::new(&file);
            let definitions = validate::validate_file(&validator(config)?, &source)?;
            let store = remote_store(config)?;
            sync::sync_jobs(&store, &definitions, deletion_policy(cli, config), &source).await?;
        }
    }

    Ok(())
}

/// Deletion rules for a sync, the CLI prefix taking precedence over configuration
pub fn deletion_policy(cli: &Cli, config: &JobSyncConfig) -> DeletionPolicy {
    DeletionPolicy {
        allow_deletes: cli.allow_deletes,
        restrict_to_prefix: cli
            .restrict_deletes_to_prefix
            .clone()
            .or_else(|| config.sync.deletion_prefix.clone()),
    }
}

fn validator(config: &JobSyncConfig) -> Result<JobValidator> {
    JobValidator::with_command_prefix(config.sync.command_prefix.as_str())
        .context("Failed to build job validator")
}

fn remote_store(config: &JobSyncConfig) -> Result<HttpJobStore> {
    HttpJobStore::from_config(config).with_context(|| {
        format!(
            "Failed to create API client for {}, is JOBSYNC_API_TOKEN set?",
            config.api.base_url
        )
    })
}
