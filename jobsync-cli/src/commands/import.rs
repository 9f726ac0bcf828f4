//! Import remote jobs into a new definitions file

use anyhow::Result;
use jobsync_core::{DefinitionSource, JobStore};
use tracing::info;

use crate::error::CliError;

/// Write every job of `account_scope_id` to `source`, returning how many were saved
///
/// Identifiers are stripped since jobs are matched by name.
pub async fn import_jobs(
    store: &dyn JobStore,
    account_scope_id: u64,
    source: &DefinitionSource,
) -> Result<usize> {
    if source.exists() {
        return Err(CliError::ResourceAlreadyExists(format!(
            "{} already exists, please choose a different file name.",
            source.path().display()
        ))
        .into());
    }

    let mut jobs = store.list(account_scope_id).await?;
    for job in &mut jobs {
        job.id = None;
    }

    info!("Saving job definitions to `{}`", source.path().display());
    source.save(&jobs)?;
    Ok(jobs.len())
}
