//! Sync validated definitions to the remote API

use anyhow::Result;
use jobsync_core::{
    DefinitionSource, DeletionPolicy, JobDefinition, JobStore, OrphanOutcome, Reconciler,
    RetentionReason, SyncReport,
};
use tracing::{info, warn};

/// Reconcile `definitions` against `store` and log a summary
pub async fn sync_jobs(
    store: &dyn JobStore,
    definitions: &[JobDefinition],
    policy: DeletionPolicy,
    source: &DefinitionSource,
) -> Result<SyncReport> {
    let report = Reconciler::new(store, policy).sync(definitions).await?;

    let blocked = report.orphans.iter().any(|orphan| {
        matches!(
            orphan,
            OrphanOutcome::Retained {
                reason: RetentionReason::DeletesNotAllowed,
                ..
            }
        )
    });
    if blocked {
        warn!(
            "Some remote jobs are not defined in `{}`. Pass `--allow-deletes` to delete them.",
            source.path().display()
        );
    }

    info!(
        "{} created, {} updated, {} unchanged, {} deleted, {} retained",
        report.created, report.updated, report.unchanged, report.deleted, report.retained
    );

    Ok(report)
}
