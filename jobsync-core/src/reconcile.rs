//! Reconciliation of desired job definitions against a remote store
//!
//! A sync runs in two phases. First every desired definition is created or
//! updated, account scope by account scope. Then each scope is listed again
//! and every remote job that no desired definition names is either deleted
//! or retained according to the [`DeletionPolicy`].

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{JobSyncError, Result};
use crate::job::JobDefinition;
use crate::merge::Merge;
use crate::store::JobStore;

/// Controls which orphaned jobs may be deleted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPolicy {
    pub allow_deletes: bool,
    /// Only orphans whose name starts with this prefix are eligible
    pub restrict_to_prefix: Option<String>,
}

impl DeletionPolicy {
    pub fn new(allow_deletes: bool) -> Self {
        Self {
            allow_deletes,
            restrict_to_prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.restrict_to_prefix = Some(prefix.into());
        self
    }

    /// Why an orphan named `name` must be kept, or `None` if it may be deleted
    pub fn retention_reason(&self, name: &str) -> Option<RetentionReason> {
        if !self.allow_deletes {
            return Some(RetentionReason::DeletesNotAllowed);
        }

        match &self.restrict_to_prefix {
            Some(prefix) if !name.starts_with(prefix.as_str()) => {
                Some(RetentionReason::OutsidePrefix {
                    prefix: prefix.clone(),
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RetentionReason {
    DeletesNotAllowed,
    OutsidePrefix { prefix: String },
}

impl fmt::Display for RetentionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionReason::DeletesNotAllowed => write!(f, "deletes are not allowed"),
            RetentionReason::OutsidePrefix { prefix } => {
                write!(f, "name does not start with `{}`", prefix)
            }
        }
    }
}

/// What happened to one desired definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Created { name: String, id: u64 },
    Updated { name: String, id: u64 },
    Unchanged { name: String, id: u64 },
}

impl JobOutcome {
    pub fn name(&self) -> &str {
        match self {
            JobOutcome::Created { name, .. }
            | JobOutcome::Updated { name, .. }
            | JobOutcome::Unchanged { name, .. } => name,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            JobOutcome::Created { id, .. }
            | JobOutcome::Updated { id, .. }
            | JobOutcome::Unchanged { id, .. } => *id,
        }
    }
}

/// What happened to one remote job that no desired definition names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OrphanOutcome {
    Deleted {
        account_scope_id: u64,
        name: String,
        id: u64,
    },
    Retained {
        account_scope_id: u64,
        name: String,
        id: Option<u64>,
        reason: RetentionReason,
    },
}

/// Result of a complete sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub jobs: Vec<JobOutcome>,
    pub orphans: Vec<OrphanOutcome>,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    pub retained: usize,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_job(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Created { .. } => self.created += 1,
            JobOutcome::Updated { .. } => self.updated += 1,
            JobOutcome::Unchanged { .. } => self.unchanged += 1,
        }
        self.jobs.push(outcome);
    }

    pub fn record_orphan(&mut self, outcome: OrphanOutcome) {
        match outcome {
            OrphanOutcome::Deleted { .. } => self.deleted += 1,
            OrphanOutcome::Retained { .. } => self.retained += 1,
        }
        self.orphans.push(outcome);
    }

    /// Whether the sync changed anything remotely
    pub fn has_changes(&self) -> bool {
        self.created + self.updated + self.deleted > 0
    }
}

/// Drives a [`JobStore`] towards a set of desired definitions
pub struct Reconciler<'a, S: JobStore + ?Sized> {
    store: &'a S,
    policy: DeletionPolicy,
}

impl<'a, S: JobStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S, policy: DeletionPolicy) -> Self {
        Self { store, policy }
    }

    /// Create, update and delete remote jobs so they match `desired`
    ///
    /// Stops at the first failed remote call. Changes already applied are
    /// not rolled back.
    pub async fn sync(&self, desired: &[JobDefinition]) -> Result<SyncReport> {
        let duplicates = duplicate_names(desired);
        if !duplicates.is_empty() {
            return Err(JobSyncError::DuplicateName { names: duplicates });
        }

        let mut by_scope: BTreeMap<u64, Vec<&JobDefinition>> = BTreeMap::new();
        for definition in desired {
            by_scope
                .entry(definition.account_scope_id)
                .or_default()
                .push(definition);
        }

        let mut report = SyncReport::new();

        for (scope, definitions) in &by_scope {
            let observed = self.store.list(*scope).await?;
            debug!("Account {} has {} remote job(s)", scope, observed.len());

            let mut by_name: HashMap<&str, &JobDefinition> = HashMap::new();
            for job in &observed {
                by_name.entry(job.name.as_str()).or_insert(job);
            }

            for definition in definitions {
                let existing = by_name.get(definition.name.as_str()).copied();
                let outcome = self.reconcile_definition(definition, existing).await?;
                report.record_job(outcome);
            }
        }

        for (scope, definitions) in &by_scope {
            let names: BTreeSet<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
            self.remove_orphans(*scope, &names, &mut report).await?;
        }

        info!(
            "Sync completed: {} created, {} updated, {} unchanged, {} deleted, {} retained",
            report.created, report.updated, report.unchanged, report.deleted, report.retained
        );

        Ok(report)
    }

    /// Bring one remote job in line with `desired`
    ///
    /// `existing` is the remote job with the same name, if any.
    pub async fn reconcile_definition(
        &self,
        desired: &JobDefinition,
        existing: Option<&JobDefinition>,
    ) -> Result<JobOutcome> {
        let scope = desired.account_scope_id;

        let Some(existing) = existing else {
            let mut payload = desired.clone();
            payload.id = None;

            let id = self.store.create(scope, &payload).await?;
            info!("Created job `{}` (id: {})", desired.name, id);
            return Ok(JobOutcome::Created {
                name: desired.name.clone(),
                id,
            });
        };

        let id = existing
            .id
            .ok_or_else(|| JobSyncError::MissingRemoteId(existing.name.clone()))?;

        let mut overlay = desired.clone();
        overlay.id = Some(id);
        let merged = existing.merge(&overlay);

        if merged == *existing {
            debug!("Job `{}` (id: {}) is up to date", desired.name, id);
            return Ok(JobOutcome::Unchanged {
                name: desired.name.clone(),
                id,
            });
        }

        self.store.update(scope, id, &merged).await?;
        info!("Updated job `{}` (id: {})", desired.name, id);
        Ok(JobOutcome::Updated {
            name: desired.name.clone(),
            id,
        })
    }

    async fn remove_orphans(
        &self,
        scope: u64,
        desired_names: &BTreeSet<&str>,
        report: &mut SyncReport,
    ) -> Result<()> {
        let observed = self.store.list(scope).await?;

        for job in observed
            .iter()
            .filter(|job| !desired_names.contains(job.name.as_str()))
        {
            if let Some(reason) = self.policy.retention_reason(&job.name) {
                warn!(
                    "Job `{}` (id: {}) exists in account {} but is not defined locally, retaining it: {}",
                    job.name,
                    job.id.map(|id| id.to_string()).unwrap_or_else(|| "unknown".to_string()),
                    scope,
                    reason
                );
                report.record_orphan(OrphanOutcome::Retained {
                    account_scope_id: scope,
                    name: job.name.clone(),
                    id: job.id,
                    reason,
                });
                continue;
            }

            let id = job
                .id
                .ok_or_else(|| JobSyncError::MissingRemoteId(job.name.clone()))?;
            self.store.delete(scope, id).await?;
            info!("Deleted job `{}` (id: {})", job.name, id);
            report.record_orphan(OrphanOutcome::Deleted {
                account_scope_id: scope,
                name: job.name.clone(),
                id,
            });
        }

        Ok(())
    }
}

fn duplicate_names(definitions: &[JobDefinition]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for definition in definitions {
        *counts.entry(definition.name.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}
