//! Deep merge of job definitions
//!
//! Merging an overlay into a base keeps every base field the overlay does
//! not set, recurses into nested records present on both sides, and lets
//! the overlay replace scalars and sequences wholesale. An explicit `null`
//! in the overlay is a value like any other and clears the base field.
//! Reconciliation uses `existing.merge(&desired)` both as the update
//! payload and to detect updates that would change nothing.

use serde_json::Value as JsonValue;

use crate::job::{
    ExtraFields, JobDefinition, JobExecution, JobSettings, JobTriggers, Schedule, ScheduleDate,
    ScheduleTime,
};

/// Types that can absorb an overlay of the same type
pub trait Merge {
    /// Return a new value with `overlay` merged on top of `self`
    fn merge(&self, overlay: &Self) -> Self;
}

fn pick<T: Clone>(base: &Option<T>, overlay: &Option<T>) -> Option<T> {
    overlay.clone().or_else(|| base.clone())
}

fn merge_nullable<T: Merge + Clone>(
    base: &Option<Option<T>>,
    overlay: &Option<Option<T>>,
) -> Option<Option<T>> {
    match (base, overlay) {
        (Some(Some(base)), Some(Some(overlay))) => Some(Some(base.merge(overlay))),
        _ => pick(base, overlay),
    }
}

/// Deep merge two JSON values
///
/// Objects merge key by key; any other overlay value replaces the base.
pub fn merge_json(base: &JsonValue, overlay: &JsonValue) -> JsonValue {
    match (base, overlay) {
        (JsonValue::Object(base), JsonValue::Object(overlay)) => {
            JsonValue::Object(merge_extra(base, overlay))
        }
        _ => overlay.clone(),
    }
}

/// Deep merge two extra-field bags
pub fn merge_extra(base: &ExtraFields, overlay: &ExtraFields) -> ExtraFields {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let value = match base.get(key) {
            Some(existing) => merge_json(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

impl Merge for JobDefinition {
    fn merge(&self, overlay: &Self) -> Self {
        JobDefinition {
            id: pick(&self.id, &overlay.id),
            name: overlay.name.clone(),
            account_scope_id: overlay.account_scope_id,
            project_id: overlay.project_id,
            environment_id: overlay.environment_id,
            execution_steps: overlay.execution_steps.clone(),
            schedule: self.schedule.merge(&overlay.schedule),
            settings: self.settings.merge(&overlay.settings),
            triggers: self.triggers.merge(&overlay.triggers),
            generate_sources: pick(&self.generate_sources, &overlay.generate_sources),
            run_generate_sources: pick(&self.run_generate_sources, &overlay.run_generate_sources),
            generate_docs: pick(&self.generate_docs, &overlay.generate_docs),
            deactivated: pick(&self.deactivated, &overlay.deactivated),
            is_deferrable: pick(&self.is_deferrable, &overlay.is_deferrable),
            lifecycle_webhooks: pick(&self.lifecycle_webhooks, &overlay.lifecycle_webhooks),
            lifecycle_webhooks_url: pick(
                &self.lifecycle_webhooks_url,
                &overlay.lifecycle_webhooks_url,
            ),
            description: pick(&self.description, &overlay.description),
            dbt_version: pick(&self.dbt_version, &overlay.dbt_version),
            deferring_environment_id: pick(
                &self.deferring_environment_id,
                &overlay.deferring_environment_id,
            ),
            deferring_job_definition_id: pick(
                &self.deferring_job_definition_id,
                &overlay.deferring_job_definition_id,
            ),
            run_failure_count: pick(&self.run_failure_count, &overlay.run_failure_count),
            execution: merge_nullable(&self.execution, &overlay.execution),
            job_type: pick(&self.job_type, &overlay.job_type),
            state: pick(&self.state, &overlay.state),
            extra: merge_extra(&self.extra, &overlay.extra),
        }
    }
}

impl Merge for Schedule {
    fn merge(&self, overlay: &Self) -> Self {
        Schedule {
            cron: pick(&self.cron, &overlay.cron),
            date: self.date.merge(&overlay.date),
            time: self.time.merge(&overlay.time),
            extra: merge_extra(&self.extra, &overlay.extra),
        }
    }
}

// Same variant: typed fields from the overlay, extra bags deep-merged.
// Different variant: the overlay replaces the base.
impl Merge for ScheduleDate {
    fn merge(&self, overlay: &Self) -> Self {
        match (self, overlay) {
            (
                ScheduleDate::DaysOfWeek { extra: base, .. },
                ScheduleDate::DaysOfWeek { days, extra },
            ) => ScheduleDate::DaysOfWeek {
                days: days.clone(),
                extra: merge_extra(base, extra),
            },
            (
                ScheduleDate::CustomCron { extra: base, .. },
                ScheduleDate::CustomCron { cron, extra },
            ) => ScheduleDate::CustomCron {
                cron: cron.clone(),
                extra: merge_extra(base, extra),
            },
            _ => overlay.clone(),
        }
    }
}

impl Merge for ScheduleTime {
    fn merge(&self, overlay: &Self) -> Self {
        match (self, overlay) {
            (
                ScheduleTime::EveryHour { extra: base, .. },
                ScheduleTime::EveryHour { interval, extra },
            ) => ScheduleTime::EveryHour {
                interval: *interval,
                extra: merge_extra(base, extra),
            },
            (
                ScheduleTime::AtExactHours { extra: base, .. },
                ScheduleTime::AtExactHours { hours, extra },
            ) => ScheduleTime::AtExactHours {
                hours: hours.clone(),
                extra: merge_extra(base, extra),
            },
            _ => overlay.clone(),
        }
    }
}

impl Merge for JobSettings {
    fn merge(&self, overlay: &Self) -> Self {
        JobSettings {
            threads: pick(&self.threads, &overlay.threads),
            target_name: pick(&self.target_name, &overlay.target_name),
            extra: merge_extra(&self.extra, &overlay.extra),
        }
    }
}

impl Merge for JobTriggers {
    fn merge(&self, overlay: &Self) -> Self {
        JobTriggers {
            github_webhook: pick(&self.github_webhook, &overlay.github_webhook),
            schedule: pick(&self.schedule, &overlay.schedule),
            custom_branch_only: pick(&self.custom_branch_only, &overlay.custom_branch_only),
            on_draft_pr: pick(&self.on_draft_pr, &overlay.on_draft_pr),
            extra: merge_extra(&self.extra, &overlay.extra),
        }
    }
}

impl Merge for JobExecution {
    fn merge(&self, overlay: &Self) -> Self {
        JobExecution {
            timeout_seconds: pick(&self.timeout_seconds, &overlay.timeout_seconds),
            extra: merge_extra(&self.extra, &overlay.extra),
        }
    }
}
