//! Job definition model
//!
//! A [`JobDefinition`] is either desired state (parsed from a definitions
//! document) or observed state (decoded from the remote store). Fields the
//! model does not know about are kept verbatim in `extra` bags so that
//! server-populated data round-trips through a merge untouched.
//!
//! Fields the remote API accepts `null` for are `Option<Option<T>>`: the
//! outer `None` means the key is absent, `Some(None)` is an explicit `null`
//! that clears the remote value when merged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Default number of threads when `settings.threads` is absent
pub const DEFAULT_THREADS: u32 = 1;

/// Default target name when `settings.target_name` is absent
pub const DEFAULT_TARGET_NAME: &str = "default";

/// Default cron expression for custom cron schedules
pub const DEFAULT_CRON: &str = "0 * * * *";

/// Allowed values for `schedule.time.interval`
pub const HOUR_INTERVALS: [u8; 7] = [1, 2, 3, 4, 6, 8, 12];

/// Unknown fields carried alongside a typed record
pub type ExtraFields = Map<String, JsonValue>;

/// One schedulable job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Remote identifier, only known for jobs that exist remotely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    pub name: String,

    pub account_scope_id: u64,

    pub project_id: u64,

    pub environment_id: u64,

    pub execution_steps: Vec<String>,

    pub schedule: Schedule,

    pub settings: JobSettings,

    pub triggers: JobTriggers,

    /// Alias of `run_generate_sources`, both must agree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_sources: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_generate_sources: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_docs: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deferrable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_webhooks: Option<bool>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub lifecycle_webhooks_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub dbt_version: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deferring_environment_id: Option<Option<u64>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deferring_job_definition_id: Option<Option<u64>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub run_failure_count: Option<Option<u64>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub execution: Option<Option<JobExecution>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<Option<JobType>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<JobState>>,

    /// Server-populated and forward-compatible fields
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl JobDefinition {
    /// Effective thread count
    pub fn threads(&self) -> u32 {
        self.settings.threads.unwrap_or(DEFAULT_THREADS)
    }

    /// Effective target name
    pub fn target_name(&self) -> &str {
        self.settings
            .target_name
            .as_deref()
            .unwrap_or(DEFAULT_TARGET_NAME)
    }

    /// Whether source freshness runs as the first step
    pub fn generates_sources(&self) -> bool {
        self.generate_sources
            .or(self.run_generate_sources)
            .unwrap_or(false)
    }
}

/// When a job runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,

    pub date: ScheduleDate,

    pub time: ScheduleTime,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Which days a schedule is active on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleDate {
    /// Days of the week, 0 = Sunday
    DaysOfWeek {
        days: Vec<u8>,
        #[serde(flatten)]
        extra: ExtraFields,
    },
    CustomCron {
        #[serde(default = "default_cron")]
        cron: String,
        #[serde(flatten)]
        extra: ExtraFields,
    },
}

/// Which hours a schedule fires at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleTime {
    /// Every `interval` hours, one of [`HOUR_INTERVALS`]
    EveryHour {
        interval: u8,
        #[serde(flatten)]
        extra: ExtraFields,
    },
    /// Hours of the day, 0-indexed
    AtExactHours {
        hours: Vec<u8>,
        #[serde(flatten)]
        extra: ExtraFields,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// What starts a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTriggers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_webhook: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_branch_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_draft_pr: Option<bool>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobExecution {
    /// Seconds before a run is cancelled, 0 disables the limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Ci,
    Other,
    Scheduled,
}

/// Lifecycle state, encoded as `1` (active) or `2` (deleted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum JobState {
    Active,
    Deleted,
}

impl TryFrom<u8> for JobState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(JobState::Active),
            2 => Ok(JobState::Deleted),
            other => Err(format!("Invalid job state: {} (expected 1 or 2)", other)),
        }
    }
}

impl From<JobState> for u8 {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Active => 1,
            JobState::Deleted => 2,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Active => write!(f, "active"),
            JobState::Deleted => write!(f, "deleted"),
        }
    }
}

/// Persisted `{jobs: [...]}` document layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDefinitionsFile {
    pub jobs: Vec<JobDefinition>,
}

fn default_cron() -> String {
    DEFAULT_CRON.to_string()
}

/// Keep an explicit `null` apart from a missing key
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn observed() -> JsonValue {
        json!({
            "id": 17,
            "name": "nightly",
            "account_scope_id": 1,
            "project_id": 2,
            "environment_id": 3,
            "execution_steps": ["dbt build"],
            "schedule": {
                "cron": "0 3 * * *",
                "date": {"type": "days_of_week", "days": [1, 2, 3]},
                "time": {"type": "at_exact_hours", "hours": [3]}
            },
            "settings": {"threads": 4},
            "triggers": {"schedule": true, "git_provider_webhook": false},
            "state": 1,
            "job_type": "scheduled",
            "created_at": "2024-01-01T00:00:00Z",
            "cron_humanized": "At 03:00"
        })
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = observed();
        let job: JobDefinition = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(job.extra.get("cron_humanized"), Some(&json!("At 03:00")));
        assert_eq!(
            job.triggers.extra.get("git_provider_webhook"),
            Some(&json!(false))
        );
        assert_eq!(serde_json::to_value(&job).unwrap(), raw);
    }

    #[test]
    fn test_defaults_apply_when_absent() {
        let mut raw = observed();
        raw["settings"] = json!({});
        let job: JobDefinition = serde_json::from_value(raw).unwrap();

        assert_eq!(job.threads(), DEFAULT_THREADS);
        assert_eq!(job.target_name(), DEFAULT_TARGET_NAME);
        assert!(!job.generates_sources());
    }

    #[test]
    fn test_custom_cron_defaults_expression() {
        let date: ScheduleDate = serde_json::from_value(json!({"type": "custom_cron"})).unwrap();
        assert_eq!(
            date,
            ScheduleDate::CustomCron {
                cron: DEFAULT_CRON.to_string(),
                extra: ExtraFields::new(),
            }
        );
    }

    #[test]
    fn test_schedule_union_keeps_unknown_fields() {
        let mut raw = observed();
        raw["schedule"]["date"] = json!({"type": "days_of_week", "days": [1, 2, 3], "cron": null});
        raw["schedule"]["time"] =
            json!({"type": "at_exact_hours", "hours": [6, 18], "interval": null, "server_hint": "x"});

        let job: JobDefinition = serde_json::from_value(raw.clone()).unwrap();
        match &job.schedule.time {
            ScheduleTime::AtExactHours { hours, extra } => {
                assert_eq!(hours, &vec![6, 18]);
                assert_eq!(extra.get("server_hint"), Some(&json!("x")));
            }
            other => panic!("expected exact hours, got {:?}", other),
        }
        assert_eq!(serde_json::to_value(&job).unwrap(), raw);
    }

    #[test]
    fn test_explicit_null_differs_from_missing_key() {
        let mut raw = observed();
        raw["description"] = JsonValue::Null;
        let job: JobDefinition = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(job.description, Some(None));
        assert_eq!(job.deferring_environment_id, None);
        assert_eq!(job.state, Some(Some(JobState::Active)));
        assert_eq!(serde_json::to_value(&job).unwrap(), raw);
    }

    #[test]
    fn test_job_state_encoding() {
        let state: JobState = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(state, JobState::Deleted);
        assert_eq!(serde_json::to_value(JobState::Active).unwrap(), json!(1));
        assert!(serde_json::from_value::<JobState>(json!(3)).is_err());
        assert_eq!(JobState::Deleted.to_string(), "deleted");
    }
}
