//! Shared fixtures for end-to-end tests

#![allow(dead_code)]

use jobsync_cli::Cli;
use jobsync_config::JobSyncConfig;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::MockServer;

pub const ACCOUNT: u64 = 43791;

/// Path of the jobs collection endpoint on the mock server
pub fn jobs_path() -> String {
    format!("/api/v2/accounts/{}/jobs/", ACCOUNT)
}

pub fn job_path(id: u64) -> String {
    format!("/api/v2/accounts/{}/jobs/{}", ACCOUNT, id)
}

/// A desired job as it would appear in a definitions file
pub fn desired_job(name: &str, threads: u32) -> Value {
    json!({
        "name": name,
        "account_scope_id": ACCOUNT,
        "project_id": 176941,
        "environment_id": 134459,
        "execution_steps": ["dbt source freshness", "dbt build"],
        "schedule": {
            "date": {"type": "days_of_week", "days": [1, 2, 3, 4, 5]},
            "time": {"type": "at_exact_hours", "hours": [6, 18]}
        },
        "settings": {"threads": threads, "target_name": "prod"},
        "triggers": {"github_webhook": false, "schedule": true}
    })
}

/// The same job as the remote API reports it, with server-populated fields
pub fn remote_job(name: &str, threads: u32, id: u64) -> Value {
    let mut job = desired_job(name, threads);
    let object = job.as_object_mut().unwrap();
    object.insert("id".to_string(), json!(id));
    object.insert("state".to_string(), json!(1));
    object.insert("job_type".to_string(), json!("scheduled"));
    object.insert("created_at".to_string(), json!("2024-02-01T10:00:00Z"));
    object.insert("cron_humanized".to_string(), json!("At 06:00 and 18:00"));
    job["schedule"]["cron"] = json!("0 6,18 * * 1,2,3,4,5");
    job["triggers"]["custom_branch_only"] = json!(false);
    job
}

/// Write `jobs` as a definitions file inside `dir`
pub fn write_definitions(dir: &TempDir, jobs: Vec<Value>) -> PathBuf {
    let path = dir.path().join("jobs.yml");
    let yaml = serde_yaml::to_string(&json!({ "jobs": jobs })).unwrap();
    std::fs::write(&path, yaml).unwrap();
    path
}

/// Configuration pointing at the mock server
pub fn config_for(server: &MockServer) -> JobSyncConfig {
    let mut config = JobSyncConfig::default();
    config.api.base_url = server.uri();
    config.api.token = Some("test-token".to_string());
    config
}

pub fn sync_cli(file: &Path) -> Cli {
    Cli {
        sync: true,
        file: Some(file.to_path_buf()),
        ..Cli::default()
    }
}
