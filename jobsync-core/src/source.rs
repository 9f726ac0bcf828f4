//! Definitions documents on disk

use serde_json::{json, Value as JsonValue};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{JobSyncError, Result};
use crate::job::JobDefinition;

/// A YAML `{jobs: [...]}` document
#[derive(Debug, Clone)]
pub struct DefinitionSource {
    path: PathBuf,
}

impl DefinitionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the document as raw JSON, ready for validation
    pub fn load(&self) -> Result<JsonValue> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        let document: JsonValue = serde_yaml::from_str(&content).map_err(|e| self.error(e))?;
        debug!("Loaded definitions from {}", self.path.display());
        Ok(document)
    }

    /// Write `definitions` to a new file with keys sorted
    ///
    /// Fails if the file already exists.
    pub fn save(&self, definitions: &[JobDefinition]) -> Result<()> {
        // serde_json maps are ordered, which gives sorted keys at every level
        let document = json!({ "jobs": serde_json::to_value(definitions)? });
        let yaml = serde_yaml::to_string(&document)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| self.error(e))?;
        file.write_all(yaml.as_bytes())
            .map_err(|e| self.error(e))?;

        info!(
            "Wrote {} job definition(s) to {}",
            definitions.len(),
            self.path.display()
        );
        Ok(())
    }

    fn error(&self, err: impl std::fmt::Display) -> JobSyncError {
        JobSyncError::Source {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn definition(name: &str) -> JobDefinition {
        serde_json::from_value(json!({
            "name": name,
            "account_scope_id": 1,
            "project_id": 2,
            "environment_id": 3,
            "execution_steps": ["dbt build"],
            "schedule": {
                "date": {"type": "custom_cron", "cron": "0 4 * * *"},
                "time": {"type": "every_hour", "interval": 1}
            },
            "settings": {"threads": 2},
            "triggers": {"schedule": true, "github_webhook": false},
            "description": "nightly build"
        }))
        .unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let source = DefinitionSource::new(dir.path().join("jobs.yml"));
        assert!(!source.exists());

        source.save(&[definition("job1"), definition("job2")]).unwrap();
        assert!(source.exists());

        let document = source.load().unwrap();
        let jobs = document["jobs"].as_array().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1]["name"], json!("job2"));
        assert_eq!(jobs[0]["schedule"]["date"]["cron"], json!("0 4 * * *"));
    }

    #[test]
    fn test_save_sorts_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.yml");
        DefinitionSource::new(&path).save(&[definition("job1")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let account = content.find("account_scope_id").unwrap();
        let description = content.find("description").unwrap();
        let triggers = content.find("triggers").unwrap();
        assert!(account < description && description < triggers);

        let github = content.find("github_webhook").unwrap();
        let schedule_trigger = content.rfind("schedule: true").unwrap();
        assert!(github < schedule_trigger);
    }

    #[test]
    fn test_save_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.yml");
        std::fs::write(&path, "jobs: []\n").unwrap();

        let err = DefinitionSource::new(&path)
            .save(&[definition("job1")])
            .unwrap_err();
        assert!(matches!(err, JobSyncError::Source { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "jobs: []\n");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = DefinitionSource::new(dir.path().join("missing.yml"))
            .load()
            .unwrap_err();
        assert_eq!(err.error_code(), "SOURCE_ERROR");
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.yml");
        std::fs::write(&path, "jobs: [unclosed\n").unwrap();

        let err = DefinitionSource::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("jobs.yml"));
    }
}
