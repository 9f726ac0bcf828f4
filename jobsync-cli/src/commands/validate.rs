//! Validate a definitions file

use anyhow::Result;
use jobsync_core::{DefinitionSource, JobDefinition, JobValidator};
use tracing::{debug, info};

use crate::error::CliError;

/// Load and validate every job in `source`
pub fn validate_file(validator: &JobValidator, source: &DefinitionSource) -> Result<Vec<JobDefinition>> {
    if !source.exists() {
        return Err(CliError::ResourceNotFound(format!(
            "{} does not exist.",
            source.path().display()
        ))
        .into());
    }

    info!("Using definitions file: {}", source.path().display());
    let document = source.load()?;
    debug!("Definitions document: {}", document);

    let definitions = validator.validate_collection(&document)?;
    info!(
        "All {} job(s) defined in {} are valid.",
        definitions.len(),
        source.path().display()
    );

    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobsync_core::JobSyncError;
    use tempfile::TempDir;

    const VALID: &str = r#"
jobs:
  - name: nightly
    account_scope_id: 1
    project_id: 2
    environment_id: 3
    execution_steps:
      - dbt build
    schedule:
      cron: "0 2 * * *"
      date:
        type: custom_cron
        cron: "0 2 * * *"
      time:
        type: every_hour
        interval: 1
    settings:
      threads: 8
    triggers:
      schedule: true
      github_webhook: false
"#;

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.yml");
        let err = validate_file(&JobValidator::new().unwrap(), &DefinitionSource::new(&path))
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<CliError>(),
            Some(&CliError::ResourceNotFound(format!(
                "{} does not exist.",
                path.display()
            )))
        );
    }

    #[test]
    fn test_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.yml");
        std::fs::write(&path, VALID).unwrap();

        let jobs = validate_file(&JobValidator::new().unwrap(), &DefinitionSource::new(&path))
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].threads(), 8);
    }

    #[test]
    fn test_invalid_file_reports_violations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.yml");
        std::fs::write(&path, VALID.replace("dbt build", "make build")).unwrap();

        let err = validate_file(&JobValidator::new().unwrap(), &DefinitionSource::new(&path))
            .unwrap_err();
        match err.downcast_ref::<JobSyncError>() {
            Some(JobSyncError::Validation(report)) => {
                assert_eq!(report.violations[0].field, "jobs[0].execution_steps[0]");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
