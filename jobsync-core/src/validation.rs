//! Job definition validation
//!
//! Structural rules (required fields, types, numeric bounds, enumerations,
//! the tagged schedule unions) are expressed as a JSON Schema compiled once
//! per [`JobValidator`]. Semantic rules that a schema cannot express cleanly
//! (the command prefix and the `generate_sources` alias pair) are checked in
//! code. Every violation found is collected into a [`ValidationReport`]
//! instead of stopping at the first one.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

use crate::error::{JobSyncError, Result};
use crate::job::{JobDefinition, HOUR_INTERVALS};

/// Every execution step must start with this unless configured otherwise
pub const DEFAULT_COMMAND_PREFIX: &str = "dbt ";

/// Field label used for violations on the record itself
pub const ROOT_FIELD: &str = "<root>";

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// All violations found in one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_violation(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.violations.push(Violation {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        });
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations reported against `field`
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.field == field)
    }

    /// Move `other`'s violations into this report under `prefix`
    pub fn absorb(&mut self, prefix: &str, other: ValidationReport) {
        for violation in other.violations {
            let field = if violation.field == ROOT_FIELD {
                prefix.to_string()
            } else if violation.field.starts_with('[') {
                format!("{}{}", prefix, violation.field)
            } else {
                format!("{}.{}", prefix, violation.field)
            };
            self.violations.push(Violation { field, ..violation });
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s):", self.violations.len())?;
        for violation in &self.violations {
            write!(
                f,
                "\n  - {}: {} ({})",
                violation.field, violation.message, violation.code
            )?;
        }
        Ok(())
    }
}

/// Validates raw job records and decodes them into [`JobDefinition`]s
pub struct JobValidator {
    schema: jsonschema::Validator,
    command_prefix: String,
}

impl JobValidator {
    /// Create a validator using [`DEFAULT_COMMAND_PREFIX`]
    pub fn new() -> Result<Self> {
        Self::with_command_prefix(DEFAULT_COMMAND_PREFIX)
    }

    /// Create a validator requiring execution steps to start with `prefix`
    pub fn with_command_prefix(prefix: impl Into<String>) -> Result<Self> {
        let schema = jsonschema::validator_for(&job_schema())
            .map_err(|e| JobSyncError::Schema(e.to_string()))?;

        Ok(Self {
            schema,
            command_prefix: prefix.into(),
        })
    }

    pub fn command_prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Validate a single raw record
    pub fn validate_definition(
        &self,
        raw: &JsonValue,
    ) -> std::result::Result<JobDefinition, ValidationReport> {
        let mut report = ValidationReport::new();

        self.check_schema(raw, &mut report);
        self.check_execution_steps(raw, &mut report);
        check_source_flags(raw, &mut report);

        if !report.is_valid() {
            return Err(report);
        }

        match serde_json::from_value(raw.clone()) {
            Ok(definition) => Ok(definition),
            Err(e) => {
                report.add_violation(ROOT_FIELD, format!("Failed to decode job: {}", e), "DECODE");
                Err(report)
            }
        }
    }

    /// Validate a `{jobs: [...]}` document
    ///
    /// Duplicate names short-circuit before any per-definition validation.
    pub fn validate_collection(&self, document: &JsonValue) -> Result<Vec<JobDefinition>> {
        let mut report = ValidationReport::new();

        let Some(jobs) = document.get("jobs").and_then(JsonValue::as_array) else {
            report.add_violation(
                "jobs",
                "Definitions document must contain a `jobs` list",
                "REQUIRED",
            );
            return Err(report.into());
        };

        if jobs.is_empty() {
            report.add_violation("jobs", "At least one job must be defined", "EMPTY_COLLECTION");
            return Err(report.into());
        }

        let duplicates = duplicate_names(jobs);
        if !duplicates.is_empty() {
            return Err(JobSyncError::DuplicateName { names: duplicates });
        }

        let mut definitions = Vec::with_capacity(jobs.len());
        for (index, raw) in jobs.iter().enumerate() {
            match self.validate_definition(raw) {
                Ok(definition) => definitions.push(definition),
                Err(errors) => {
                    debug!("Job at index {} has {} violation(s)", index, errors.len());
                    report.absorb(&format!("jobs[{}]", index), errors);
                }
            }
        }

        let scopes: BTreeSet<u64> = definitions.iter().map(|d| d.account_scope_id).collect();
        if scopes.len() > 1 {
            let scopes: Vec<String> = scopes.iter().map(u64::to_string).collect();
            report.add_violation(
                "jobs",
                format!(
                    "All jobs must have the same account_scope_id, found: {}",
                    scopes.join(", ")
                ),
                "INCONSISTENT_ACCOUNT_SCOPE",
            );
        }

        if !report.is_valid() {
            return Err(report.into());
        }

        info!("Validated {} job definition(s)", definitions.len());
        Ok(definitions)
    }

    fn check_schema(&self, raw: &JsonValue, report: &mut ValidationReport) {
        for error in self.schema.iter_errors(raw) {
            let field = pointer_to_field(&error.instance_path.to_string());
            let code = keyword_code(&error.schema_path.to_string());
            report.add_violation(field, error.to_string(), code);
        }
    }

    fn check_execution_steps(&self, raw: &JsonValue, report: &mut ValidationReport) {
        let Some(steps) = raw.get("execution_steps").and_then(JsonValue::as_array) else {
            return;
        };

        for (index, step) in steps.iter().enumerate() {
            if let Some(step) = step.as_str() {
                if !step.starts_with(&self.command_prefix) {
                    report.add_violation(
                        format!("execution_steps[{}]", index),
                        format!("`{}` must begin with `{}`", step, self.command_prefix),
                        "COMMAND_PREFIX",
                    );
                }
            }
        }
    }
}

fn check_source_flags(raw: &JsonValue, report: &mut ValidationReport) {
    let flag = |key: &str| match raw.get(key) {
        None | Some(JsonValue::Null) => Some(false),
        Some(value) => value.as_bool(),
    };

    // Type errors on either flag are already reported by the schema
    if let (Some(generate), Some(run)) = (flag("generate_sources"), flag("run_generate_sources")) {
        if generate != run {
            report.add_violation(
                "generate_sources",
                "`generate_sources` and `run_generate_sources` must both contain the same value",
                "INCONSISTENT_SOURCE_FLAGS",
            );
        }
    }
}

fn duplicate_names(jobs: &[JsonValue]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in jobs
        .iter()
        .filter_map(|job| job.get("name").and_then(JsonValue::as_str))
    {
        *counts.entry(name).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Render a JSON pointer as `a.b[0].c`
fn pointer_to_field(pointer: &str) -> String {
    let mut field = String::new();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if segment.parse::<usize>().is_ok() {
            field.push_str(&format!("[{}]", segment));
        } else {
            if !field.is_empty() {
                field.push('.');
            }
            field.push_str(&segment);
        }
    }

    if field.is_empty() {
        ROOT_FIELD.to_string()
    } else {
        field
    }
}

/// Turn the failing schema keyword (`exclusiveMinimum`) into a code (`EXCLUSIVE_MINIMUM`)
fn keyword_code(schema_path: &str) -> String {
    let keyword = schema_path.rsplit('/').next().unwrap_or_default();
    let mut code = String::with_capacity(keyword.len() + 4);
    for ch in keyword.chars() {
        if ch.is_ascii_uppercase() && !code.is_empty() {
            code.push('_');
        }
        code.push(ch.to_ascii_uppercase());
    }
    code
}

fn job_schema() -> JsonValue {
    let positive_id = json!({ "type": "integer", "exclusiveMinimum": 0 });
    let optional_positive_id = json!({ "type": ["integer", "null"], "exclusiveMinimum": 0 });
    let optional_string = json!({ "type": ["string", "null"] });
    let boolean = json!({ "type": "boolean" });

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": [
            "name",
            "account_scope_id",
            "environment_id",
            "project_id",
            "execution_steps",
            "schedule",
            "settings",
            "triggers"
        ],
        "properties": {
            "id": optional_positive_id,
            "name": { "type": "string", "minLength": 1 },
            "account_scope_id": positive_id,
            "environment_id": positive_id,
            "project_id": positive_id,
            "execution_steps": {
                "type": "array",
                "minItems": 1,
                "items": { "type": "string" }
            },
            "schedule": {
                "type": "object",
                "required": ["date", "time"],
                "properties": {
                    "cron": { "type": "string" },
                    "date": {
                        "type": "object",
                        "required": ["type"],
                        "properties": {
                            "type": { "enum": ["days_of_week", "custom_cron"] }
                        },
                        "allOf": [
                            {
                                "if": {
                                    "required": ["type"],
                                    "properties": { "type": { "const": "days_of_week" } }
                                },
                                "then": {
                                    "required": ["days"],
                                    "properties": {
                                        "days": {
                                            "type": "array",
                                            "items": { "type": "integer", "minimum": 0, "maximum": 6 }
                                        }
                                    }
                                }
                            },
                            {
                                "if": {
                                    "required": ["type"],
                                    "properties": { "type": { "const": "custom_cron" } }
                                },
                                "then": {
                                    "properties": { "cron": { "type": "string" } }
                                }
                            }
                        ]
                    },
                    "time": {
                        "type": "object",
                        "required": ["type"],
                        "properties": {
                            "type": { "enum": ["every_hour", "at_exact_hours"] }
                        },
                        "allOf": [
                            {
                                "if": {
                                    "required": ["type"],
                                    "properties": { "type": { "const": "every_hour" } }
                                },
                                "then": {
                                    "required": ["interval"],
                                    "properties": { "interval": { "enum": HOUR_INTERVALS } }
                                }
                            },
                            {
                                "if": {
                                    "required": ["type"],
                                    "properties": { "type": { "const": "at_exact_hours" } }
                                },
                                "then": {
                                    "required": ["hours"],
                                    "properties": {
                                        "hours": {
                                            "type": "array",
                                            "items": { "type": "integer", "minimum": 0, "maximum": 23 }
                                        }
                                    }
                                }
                            }
                        ]
                    }
                }
            },
            "settings": {
                "type": "object",
                "properties": {
                    "threads": { "type": "integer", "exclusiveMinimum": 0, "maximum": u32::MAX },
                    "target_name": { "type": "string" }
                }
            },
            "triggers": {
                "type": "object",
                "properties": {
                    "github_webhook": boolean,
                    "schedule": boolean,
                    "custom_branch_only": boolean,
                    "on_draft_pr": boolean
                }
            },
            "generate_sources": boolean,
            "run_generate_sources": boolean,
            "generate_docs": boolean,
            "deactivated": boolean,
            "is_deferrable": boolean,
            "lifecycle_webhooks": boolean,
            "lifecycle_webhooks_url": optional_string,
            "description": optional_string,
            "dbt_version": optional_string,
            "deferring_environment_id": optional_positive_id,
            "deferring_job_definition_id": optional_positive_id,
            "run_failure_count": { "type": ["integer", "null"], "minimum": 0 },
            "execution": {
                "type": ["object", "null"],
                "properties": {
                    "timeout_seconds": { "type": "integer", "minimum": 0 }
                }
            },
            "job_type": { "enum": ["ci", "other", "scheduled", null] },
            "state": { "enum": [1, 2, null] },
            "created_at": optional_string,
            "updated_at": optional_string,
            "next_run": optional_string,
            "cron_humanized": optional_string,
            "next_run_humanized": optional_string,
            "raw_dbt_version": optional_string
        },
        "additionalProperties": true
    })
}
