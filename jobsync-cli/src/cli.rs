//! CLI argument parsing definitions

use clap::Parser;
use std::path::PathBuf;

use crate::error::CliError;

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Save every remote job of `--account-id` to the file passed to `--file`
    #[arg(long = "import")]
    pub import: bool,

    /// Validate the jobs defined in `--file` without changing anything remotely
    #[arg(long)]
    pub validate: bool,

    /// Validate the jobs defined in `--file` and sync them to the remote API
    #[arg(long)]
    pub sync: bool,

    /// Definitions file, written by `--import` and read by `--validate` and `--sync`
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Account to import jobs from, only used with `--import`
    #[arg(long, value_name = "ID")]
    pub account_id: Option<u64>,

    /// Delete remote jobs that are not defined in `--file`
    #[arg(long)]
    pub allow_deletes: bool,

    /// Only delete remote jobs whose name starts with this prefix
    #[arg(long, value_name = "PREFIX")]
    pub restrict_deletes_to_prefix: Option<String>,
}

/// The single operation a run performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Import { account_scope_id: u64, file: PathBuf },
    Validate { file: PathBuf },
    Sync { file: PathBuf },
}

impl Cli {
    /// Resolve the flags into one operation
    pub fn operation(&self) -> Result<Operation, CliError> {
        if self.import && self.account_id.is_none() {
            return Err(CliError::InvalidArguments(
                "`--account-id` must be passed when `--import` is passed.".to_string(),
            ));
        }

        let selected = [self.import, self.validate, self.sync]
            .iter()
            .filter(|flag| **flag)
            .count();
        match selected {
            0 => {
                return Err(CliError::InvalidArguments(
                    "One of `--import`, `--validate` and `--sync` must be specified.".to_string(),
                ))
            }
            1 => {}
            _ => {
                return Err(CliError::InvalidArguments(
                    "Only one of `--import`, `--validate` and `--sync` can be specified."
                        .to_string(),
                ))
            }
        }

        let file = self.file.clone().ok_or_else(|| {
            CliError::InvalidArguments("`--file` must be passed.".to_string())
        })?;

        Ok(match (self.import, self.account_id) {
            (true, Some(account_scope_id)) => Operation::Import {
                account_scope_id,
                file,
            },
            _ if self.validate => Operation::Validate { file },
            _ => Operation::Sync { file },
        })
    }
}
