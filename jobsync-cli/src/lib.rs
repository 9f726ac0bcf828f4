//! Command line front end for jobsync
//!
//! `main.rs` only parses arguments and sets up logging; everything it
//! dispatches to lives here so the commands can be driven from tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Operation};
pub use commands::run;
pub use error::CliError;
