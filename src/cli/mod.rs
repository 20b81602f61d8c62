//! Command line interface for dymo.
//!
//! This module provides argument parsing, operator prompts and coloured
//! output, and runs the release command.

mod args;
pub mod commands;
mod output;
mod prompt;

pub use args::{Args, LEGACY_TOKEN_VAR, RuntimeConfig};
pub use output::OutputManager;
pub use prompt::{Prompter, TerminalPrompter};

use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();

    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let runtime = RuntimeConfig::from(&args);
    commands::execute(&args, &runtime).await
}
