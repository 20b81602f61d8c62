//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation
//! of flag combinations and derivation of the runtime configuration.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::orchestrator::RunOptions;
use crate::platform::{Mode, PlatformSelection};
use clap::Parser;
use std::path::PathBuf;

/// Legacy environment variable holding the GitHub token
pub const LEGACY_TOKEN_VAR: &str = "GITHUB_KEY";

/// Interactive CodePush release orchestration
#[derive(Parser, Debug)]
#[command(
    name = "dymo",
    version,
    about = "Tag and deploy CodePush releases",
    long_about = "Tags a GitHub release recording the project fingerprint and the chosen \
remote commit, then deploys the bundle with the App Center CLI.

Production mode (default):
  pick platforms -> show last versions -> hash project -> pick commit ->
  optional note -> per platform: create release <prefix><n> and deploy

Staging mode (--staging):
  pick platforms -> deploy each to the staging deployment

Usage:
  dymo
  dymo --platform both --mandatory
  dymo --staging --platform ios

Ctrl-C cancels at the next step boundary; a running command is left to finish."
)]
pub struct Args {
    /// Project configuration file
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Deploy to the staging deployment without tagging a release
    #[arg(long)]
    pub staging: bool,

    /// Platforms to release (skips the platform menu)
    #[arg(short, long, value_enum, value_name = "PLATFORM")]
    pub platform: Option<PlatformSelection>,

    /// Release as a mandatory update
    #[arg(long)]
    pub mandatory: bool,

    /// Note appended to the release body (skips the note prompt)
    #[arg(long, value_name = "TEXT")]
    pub note: Option<String>,

    /// Number of recent commits to choose from
    #[arg(long, value_name = "N")]
    pub commits: Option<usize>,

    /// GitHub personal access token (falls back to GITHUB_KEY)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// Print detail lines
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.commits == Some(0) {
            return Err("--commits must be at least 1".to_string());
        }

        if self.staging && self.note.is_some() {
            return Err("--note only applies to production releases".to_string());
        }

        if self.staging && self.commits.is_some() {
            return Err("--commits only applies to production releases".to_string());
        }

        Ok(())
    }

    /// Workflow selected by the flags
    pub fn mode(&self) -> Mode {
        if self.staging {
            Mode::Staging
        } else {
            Mode::Production
        }
    }

    /// Token from `--github-token`/`GITHUB_TOKEN`, else `GITHUB_KEY`
    pub fn github_token(&self) -> Option<String> {
        self.github_token
            .clone()
            .or_else(|| std::env::var(LEGACY_TOKEN_VAR).ok())
            .filter(|t| !t.trim().is_empty())
    }

    /// Orchestrator options for this invocation
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            mode: self.mode(),
            platforms: self.platform,
            mandatory: self.mandatory,
            note: self.note.clone(),
            commit_window: self.commits,
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}
