//! `git` subprocess implementation of [`VersionControl`].

use super::{CommitRef, VersionControl};
use crate::error::{ReleaseError, Result};
use crate::process::{self, CommandOutput, CommandSpec};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Log format: short hash, decorations and subject separated by US (0x1f).
const LOG_FORMAT: &str = "--format=%h%x1f%D%x1f%s";

/// Runs read-only `git` queries inside a working copy.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
    repo_dir: PathBuf,
}

impl SystemGit {
    /// Query the repository at `repo_dir` using `git` from `PATH`.
    pub fn new(repo_dir: impl AsRef<Path>) -> Result<Self> {
        let program = process::require_tool("git")?;
        Ok(Self {
            program: program.to_string_lossy().into_owned(),
            repo_dir: repo_dir.as_ref().to_path_buf(),
        })
    }

    fn git<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(self.program.clone())
            .args(args)
            .current_dir(&self.repo_dir)
    }

    /// Run a query; any non-zero exit or stderr output is a failure.
    async fn query(&self, spec: CommandSpec) -> Result<String> {
        let CommandOutput {
            success,
            stdout,
            stderr,
            ..
        } = process::run_captured(&spec).await?;

        if !success || !stderr.trim().is_empty() {
            return Err(ReleaseError::GitQuery {
                command: spec.arg_list().join(" "),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

#[async_trait]
impl VersionControl for SystemGit {
    async fn remote_url(&self, remote: &str) -> Result<String> {
        let stdout = self.query(self.git(["remote", "get-url", remote])).await?;
        Ok(stdout.trim().to_string())
    }

    async fn recent_commits(&self, rev: &str, limit: usize) -> Result<Vec<CommitRef>> {
        let spec = self.git([
            "log".to_string(),
            "-n".to_string(),
            limit.to_string(),
            LOG_FORMAT.to_string(),
            rev.to_string(),
            "--".to_string(),
        ]);
        let stdout = self.query(spec).await?;
        Ok(stdout.lines().filter_map(CommitRef::parse_log_line).collect())
    }

    async fn resolve_full_hash(&self, rev: &str) -> Result<String> {
        let spec = self.git([
            "rev-parse".to_string(),
            "--verify".to_string(),
            format!("{}^{{commit}}", rev),
        ]);
        let stdout = self.query(spec).await?;
        Ok(stdout.trim().to_string())
    }
}
