//! Read-only version-control queries and commit selection.
//!
//! The [`VersionControl`] trait is the seam to the git binary; [`SystemGit`]
//! implements it with `git` subprocesses. [`CommitSelector`] lists recent
//! remote commits and resolves the operator's choice to a full hash.

mod system;

pub use system::SystemGit;

use crate::error::{ReleaseError, Result};
use async_trait::async_trait;
use std::fmt;

/// Read-only queries against a git working copy.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// URL of the named remote
    async fn remote_url(&self, remote: &str) -> Result<String>;

    /// Up to `limit` commits reachable from `rev`, most recent first
    async fn recent_commits(&self, rev: &str, limit: usize) -> Result<Vec<CommitRef>>;

    /// Full object name of a short or partial hash
    async fn resolve_full_hash(&self, rev: &str) -> Result<String>;
}

/// A commit as listed in the log.
///
/// Identity is the short hash. The full hash is only resolved once the
/// operator has chosen this commit (see [`CommitSelector::resolve`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    /// Abbreviated hash
    pub short_hash: String,
    /// First line of the commit message
    pub subject: String,
    /// Ref decorations (`HEAD -> master, origin/master`), if any
    pub refs: Option<String>,
}

impl CommitRef {
    /// Parse one line of `git log --format=%h%x1f%D%x1f%s`.
    pub fn parse_log_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, '\u{1f}');
        let short_hash = parts.next()?.trim();
        if short_hash.is_empty() {
            return None;
        }
        let refs = parts.next().map(str::trim).filter(|r| !r.is_empty());
        let subject = parts.next().unwrap_or_default().trim();

        Some(Self {
            short_hash: short_hash.to_string(),
            subject: subject.to_string(),
            refs: refs.map(String::from),
        })
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.refs {
            Some(refs) => write!(f, "{} ({}) {}", self.short_hash, refs, self.subject),
            None => write!(f, "{} {}", self.short_hash, self.subject),
        }
    }
}

/// A chosen commit with its full hash resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommit {
    /// The listed commit
    pub commit: CommitRef,
    /// Full object name
    pub full_hash: String,
}

/// Lists remote commits and resolves the selected one.
pub struct CommitSelector<'a> {
    vcs: &'a dyn VersionControl,
    remote: String,
    branch: String,
}

impl<'a> CommitSelector<'a> {
    /// Select among commits of `remote`/`branch`.
    pub fn new(vcs: &'a dyn VersionControl, remote: &str, branch: &str) -> Self {
        Self {
            vcs,
            remote: remote.to_string(),
            branch: branch.to_string(),
        }
    }

    /// Remote-tracking ref the log is read from
    pub fn tracking_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }

    /// The `limit` most recent commits on the tracking ref, in log order.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<CommitRef>> {
        let commits = self.vcs.recent_commits(&self.tracking_ref(), limit).await?;
        log::debug!("Listed {} commits from {}", commits.len(), self.tracking_ref());
        Ok(commits)
    }

    /// Resolve a chosen commit to its full hash.
    pub async fn resolve(&self, commit: CommitRef) -> Result<ResolvedCommit> {
        let full_hash = self.vcs.resolve_full_hash(&commit.short_hash).await?;
        let full_hash = full_hash.trim().to_string();

        if !is_full_hash(&full_hash) || !full_hash.starts_with(&commit.short_hash) {
            return Err(ReleaseError::GitQuery {
                command: format!("rev-parse {}", commit.short_hash),
                stderr: format!("unexpected object name {:?}", full_hash),
            });
        }

        Ok(ResolvedCommit { commit, full_hash })
    }
}

/// SHA-1 (40) or SHA-256 (64) hex object name.
pub fn is_full_hash(hash: &str) -> bool {
    matches!(hash.len(), 40 | 64) && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decorated_log_line() {
        let commit =
            CommitRef::parse_log_line("a1b2c3d\u{1f}HEAD -> master, origin/master\u{1f}Fix login")
                .unwrap();
        assert_eq!(commit.short_hash, "a1b2c3d");
        assert_eq!(commit.refs.as_deref(), Some("HEAD -> master, origin/master"));
        assert_eq!(commit.to_string(), "a1b2c3d (HEAD -> master, origin/master) Fix login");
    }

    #[test]
    fn parses_undecorated_log_line() {
        let commit = CommitRef::parse_log_line("a1b2c3d\u{1f}\u{1f}Bump deps").unwrap();
        assert_eq!(commit.refs, None);
        assert_eq!(commit.to_string(), "a1b2c3d Bump deps");
        assert_eq!(CommitRef::parse_log_line(""), None);
    }

    #[test]
    fn full_hash_shape() {
        assert!(is_full_hash(&"a".repeat(40)));
        assert!(!is_full_hash("a1b2c3d"));
        assert!(!is_full_hash(&"z".repeat(40)));
    }
}
