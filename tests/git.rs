//! `SystemGit` against a throwaway repository. Skipped when git is missing.

use dymo::git::{CommitSelector, SystemGit, VersionControl, is_full_hash};
use std::path::Path;
use std::process::Command;

const REMOTE: &str = "https://github.com/acme/app.git";

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "user.name=Dymo Test", "-c", "user.email=test@example.com"])
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?}: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn repo_with_history() -> Option<tempfile::TempDir> {
    if which::which("git").is_err() {
        eprintln!("git not installed, skipping");
        return None;
    }

    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "--quiet"]);
    for (file, subject) in [("a.txt", "First"), ("b.txt", "Second"), ("c.txt", "Third")] {
        std::fs::write(dir.path().join(file), subject).unwrap();
        git(dir.path(), &["add", file]);
        git(dir.path(), &["commit", "--quiet", "-m", subject]);
    }
    git(dir.path(), &["remote", "add", "origin", REMOTE]);
    git(dir.path(), &["update-ref", "refs/remotes/origin/master", "HEAD"]);
    Some(dir)
}

#[tokio::test]
async fn reads_remote_url() {
    let Some(dir) = repo_with_history() else {
        return;
    };
    let vcs = SystemGit::new(dir.path()).unwrap();
    assert_eq!(vcs.remote_url("origin").await.unwrap(), REMOTE);
}

#[tokio::test]
async fn lists_and_resolves_remote_commits() {
    let Some(dir) = repo_with_history() else {
        return;
    };
    let vcs = SystemGit::new(dir.path()).unwrap();
    let selector = CommitSelector::new(&vcs, "origin", "master");

    let commits = selector.list_recent(2).await.unwrap();
    let subjects: Vec<&str> = commits.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, ["Third", "Second"]);
    assert!(commits[0].refs.as_deref().unwrap_or_default().contains("origin/master"));

    let head = git(dir.path(), &["rev-parse", "HEAD"]);
    let resolved = selector.resolve(commits[0].clone()).await.unwrap();
    assert_eq!(resolved.full_hash, head);
    assert!(is_full_hash(&resolved.full_hash));
}

#[tokio::test]
async fn unknown_remote_is_a_git_error() {
    let Some(dir) = repo_with_history() else {
        return;
    };
    let vcs = SystemGit::new(dir.path()).unwrap();
    let err = vcs.remote_url("upstream").await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn missing_tracking_branch_is_a_git_error() {
    let Some(dir) = repo_with_history() else {
        return;
    };
    let vcs = SystemGit::new(dir.path()).unwrap();
    let selector = CommitSelector::new(&vcs, "origin", "develop");
    let err = selector.list_recent(5).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn unknown_hash_reports_git_stderr() {
    let Some(dir) = repo_with_history() else {
        return;
    };
    let vcs = SystemGit::new(dir.path()).unwrap();
    let err = vcs.resolve_full_hash("deadbeef").await.unwrap_err();
    match err {
        dymo::ReleaseError::GitQuery { stderr, .. } => assert!(!stderr.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
}
