//! In-memory collaborators for orchestrator tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dymo::appcenter::{Deployer, DeploymentHistory, DeploymentReceipt, DeploymentRequest};
use dymo::cli::Prompter;
use dymo::config::ProjectConfig;
use dymo::error::{ReleaseError, RemoteReleaseError, Result};
use dymo::git::{CommitRef, VersionControl};
use dymo::github::{CreateReleaseRequest, ReleaseHost, ReleaseReceipt};
use dymo::platform::{Platform, Ring};
use dymo::version::HistoryEntry;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::Barrier;
use tokio_util::sync::CancellationToken;

pub const REMOTE_URL: &str = "git@github.com:acme/app.git";

pub const FULL_HASH: &str = "4f1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c";

/// Config pointing at `project`, with default tag prefixes and deployments.
pub fn config_for(project: &Path) -> ProjectConfig {
    let raw = format!(
        r#"
[project]
path = "."

[git]
remote_url = "{REMOTE_URL}"

[github]
owner = "acme"
repo = "app"

[appcenter]
android_app = "acme/app-android"
ios_app = "acme/app-ios"
"#
    );
    ProjectConfig::from_toml(&raw, project).unwrap()
}

/// Small project tree with one excluded directory.
pub fn sample_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src/screens")).unwrap();
    std::fs::create_dir_all(dir.path().join("node_modules/react")).unwrap();
    std::fs::write(dir.path().join("package.json"), "{}").unwrap();
    std::fs::write(dir.path().join("src/index.js"), "export {}").unwrap();
    std::fs::write(dir.path().join("src/screens/home.js"), "home").unwrap();
    std::fs::write(dir.path().join("node_modules/react/index.js"), "react").unwrap();
    dir
}

pub fn commit(short: &str, subject: &str) -> CommitRef {
    CommitRef {
        short_hash: short.to_string(),
        subject: subject.to_string(),
        refs: None,
    }
}

/// Git fake with a fixed remote and log.
pub struct FakeVcs {
    pub remote_url: String,
    pub commits: Vec<CommitRef>,
    pub full_hashes: HashMap<String, String>,
    /// Cancelled while the log query is in flight
    pub cancel_during_log: Option<CancellationToken>,
    pub log_calls: Mutex<Vec<(String, usize)>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        let mut full_hashes = HashMap::new();
        full_hashes.insert("4f1c2d3".to_string(), FULL_HASH.to_string());
        Self {
            remote_url: REMOTE_URL.to_string(),
            commits: vec![
                commit("4f1c2d3", "Fix login crash"),
                commit("9a8b7c6", "Add settings screen"),
            ],
            full_hashes,
            cancel_during_log: None,
            log_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn remote_url(&self, _remote: &str) -> Result<String> {
        Ok(format!("{}\n", self.remote_url))
    }

    async fn recent_commits(&self, rev: &str, limit: usize) -> Result<Vec<CommitRef>> {
        self.log_calls.lock().unwrap().push((rev.to_string(), limit));
        if let Some(token) = &self.cancel_during_log {
            token.cancel();
        }
        Ok(self.commits.iter().take(limit).cloned().collect())
    }

    async fn resolve_full_hash(&self, rev: &str) -> Result<String> {
        self.full_hashes
            .get(rev)
            .cloned()
            .ok_or_else(|| ReleaseError::GitQuery {
                command: format!("rev-parse {}", rev),
                stderr: "unknown revision".to_string(),
            })
    }
}

/// Deployment history fake. With `rendezvous`, each lookup waits until the
/// other platform's lookup has started.
pub struct FakeHistory {
    pub labels: HashMap<Platform, Vec<&'static str>>,
    pub rendezvous: Option<Arc<Barrier>>,
    pub calls: Mutex<Vec<(Platform, Ring)>>,
}

impl FakeHistory {
    pub fn new(android: Vec<&'static str>, ios: Vec<&'static str>) -> Self {
        let mut labels = HashMap::new();
        labels.insert(Platform::Android, android);
        labels.insert(Platform::Ios, ios);
        Self {
            labels,
            rendezvous: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeploymentHistory for FakeHistory {
    async fn history(&self, platform: Platform, ring: Ring) -> Result<Vec<HistoryEntry>> {
        self.calls.lock().unwrap().push((platform, ring));
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        Ok(self.labels[&platform]
            .iter()
            .map(|label| HistoryEntry {
                label: label.to_string(),
                release_time: Some("2024-05-01".to_string()),
                target_binary_version: Some("2.3.0".to_string()),
            })
            .collect())
    }
}

/// Deployer fake recording every request.
#[derive(Default)]
pub struct FakeDeployer {
    pub fail_on: Option<Platform>,
    pub requests: Mutex<Vec<DeploymentRequest>>,
}

#[async_trait]
impl Deployer for FakeDeployer {
    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentReceipt> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_on == Some(request.platform) {
            return Err(ReleaseError::Deployment {
                platform: request.platform.id().to_string(),
                exit_code: Some(1),
                stderr: "Error: bundle failed".to_string(),
            });
        }
        let deployment = match request.ring {
            Ring::Production => "Production",
            Ring::Staging => "Staging",
        };
        Ok(DeploymentReceipt {
            platform: request.platform,
            deployment: deployment.to_string(),
            mandatory: request.mandatory,
        })
    }
}

/// Release host fake; a tag can only be created once.
#[derive(Default)]
pub struct FakeHost {
    pub created: Mutex<Vec<CreateReleaseRequest>>,
    pub existing_tags: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn with_existing(tag: &str) -> Self {
        let host = Self::default();
        host.existing_tags.lock().unwrap().push(tag.to_string());
        host
    }

    pub fn tags(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.tag_name.clone())
            .collect()
    }
}

#[async_trait]
impl ReleaseHost for FakeHost {
    async fn create_release(&self, request: &CreateReleaseRequest) -> Result<ReleaseReceipt> {
        let mut existing = self.existing_tags.lock().unwrap();
        if existing.contains(&request.tag_name) {
            return Err(RemoteReleaseError::Conflict {
                tag: request.tag_name.clone(),
                body: r#"{"errors":[{"code":"already_exists"}]}"#.to_string(),
            }
            .into());
        }
        existing.push(request.tag_name.clone());
        self.created.lock().unwrap().push(request.clone());

        Ok(ReleaseReceipt {
            id: existing.len() as u64,
            tag_name: request.tag_name.clone(),
            html_url: format!(
                "https://github.com/{}/{}/releases/tag/{}",
                request.owner, request.repo, request.tag_name
            ),
        })
    }
}

/// Answer the next prompt with this.
pub enum Answer {
    Pick(usize),
    Text(&'static str),
    /// Answer with text and cancel the run at the same time
    TextThenCancel(&'static str, CancellationToken),
    BackOut,
}

/// Prompter that replays scripted answers in order.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    pub asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: Mutex::new(Vec::new()),
        }
    }

    fn next(&self, prompt: &str) -> Answer {
        self.asked.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt {prompt:?}"))
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        match self.next(prompt) {
            Answer::Pick(index) => {
                assert!(index < items.len(), "index {index} out of {items:?}");
                Ok(Some(index))
            }
            Answer::BackOut => Ok(None),
            _ => panic!("select {prompt:?} got a text answer"),
        }
    }

    async fn text(&self, prompt: &str) -> Result<Option<String>> {
        match self.next(prompt) {
            Answer::Text(text) => Ok(Some(text.to_string())),
            Answer::TextThenCancel(text, token) => {
                token.cancel();
                Ok(Some(text.to_string()))
            }
            Answer::BackOut => Ok(None),
            Answer::Pick(_) => panic!("text {prompt:?} got a menu answer"),
        }
    }
}
