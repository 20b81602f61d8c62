//! Release orchestration.
//!
//! One [`Orchestrator`] drives both workflows, selected by [`Mode`]:
//!
//! - **Production**: check preconditions, pick platforms, fetch last
//!   versions (concurrently), fingerprint the project, pick a commit,
//!   collect a note, then per platform create the release and deploy.
//! - **Staging**: check preconditions, pick platforms, deploy each platform
//!   to the staging ring.
//!
//! Every step that suspends is preceded by a cancellation checkpoint. A
//! cancellation raised while an external call is in flight takes effect at
//! the next checkpoint. Nothing is rolled back: a release created before a
//! later failure or cancellation stays on the remote.

mod stage;

pub use stage::Stage;

use crate::appcenter::{Deployer, DeploymentHistory, DeploymentReceipt, DeploymentRequest};
use crate::cli::{OutputManager, Prompter};
use crate::config::ProjectConfig;
use crate::error::{ReleaseError, Result};
use crate::fingerprint::{self, FingerprintNode};
use crate::git::{CommitSelector, ResolvedCommit, VersionControl};
use crate::github::{ReleasePlan, ReleaseHost, ReleaseReceipt, ReleaseTagger};
use crate::platform::{Mode, Platform, PlatformSelection, Ring};
use crate::version::PlatformVersionInfo;
use tokio_util::sync::CancellationToken;

/// External collaborators of a run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Version-control queries
    pub vcs: &'a dyn VersionControl,
    /// Deployment history lookups
    pub history: &'a dyn DeploymentHistory,
    /// Deployment dispatch
    pub deployer: &'a dyn Deployer,
    /// Release host; required in production mode
    pub host: Option<&'a dyn ReleaseHost>,
    /// Operator prompts
    pub prompter: &'a dyn Prompter,
}

/// Per-run choices that may be made up front instead of prompted.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Workflow to run
    pub mode: Mode,
    /// Platform set; prompted when `None`
    pub platforms: Option<PlatformSelection>,
    /// Release as a mandatory update
    pub mandatory: bool,
    /// Release note; prompted in production when `None`
    pub note: Option<String>,
    /// Number of commits offered; config default when `None`
    pub commit_window: Option<usize>,
}

impl RunOptions {
    /// Fully interactive run in `mode`
    pub fn interactive(mode: Mode) -> Self {
        Self {
            mode,
            platforms: None,
            mandatory: false,
            note: None,
            commit_window: None,
        }
    }
}

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Workflow that ran
    pub mode: Mode,
    /// Platforms released
    pub platforms: Vec<Platform>,
    /// Last versions before this run (production only)
    pub versions: Vec<PlatformVersionInfo>,
    /// Project fingerprint (production only)
    pub fingerprint: Option<FingerprintNode>,
    /// Released commit (production only)
    pub commit: Option<ResolvedCommit>,
    /// Releases created
    pub releases: Vec<ReleaseReceipt>,
    /// Deployments issued
    pub deployments: Vec<DeploymentReceipt>,
}

/// Sequences one release run.
pub struct Orchestrator<'a> {
    config: &'a ProjectConfig,
    collaborators: Collaborators<'a>,
    output: &'a OutputManager,
    cancel: CancellationToken,
    transitions: Vec<Stage>,
    releases: Vec<ReleaseReceipt>,
    deployments: Vec<DeploymentReceipt>,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator observing `cancel`.
    pub fn new(
        config: &'a ProjectConfig,
        collaborators: Collaborators<'a>,
        output: &'a OutputManager,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            collaborators,
            output,
            cancel,
            transitions: vec![Stage::Init],
            releases: Vec::new(),
            deployments: Vec::new(),
        }
    }

    /// States visited so far, starting with [`Stage::Init`]
    pub fn transitions(&self) -> &[Stage] {
        &self.transitions
    }

    /// Current state
    pub fn stage(&self) -> Stage {
        self.transitions.last().copied().unwrap_or(Stage::Init)
    }

    /// Releases created so far, including those of a failed run
    pub fn releases(&self) -> &[ReleaseReceipt] {
        &self.releases
    }

    /// Run the workflow selected by `options.mode`.
    pub async fn run(&mut self, options: &RunOptions) -> Result<RunSummary> {
        let result = match options.mode {
            Mode::Production => self.run_production(options).await,
            Mode::Staging => self.run_staging(options).await,
        };

        match &result {
            Ok(_) => self.enter(Stage::Done),
            Err(e) if e.is_cancellation() => self.enter(Stage::Cancelled),
            Err(_) => self.enter(Stage::Failed),
        }

        if result.is_err() && !self.releases.is_empty() {
            let tags: Vec<&str> = self.releases.iter().map(|r| r.tag_name.as_str()).collect();
            log::warn!("Run aborted after creating releases: {}", tags.join(", "));
            let _ = self.output.warn(&format!(
                "Releases already created remain on the remote: {}",
                tags.join(", ")
            ));
        }

        result
    }

    async fn run_production(&mut self, options: &RunOptions) -> Result<RunSummary> {
        let host = self.collaborators.host.ok_or_else(|| {
            ReleaseError::Precondition("Missing GitHub personal access token".to_string())
        })?;
        self.check_remote().await?;

        let platforms = self.select_platforms(options).await?;

        self.checkpoint("version lookup")?;
        let versions = self.fetch_versions(&platforms).await?;
        for info in &versions {
            self.output.field(info.platform.display_name(), &info.to_string())?;
        }
        self.enter(Stage::VersionsFetched);

        self.checkpoint("fingerprinting")?;
        let fingerprint = self.fingerprint_project().await?;
        self.enter(Stage::Fingerprinted);

        let commit = self.choose_commit(options).await?;
        self.enter(Stage::CommitChosen);

        let note = self.collect_note(options).await?;
        self.enter(Stage::NoteCollected);

        let tagger = ReleaseTagger::new(
            host,
            self.config.repo_target(),
            self.config.tag_prefixes(),
        );

        for info in &versions {
            let platform = info.platform;
            let version = info.next_version()?;
            let plan = ReleasePlan::new(
                platform,
                version,
                commit.clone(),
                fingerprint.clone(),
                note.clone(),
            )?;

            self.checkpoint(&format!("tagging {}", platform.id()))?;
            self.output
                .progress(&format!("Creating {} release v{}...", platform, version))?;
            let receipt = tagger.create_release(plan).await?;
            self.output
                .success(&format!("Tagged {} {}", receipt.tag_name, receipt.html_url))?;
            self.releases.push(receipt);
            self.enter(Stage::Tagged(platform));

            self.deploy(platform, Ring::Production, options.mandatory)
                .await?;
        }

        Ok(RunSummary {
            mode: Mode::Production,
            platforms,
            versions,
            fingerprint: Some(fingerprint),
            commit: Some(commit),
            releases: self.releases.clone(),
            deployments: self.deployments.clone(),
        })
    }

    async fn run_staging(&mut self, options: &RunOptions) -> Result<RunSummary> {
        self.check_remote().await?;

        let platforms = self.select_platforms(options).await?;

        for &platform in &platforms {
            self.deploy(platform, Ring::Staging, options.mandatory).await?;
        }

        Ok(RunSummary {
            mode: Mode::Staging,
            platforms,
            versions: Vec::new(),
            fingerprint: None,
            commit: None,
            releases: Vec::new(),
            deployments: self.deployments.clone(),
        })
    }

    /// The working copy must point at the configured remote.
    async fn check_remote(&self) -> Result<()> {
        self.checkpoint("remote check")?;
        let git = &self.config.git;
        let url = self.collaborators.vcs.remote_url(&git.remote).await?;

        if url.trim() != git.remote_url.trim() {
            return Err(ReleaseError::Precondition(format!(
                "Incorrect git remote. Looking for {}, got {}",
                git.remote_url,
                url.trim()
            )));
        }
        Ok(())
    }

    async fn select_platforms(&mut self, options: &RunOptions) -> Result<Vec<Platform>> {
        self.checkpoint("platform selection")?;

        let selection = match options.platforms {
            Some(selection) => selection,
            None => {
                self.output.section("Which platforms do you want to CP to?")?;
                let items: Vec<String> = PlatformSelection::MENU
                    .iter()
                    .map(|s| s.label().to_string())
                    .collect();
                let index = self
                    .collaborators
                    .prompter
                    .select("Platforms", &items)
                    .await?
                    .ok_or_else(|| ReleaseError::cancelled("platform selection"))?;
                PlatformSelection::from_index(index).ok_or_else(|| {
                    ReleaseError::Prompt(format!("platform menu returned index {}", index))
                })?
            }
        };

        self.enter(Stage::PlatformSelected);
        Ok(selection.platforms())
    }

    /// Fetch every platform's last production version; both lookups are
    /// issued before either is awaited.
    async fn fetch_versions(&self, platforms: &[Platform]) -> Result<Vec<PlatformVersionInfo>> {
        self.output.progress("Getting last version info...")?;

        match platforms {
            [only] => Ok(vec![self.fetch_version(*only).await?]),
            [first, second] => {
                let (a, b) =
                    tokio::try_join!(self.fetch_version(*first), self.fetch_version(*second))?;
                Ok(vec![a, b])
            }
            other => Err(anyhow::anyhow!("unsupported platform set {:?}", other).into()),
        }
    }

    async fn fetch_version(&self, platform: Platform) -> Result<PlatformVersionInfo> {
        let history = self
            .collaborators
            .history
            .history(platform, Ring::Production)
            .await?;
        log::debug!("{} history has {} entries", platform, history.len());
        Ok(PlatformVersionInfo::from_history(platform, &history))
    }

    async fn fingerprint_project(&self) -> Result<FingerprintNode> {
        let project = &self.config.project;
        let rules = self.config.exclusion_rules().map_err(|e| ReleaseError::Config {
            path: project.path.clone(),
            reason: format!("invalid exclusion pattern: {}", e),
        })?;

        self.output
            .progress(&format!("Hashing {}...", project.path.display()))?;
        let node = fingerprint::fingerprint(&project.path, &rules).await?;
        self.output.info(&format!(
            "Current project hash: {} (from {} hashed files)",
            node.hash,
            node.leaf_count()
        ))?;
        Ok(node)
    }

    async fn choose_commit(&self, options: &RunOptions) -> Result<ResolvedCommit> {
        self.checkpoint("commit listing")?;

        let config = self.config;
        let git = &config.git;
        let selector = CommitSelector::new(self.collaborators.vcs, &git.remote, &git.branch);
        let window = options.commit_window.unwrap_or(git.commits);
        let commits = selector.list_recent(window).await?;

        if commits.is_empty() {
            return Err(ReleaseError::GitQuery {
                command: format!("log -n {} {}", window, selector.tracking_ref()),
                stderr: "no commits found".to_string(),
            });
        }

        self.checkpoint("commit selection")?;
        self.output.section("Which remote commit should be tagged?")?;
        let items: Vec<String> = commits.iter().map(ToString::to_string).collect();
        let index = self
            .collaborators
            .prompter
            .select("Commit", &items)
            .await?
            .ok_or_else(|| ReleaseError::cancelled("commit selection"))?;

        let chosen = commits.into_iter().nth(index).ok_or_else(|| {
            ReleaseError::Prompt(format!("commit menu returned index {}", index))
        })?;

        self.checkpoint("commit resolution")?;
        let resolved = selector.resolve(chosen).await?;
        self.output.verbose(&format!("Resolved {}", resolved.full_hash))?;
        Ok(resolved)
    }

    async fn collect_note(&self, options: &RunOptions) -> Result<String> {
        if let Some(note) = &options.note {
            return Ok(note.clone());
        }

        self.checkpoint("release note")?;
        let note = self
            .collaborators
            .prompter
            .text("Release note (optional)")
            .await?
            .ok_or_else(|| ReleaseError::cancelled("release note"))?;
        Ok(note.trim().to_string())
    }

    async fn deploy(&mut self, platform: Platform, ring: Ring, mandatory: bool) -> Result<()> {
        self.checkpoint(&format!("deploying {}", platform.id()))?;

        let request = DeploymentRequest::new(
            platform,
            ring,
            mandatory,
            &self.config.appcenter.build_configuration,
        );
        let deployment = self.config.deployment_names().for_ring(ring).to_string();
        self.output
            .progress(&format!("Deploying {} to {}...", platform, deployment))?;

        let receipt = self.collaborators.deployer.deploy(&request).await?;
        self.output
            .success(&format!("Deployed {} to {}", platform, receipt.deployment))?;
        self.deployments.push(receipt);
        self.enter(Stage::Deployed(platform));
        Ok(())
    }

    fn checkpoint(&self, stage: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            log::info!("Cancellation observed before {}", stage);
            return Err(ReleaseError::cancelled(stage));
        }
        Ok(())
    }

    fn enter(&mut self, stage: Stage) {
        log::debug!("{} -> {}", self.stage(), stage);
        self.transitions.push(stage);
    }
}
