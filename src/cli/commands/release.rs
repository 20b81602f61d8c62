//! Wires the real collaborators into an orchestrated release run.

use crate::appcenter::AppCenterCli;
use crate::cli::{Args, OutputManager, RuntimeConfig, TerminalPrompter};
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::git::SystemGit;
use crate::github::{GitHubClient, ReleaseHost};
use crate::orchestrator::{Collaborators, Orchestrator, RunSummary};
use crate::platform::Mode;
use tokio_util::sync::CancellationToken;

/// Run one release from parsed arguments.
///
/// Returns the process exit code for a completed run.
pub async fn execute(args: &Args, runtime: &RuntimeConfig) -> Result<i32> {
    let output = runtime.output();
    let config = ProjectConfig::load(&args.config)?;
    let options = args.run_options();

    log::info!(
        "Loaded {} ({} mode, project {})",
        args.config.display(),
        options.mode,
        config.project.path.display()
    );

    let git = SystemGit::new(&config.project.path)?;
    let appcenter = AppCenterCli::new(
        &config.project.path,
        config.app_keys(),
        config.deployment_names(),
        output.clone(),
    )?;

    // Staging never talks to the release host.
    let github = match (options.mode, args.github_token()) {
        (Mode::Production, Some(token)) => Some(
            GitHubClient::new(&token, &config.github.user_agent)?
                .with_api_base(&config.github.api_url),
        ),
        _ => None,
    };
    let prompter = TerminalPrompter;

    let collaborators = Collaborators {
        vcs: &git,
        history: &appcenter,
        deployer: &appcenter,
        host: github.as_ref().map(|client| client as &dyn ReleaseHost),
        prompter: &prompter,
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone(), output.clone());

    let mut orchestrator = Orchestrator::new(&config, collaborators, output, cancel);
    let summary = orchestrator.run(&options).await?;
    log::debug!("Transitions: {:?}", orchestrator.transitions());

    print_summary(output, &summary)?;
    Ok(0)
}

/// Print what a completed run did.
pub fn print_summary(output: &OutputManager, summary: &RunSummary) -> std::io::Result<()> {
    output.section("Summary")?;

    let platforms: Vec<&str> = summary
        .platforms
        .iter()
        .map(|p| p.display_name())
        .collect();
    output.field("Mode:", &summary.mode.to_string())?;
    output.field("Platforms:", &platforms.join(", "))?;

    if let Some(commit) = &summary.commit {
        output.field("Commit:", &commit.full_hash)?;
    }
    if let Some(fingerprint) = &summary.fingerprint {
        output.field(
            "Project hash:",
            &format!("{} ({} files)", fingerprint.hash, fingerprint.leaf_count()),
        )?;
    }

    for release in &summary.releases {
        output.success(&format!("Release {} {}", release.tag_name, release.html_url))?;
    }
    for deployment in &summary.deployments {
        let kind = if deployment.mandatory {
            "mandatory"
        } else {
            "optional"
        };
        output.success(&format!(
            "Deployed {} to {} ({})",
            deployment.platform, deployment.deployment, kind
        ))?;
    }

    Ok(())
}

/// Cancel `cancel` on the first Ctrl-C.
///
/// The run stops at its next checkpoint; an in-flight command or request is
/// left to complete.
fn spawn_interrupt_listener(cancel: CancellationToken, output: OutputManager) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received");
            let _ = output.warn("Cancelling after the current step...");
            cancel.cancel();
        }
    });
}
