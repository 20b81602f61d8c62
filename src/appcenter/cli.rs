//! `appcenter` subprocess implementation of the deployment seams.

use super::request::{deploy_command, history_command};
use super::{AppKeys, Deployer, DeploymentHistory, DeploymentNames, DeploymentReceipt, DeploymentRequest};
use crate::cli::OutputManager;
use crate::error::{ReleaseError, Result};
use crate::platform::{Platform, Ring};
use crate::process;
use crate::version::{self, HistoryEntry};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Drives the App Center CLI from the project directory.
#[derive(Debug, Clone)]
pub struct AppCenterCli {
    program: String,
    project_dir: PathBuf,
    apps: AppKeys,
    deployments: DeploymentNames,
    output: OutputManager,
}

impl AppCenterCli {
    /// Use `appcenter` from `PATH`, running releases in `project_dir`.
    pub fn new(
        project_dir: impl AsRef<Path>,
        apps: AppKeys,
        deployments: DeploymentNames,
        output: OutputManager,
    ) -> Result<Self> {
        let program = process::require_tool("appcenter")?;
        Ok(Self {
            program: program.to_string_lossy().into_owned(),
            project_dir: project_dir.as_ref().to_path_buf(),
            apps,
            deployments,
            output,
        })
    }
}

#[async_trait]
impl DeploymentHistory for AppCenterCli {
    async fn history(&self, platform: Platform, ring: Ring) -> Result<Vec<HistoryEntry>> {
        let spec = history_command(
            &self.program,
            self.apps.for_platform(platform),
            self.deployments.for_ring(ring),
        );
        let output = process::run_captured(&spec).await?;

        if !output.success || !output.stderr.trim().is_empty() {
            return Err(ReleaseError::History {
                platform: platform.id().to_string(),
                reason: output.stderr.trim().to_string(),
            });
        }

        match version::parse_history_json(&output.stdout) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!(
                    "{} history is not JSON ({}); falling back to text parsing",
                    platform,
                    e
                );
                Ok(version::parse_history_text(&output.stdout))
            }
        }
    }
}

#[async_trait]
impl Deployer for AppCenterCli {
    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentReceipt> {
        let deployment = self.deployments.for_ring(request.ring);
        let spec = deploy_command(
            &self.program,
            self.apps.for_platform(request.platform),
            deployment,
            request,
        )
        .current_dir(&self.project_dir);

        let output = process::run_streaming(&spec, |line| {
            let _ = self.output.indent(line);
        })
        .await?;

        if !output.success {
            return Err(ReleaseError::Deployment {
                platform: request.platform.id().to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        if !output.stderr.trim().is_empty() {
            log::debug!("{} deployment stderr: {}", request.platform, output.stderr);
        }

        Ok(DeploymentReceipt {
            platform: request.platform,
            deployment: deployment.to_string(),
            mandatory: request.mandatory,
        })
    }
}
