//! App Center CodePush: deployment history and release dispatch.
//!
//! [`DeploymentHistory`] and [`Deployer`] are the seams to the deployment
//! CLI. [`AppCenterCli`] implements both on top of the `appcenter` binary.

mod cli;
mod request;

pub use cli::AppCenterCli;
pub use request::{
    DeploymentReceipt, DeploymentRequest, deploy_command, history_command,
};

use crate::error::Result;
use crate::platform::{Platform, Ring};
use crate::version::HistoryEntry;
use async_trait::async_trait;

/// App Center app identifiers (`Owner/App`) per platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppKeys {
    /// Android app
    pub android: String,
    /// iOS app
    pub ios: String,
}

impl AppKeys {
    /// App identifier for `platform`
    pub fn for_platform(&self, platform: Platform) -> &str {
        match platform {
            Platform::Android => &self.android,
            Platform::Ios => &self.ios,
        }
    }
}

/// Deployment names per ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentNames {
    /// Production deployment (e.g. `Production`)
    pub production: String,
    /// Staging deployment (e.g. `Staging`)
    pub staging: String,
}

impl DeploymentNames {
    /// Deployment name for `ring`
    pub fn for_ring(&self, ring: Ring) -> &str {
        match ring {
            Ring::Production => &self.production,
            Ring::Staging => &self.staging,
        }
    }
}

impl Default for DeploymentNames {
    fn default() -> Self {
        Self {
            production: "Production".to_string(),
            staging: "Staging".to_string(),
        }
    }
}

/// Read access to a deployment's release history.
#[async_trait]
pub trait DeploymentHistory: Send + Sync {
    /// Releases of `platform` on `ring`, oldest first
    async fn history(&self, platform: Platform, ring: Ring) -> Result<Vec<HistoryEntry>>;
}

/// Issues deployments.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Release the current bundle according to `request`
    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentReceipt>;
}
