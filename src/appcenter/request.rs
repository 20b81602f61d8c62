//! Deployment requests and the commands they translate to.

use crate::platform::{Platform, Ring};
use crate::process::CommandSpec;

/// One platform's deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    /// Platform to deploy
    pub platform: Platform,
    /// Target ring
    pub ring: Ring,
    /// Whether clients must install the update
    pub mandatory: bool,
    /// Native build configuration, only for non-primary production releases
    pub build_config: Option<String>,
}

impl DeploymentRequest {
    /// Build a request, attaching `build_configuration` only to production
    /// deployments of a non-primary platform.
    pub fn new(platform: Platform, ring: Ring, mandatory: bool, build_configuration: &str) -> Self {
        let build_config = (ring == Ring::Production && !platform.is_primary())
            .then(|| build_configuration.to_string());

        Self {
            platform,
            ring,
            mandatory,
            build_config,
        }
    }
}

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    /// Platform deployed
    pub platform: Platform,
    /// Deployment name released to
    pub deployment: String,
    /// Whether the release was mandatory
    pub mandatory: bool,
}

/// `appcenter codepush release-react` invocation for `request`.
pub fn deploy_command(
    program: &str,
    app: &str,
    deployment: &str,
    request: &DeploymentRequest,
) -> CommandSpec {
    let mut spec = CommandSpec::new(program).args([
        "codepush",
        "release-react",
        "-a",
        app,
        "-d",
        deployment,
    ]);

    if request.mandatory {
        spec = spec.arg("--mandatory");
    }
    if let Some(config) = &request.build_config {
        spec = spec.args(["--build-configuration-name", config.as_str()]);
    }
    spec
}

/// `appcenter codepush deployment history` invocation, JSON output.
pub fn history_command(program: &str, app: &str, deployment: &str) -> CommandSpec {
    CommandSpec::new(program).args([
        "codepush",
        "deployment",
        "history",
        "-a",
        app,
        deployment,
        "--output",
        "json",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_configuration_only_for_production_ios() {
        let ios_prod = DeploymentRequest::new(Platform::Ios, Ring::Production, false, "Release");
        let ios_staging = DeploymentRequest::new(Platform::Ios, Ring::Staging, false, "Release");
        let android_prod =
            DeploymentRequest::new(Platform::Android, Ring::Production, false, "Release");

        assert_eq!(ios_prod.build_config.as_deref(), Some("Release"));
        assert_eq!(ios_staging.build_config, None);
        assert_eq!(android_prod.build_config, None);
    }

    #[test]
    fn production_ios_command_carries_all_flags() {
        let request = DeploymentRequest::new(Platform::Ios, Ring::Production, true, "Release");
        let spec = deploy_command("appcenter", "Acme/App-iOS", "Production", &request);
        assert_eq!(
            spec.to_string(),
            "appcenter codepush release-react -a Acme/App-iOS -d Production --mandatory \
             --build-configuration-name Release"
        );
    }

    #[test]
    fn mandatory_flag_is_opt_in() {
        let request = DeploymentRequest::new(Platform::Android, Ring::Staging, false, "Release");
        let spec = deploy_command("appcenter", "Acme/App-Android", "Staging", &request);
        assert!(!spec.arg_list().iter().any(|a| a == "--mandatory"));
        assert_eq!(
            spec.to_string(),
            "appcenter codepush release-react -a Acme/App-Android -d Staging"
        );
    }

    #[test]
    fn history_requests_json() {
        let spec = history_command("appcenter", "Acme/App-Android", "Production");
        assert_eq!(
            spec.to_string(),
            "appcenter codepush deployment history -a Acme/App-Android Production --output json"
        );
    }
}
