//! Project configuration (`dymo.toml`).
//!
//! Holds everything that is specific to one app repository: where to hash,
//! which remote and branch to release from, where releases go and which
//! App Center apps receive the bundles.

use crate::appcenter::{AppKeys, DeploymentNames};
use crate::error::{ReleaseError, Result};
use crate::fingerprint::{DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_FILES, ExclusionRules};
use crate::github::{GITHUB_API_URL, RepoTarget, TagPrefixes};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dymo.toml";

/// Parsed project configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// What gets fingerprinted
    #[serde(default)]
    pub project: ProjectSection,
    /// Where commits come from
    pub git: GitSection,
    /// Where releases are created
    pub github: GitHubSection,
    /// Where bundles are deployed
    pub appcenter: AppCenterSection,
    /// How tags are named
    #[serde(default)]
    pub tags: TagSection,
}

/// `[project]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Project root, relative paths resolve against the config file
    #[serde(default = "default_project_path")]
    pub path: PathBuf,
    /// Directory basename globs excluded from the fingerprint
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    /// File basename globs excluded from the fingerprint
    #[serde(default = "default_exclude_files")]
    pub exclude_files: Vec<String>,
}

/// `[git]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitSection {
    /// Remote name
    #[serde(default = "default_remote")]
    pub remote: String,
    /// URL the remote must point at
    pub remote_url: String,
    /// Branch whose remote-tracking ref is released from
    #[serde(default = "default_branch")]
    pub branch: String,
    /// How many recent commits to offer
    #[serde(default = "default_commit_window")]
    pub commits: usize,
}

/// `[github]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubSection {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// User-Agent sent with API requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// API root
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// `[appcenter]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppCenterSection {
    /// Android app (`Owner/App`)
    pub android_app: String,
    /// iOS app (`Owner/App`)
    pub ios_app: String,
    /// Production deployment name
    #[serde(default = "default_production")]
    pub production_deployment: String,
    /// Staging deployment name
    #[serde(default = "default_staging")]
    pub staging_deployment: String,
    /// iOS build configuration for production releases
    #[serde(default = "default_build_configuration")]
    pub build_configuration: String,
}

/// `[tags]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagSection {
    /// Android tag prefix
    #[serde(default = "default_android_prefix")]
    pub android_prefix: String,
    /// iOS tag prefix
    #[serde(default = "default_ios_prefix")]
    pub ios_prefix: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            path: default_project_path(),
            exclude_dirs: default_exclude_dirs(),
            exclude_files: default_exclude_files(),
        }
    }
}

impl Default for TagSection {
    fn default() -> Self {
        Self {
            android_prefix: default_android_prefix(),
            ios_prefix: default_ios_prefix(),
        }
    }
}

impl ProjectConfig {
    /// Read, parse and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ReleaseError::Config {
            path: path.to_path_buf(),
            reason: format!("cannot read: {}", e),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&raw, base).map_err(|reason| ReleaseError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse and validate TOML, resolving relative paths against `base`.
    pub fn from_toml(raw: &str, base: &Path) -> std::result::Result<Self, String> {
        let mut config: ProjectConfig = toml::from_str(raw).map_err(|e| e.to_string())?;

        if config.project.path.is_relative() {
            config.project.path = base.join(&config.project.path);
        }

        config.validate()?;
        log::debug!("Loaded config for {}/{}", config.github.owner, config.github.repo);
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let required = [
            ("git.remote_url", &self.git.remote_url),
            ("github.owner", &self.github.owner),
            ("github.repo", &self.github.repo),
            ("appcenter.android_app", &self.appcenter.android_app),
            ("appcenter.ios_app", &self.appcenter.ios_app),
            ("tags.android_prefix", &self.tags.android_prefix),
            ("tags.ios_prefix", &self.tags.ios_prefix),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", key));
            }
        }

        if self.tags.android_prefix == self.tags.ios_prefix {
            return Err("tags.android_prefix and tags.ios_prefix must differ".to_string());
        }

        if self.git.commits == 0 {
            return Err("git.commits must be at least 1".to_string());
        }

        self.exclusion_rules()
            .map(|_| ())
            .map_err(|e| format!("invalid exclusion pattern: {}", e))
    }

    /// Compiled fingerprint exclusions
    pub fn exclusion_rules(&self) -> std::result::Result<ExclusionRules, glob::PatternError> {
        ExclusionRules::new(&self.project.exclude_dirs, &self.project.exclude_files)
    }

    /// Release repository
    pub fn repo_target(&self) -> RepoTarget {
        RepoTarget {
            owner: self.github.owner.clone(),
            name: self.github.repo.clone(),
        }
    }

    /// Tag prefixes per platform
    pub fn tag_prefixes(&self) -> TagPrefixes {
        TagPrefixes {
            android: self.tags.android_prefix.clone(),
            ios: self.tags.ios_prefix.clone(),
        }
    }

    /// App Center apps per platform
    pub fn app_keys(&self) -> AppKeys {
        AppKeys {
            android: self.appcenter.android_app.clone(),
            ios: self.appcenter.ios_app.clone(),
        }
    }

    /// App Center deployments per ring
    pub fn deployment_names(&self) -> DeploymentNames {
        DeploymentNames {
            production: self.appcenter.production_deployment.clone(),
            staging: self.appcenter.staging_deployment.clone(),
        }
    }
}

fn default_project_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude_dirs() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_exclude_files() -> Vec<String> {
    DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_commit_window() -> usize {
    5
}

fn default_user_agent() -> String {
    format!("dymo/{}", env!("CARGO_PKG_VERSION"))
}

fn default_api_url() -> String {
    GITHUB_API_URL.to_string()
}

fn default_production() -> String {
    "Production".to_string()
}

fn default_staging() -> String {
    "Staging".to_string()
}

fn default_build_configuration() -> String {
    "Release".to_string()
}

fn default_android_prefix() -> String {
    "android-cp-".to_string()
}

fn default_ios_prefix() -> String {
    "ios-cp-".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[git]
remote_url = "https://github.com/acme/app.git"

[github]
owner = "acme"
repo = "app"

[appcenter]
android_app = "Acme/App-Android"
ios_app = "Acme/App-iOS"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = ProjectConfig::from_toml(MINIMAL, Path::new("/work")).unwrap();
        assert_eq!(config.project.path, Path::new("/work/."));
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.branch, "master");
        assert_eq!(config.git.commits, 5);
        assert_eq!(config.tags.android_prefix, "android-cp-");
        assert_eq!(config.appcenter.build_configuration, "Release");
        assert!(config.exclusion_rules().unwrap().excludes_dir("node_modules"));
    }

    #[test]
    fn absolute_project_path_is_kept() {
        let raw = format!("[project]\npath = \"/srv/app\"\n{}", MINIMAL);
        let config = ProjectConfig::from_toml(&raw, Path::new("/work")).unwrap();
        assert_eq!(config.project.path, Path::new("/srv/app"));
    }

    #[test]
    fn empty_owner_is_rejected() {
        let raw = MINIMAL.replace("owner = \"acme\"", "owner = \"\"");
        let err = ProjectConfig::from_toml(&raw, Path::new(".")).unwrap_err();
        assert!(err.contains("github.owner"));
    }

    #[test]
    fn bad_glob_is_rejected() {
        let raw = format!("[project]\nexclude_dirs = [\"[oops\"]\n{}", MINIMAL);
        let err = ProjectConfig::from_toml(&raw, Path::new(".")).unwrap_err();
        assert!(err.contains("exclusion pattern"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ProjectConfig::load(Path::new("/nope/dymo.toml")).unwrap_err();
        assert!(matches!(err, ReleaseError::Config { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
