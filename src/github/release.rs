//! Release plans and their translation into release requests.

use super::{CreateReleaseRequest, ReleaseHost, ReleaseReceipt, RepoTarget};
use crate::error::{ReleaseError, Result};
use crate::fingerprint::FingerprintNode;
use crate::git::ResolvedCommit;
use crate::platform::Platform;

/// Everything needed to publish one platform's release.
///
/// Built once per platform and consumed by [`ReleaseTagger::create_release`].
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    platform: Platform,
    version: u64,
    commit: ResolvedCommit,
    fingerprint: FingerprintNode,
    note: String,
}

impl ReleasePlan {
    /// Create a plan; `version` must be positive.
    pub fn new(
        platform: Platform,
        version: u64,
        commit: ResolvedCommit,
        fingerprint: FingerprintNode,
        note: impl Into<String>,
    ) -> Result<Self> {
        if version == 0 {
            return Err(ReleaseError::VersionParse {
                label: version.to_string(),
                reason: "release versions start at 1".to_string(),
            });
        }

        Ok(Self {
            platform,
            version,
            commit,
            fingerprint,
            note: note.into(),
        })
    }

    /// Target platform
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Numeric CodePush version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Commit being released
    pub fn commit(&self) -> &ResolvedCommit {
        &self.commit
    }

    /// Project fingerprint root
    pub fn fingerprint(&self) -> &FingerprintNode {
        &self.fingerprint
    }

    /// Operator note, possibly empty
    pub fn note(&self) -> &str {
        &self.note
    }
}

/// `<prefix><version>`, e.g. `android-cp-8`.
pub fn tag_name(prefix: &str, version: u64) -> String {
    format!("{}{}", prefix, version)
}

/// `<Platform> Codepush v<version>`, e.g. `Android Codepush v8`.
pub fn release_title(platform: Platform, version: u64) -> String {
    format!("{} Codepush v{}", platform.display_name(), version)
}

/// Release description: provenance, fingerprint summary, optional note.
pub fn release_body(fingerprint: &FingerprintNode, note: &str) -> String {
    let mut body = format!("Release made with Dymo v{} \n", env!("CARGO_PKG_VERSION"));
    body.push_str(&format!(
        "Project hash: `{}` (from {} hashed files).",
        fingerprint.hash,
        fingerprint.leaf_count()
    ));
    if !note.is_empty() {
        body.push_str("\n\n");
        body.push_str(note);
    }
    body
}

/// Per-platform tag name prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPrefixes {
    /// Prefix for Android tags
    pub android: String,
    /// Prefix for iOS tags
    pub ios: String,
}

impl TagPrefixes {
    /// Prefix used for `platform`
    pub fn for_platform(&self, platform: Platform) -> &str {
        match platform {
            Platform::Android => &self.android,
            Platform::Ios => &self.ios,
        }
    }
}

impl Default for TagPrefixes {
    fn default() -> Self {
        Self {
            android: "android-cp-".to_string(),
            ios: "ios-cp-".to_string(),
        }
    }
}

/// Creates releases for plans on a [`ReleaseHost`].
pub struct ReleaseTagger<'a> {
    host: &'a dyn ReleaseHost,
    repo: RepoTarget,
    prefixes: TagPrefixes,
}

impl<'a> ReleaseTagger<'a> {
    /// Tag releases in `repo` using `prefixes`.
    pub fn new(host: &'a dyn ReleaseHost, repo: RepoTarget, prefixes: TagPrefixes) -> Self {
        Self {
            host,
            repo,
            prefixes,
        }
    }

    /// The request that `plan` will be submitted as.
    pub fn build_request(&self, plan: &ReleasePlan) -> CreateReleaseRequest {
        CreateReleaseRequest {
            owner: self.repo.owner.clone(),
            repo: self.repo.name.clone(),
            tag_name: tag_name(self.prefixes.for_platform(plan.platform), plan.version),
            target_commitish: plan.commit.full_hash.clone(),
            name: release_title(plan.platform, plan.version),
            body: release_body(&plan.fingerprint, &plan.note),
        }
    }

    /// Submit `plan` to the host.
    pub async fn create_release(&self, plan: ReleasePlan) -> Result<ReleaseReceipt> {
        let request = self.build_request(&plan);
        log::info!(
            "Creating release {} at {} for {}",
            request.tag_name,
            request.target_commitish,
            plan.platform
        );
        self.host.create_release(&request).await
    }
}
