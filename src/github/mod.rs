//! Release creation on GitHub.
//!
//! - [`ReleaseHost`] is the seam to the remote host's release API
//! - [`GitHubClient`] implements it over the GitHub REST API
//! - [`ReleaseTagger`] turns a [`ReleasePlan`] into a release request

mod client;
mod release;

pub use client::{GITHUB_API_URL, GitHubClient, classify_failure};
pub use release::{ReleasePlan, ReleaseTagger, TagPrefixes, release_body, release_title, tag_name};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Repository that receives releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    /// Owner (user or organisation)
    pub owner: String,
    /// Repository name
    pub name: String,
}

/// `POST /repos/{owner}/{repo}/releases` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateReleaseRequest {
    /// Repository owner (path parameter)
    #[serde(skip)]
    pub owner: String,
    /// Repository name (path parameter)
    #[serde(skip)]
    pub repo: String,
    /// Tag to create
    pub tag_name: String,
    /// Full commit hash the tag points at
    pub target_commitish: String,
    /// Release title
    pub name: String,
    /// Release description
    pub body: String,
}

/// Metadata of a created release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseReceipt {
    /// Release id
    #[serde(default)]
    pub id: u64,
    /// Tag the release was created with
    pub tag_name: String,
    /// Web URL of the release
    #[serde(default)]
    pub html_url: String,
}

/// A host that accepts release-creation requests.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Create a release. A tag that already exists must fail with a conflict.
    async fn create_release(&self, request: &CreateReleaseRequest) -> Result<ReleaseReceipt>;
}
