//! Interactive CodePush release orchestration.
//!
//! This library provides the building blocks of a release run:
//! - Project fingerprinting (Merkle tree over the source tree)
//! - Next-version resolution from App Center deployment history
//! - Remote commit selection and full-hash resolution
//! - GitHub release tagging
//! - App Center CodePush deployment
//!
//! The [`orchestrator`] sequences them; it can be used both through the CLI
//! and as a library dependency with custom collaborators.

pub mod appcenter;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod git;
pub mod github;
pub mod orchestrator;
pub mod platform;
pub mod process;
pub mod version;

// Re-export commonly used types
pub use error::{CliError, ReleaseError, RemoteReleaseError, Result};
pub use orchestrator::{Collaborators, Orchestrator, RunOptions, RunSummary, Stage};
pub use platform::{Mode, Platform, PlatformSelection, Ring};
