//! Orchestration states.

use crate::platform::Platform;
use std::fmt;

/// A state of the release run.
///
/// Production: `Init → PlatformSelected → VersionsFetched → Fingerprinted →
/// CommitChosen → NoteCollected → (Tagged → Deployed)* → Done`.
/// Staging: `Init → PlatformSelected → Deployed* → Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Preconditions being checked
    Init,
    /// Platform set known
    PlatformSelected,
    /// Last versions fetched for every selected platform
    VersionsFetched,
    /// Project fingerprint computed
    Fingerprinted,
    /// Target commit chosen and resolved
    CommitChosen,
    /// Release note collected
    NoteCollected,
    /// Release created for a platform
    Tagged(Platform),
    /// Deployment issued for a platform
    Deployed(Platform),
    /// Run finished
    Done,
    /// Operator cancelled
    Cancelled,
    /// A step failed
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Tagged(p) => write!(f, "Tagged({})", p.id()),
            Stage::Deployed(p) => write!(f, "Deployed({})", p.id()),
            other => write!(f, "{:?}", other),
        }
    }
}
