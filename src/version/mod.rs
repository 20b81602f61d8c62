//! CodePush version resolution from deployment history.
//!
//! Version labels look like `v7`. The next version strips every non-digit
//! character from the most recent label and adds one, so `v1.2` resolves to
//! `13`, not `2`. Tag names downstream depend on this exact scheme.

use crate::error::{ReleaseError, Result};
use crate::platform::Platform;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;

/// Label assumed when a platform has no deployment history
pub const DEFAULT_VERSION_LABEL: &str = "v0";

/// Placeholder shown for absent history fields
pub const MISSING_FIELD: &str = "-";

/// A CodePush label: `v` followed by digits, as a standalone token.
static LABEL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bv[0-9]+\b").expect("label regex is valid"));

/// One entry of a deployment's release history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Release label (e.g. `v7`)
    pub label: String,
    /// When the release was made
    #[serde(default, alias = "uploadTime", alias = "releaseDate")]
    pub release_time: Option<String>,
    /// App store binary version the release targets
    #[serde(default, alias = "appVersion", alias = "binaryTarget")]
    pub target_binary_version: Option<String>,
}

/// Summary of the most recent release of one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformVersionInfo {
    /// Platform the history belongs to
    pub platform: Platform,
    /// Most recent label, `None` when the history is empty
    pub last_version: Option<String>,
    /// Release date of the most recent entry
    pub release_date: Option<String>,
    /// Binary version targeted by the most recent entry
    pub binary_target: Option<String>,
}

impl PlatformVersionInfo {
    /// Build from a history ordered oldest to newest; the last entry wins.
    pub fn from_history(platform: Platform, history: &[HistoryEntry]) -> Self {
        match history.last() {
            Some(entry) => Self {
                platform,
                last_version: Some(entry.label.clone()),
                release_date: entry.release_time.clone(),
                binary_target: entry.target_binary_version.clone(),
            },
            None => Self {
                platform,
                last_version: None,
                release_date: None,
                binary_target: None,
            },
        }
    }

    /// Last label, or [`DEFAULT_VERSION_LABEL`] when there is no history
    pub fn last_version_or_default(&self) -> &str {
        self.last_version.as_deref().unwrap_or(DEFAULT_VERSION_LABEL)
    }

    /// Release date, or [`MISSING_FIELD`]
    pub fn release_date_or_default(&self) -> &str {
        self.release_date.as_deref().unwrap_or(MISSING_FIELD)
    }

    /// Targeted binary version, or [`MISSING_FIELD`]
    pub fn binary_target_or_default(&self) -> &str {
        self.binary_target.as_deref().unwrap_or(MISSING_FIELD)
    }

    /// Next numeric version for this platform
    pub fn next_version(&self) -> Result<u64> {
        resolve_next_version(self.last_version.as_deref().unwrap_or_default())
    }
}

impl fmt::Display for PlatformVersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (released {}, binary {})",
            self.last_version_or_default(),
            self.release_date_or_default(),
            self.binary_target_or_default()
        )
    }
}

/// Resolve the version that follows `label`.
///
/// An empty label means "no history" and yields `1`. All digit runs are
/// concatenated before parsing.
///
/// # Errors
///
/// [`ReleaseError::VersionParse`] when a non-empty label contains no digits
/// or the digits overflow.
pub fn resolve_next_version(label: &str) -> Result<u64> {
    if label.trim().is_empty() {
        return Ok(1);
    }

    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ReleaseError::VersionParse {
            label: label.to_string(),
            reason: "label contains no digits".to_string(),
        });
    }

    if digit_runs(label) > 1 {
        log::warn!(
            "Version label {:?} has several numeric runs; using concatenated value {}",
            label,
            digits
        );
    }

    let current: u64 = digits.parse().map_err(|e| ReleaseError::VersionParse {
        label: label.to_string(),
        reason: format!("{}", e),
    })?;

    current.checked_add(1).ok_or_else(|| ReleaseError::VersionParse {
        label: label.to_string(),
        reason: "version overflows".to_string(),
    })
}

/// Parse `--output json` deployment history.
pub fn parse_history_json(raw: &str) -> Result<Vec<HistoryEntry>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Parse deployment history of any other shape.
///
/// Every `v<digits>` token in the output becomes an entry with that label
/// and no other fields, in output order, so the last token wins. Works for
/// tables and for JSON that does not match [`HistoryEntry`].
pub fn parse_history_text(raw: &str) -> Vec<HistoryEntry> {
    LABEL_TOKEN
        .find_iter(raw)
        .map(|m| HistoryEntry {
            label: m.as_str().to_string(),
            release_time: None,
            target_binary_version: None,
        })
        .collect()
}

fn digit_runs(label: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for c in label.chars() {
        let digit = c.is_ascii_digit();
        if digit && !in_run {
            runs += 1;
        }
        in_run = digit;
    }
    runs
}
