//! Exclusion rules for project fingerprinting.

use glob::{Pattern, PatternError};
use walkdir::DirEntry;

/// Directory basenames pruned by default: hidden directories, dependencies,
/// native projects and test output.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".*",
    "node_modules",
    "test_coverage",
    "android",
    "ios",
    "__tests__",
];

/// File basenames skipped by default.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[".DS_Store"];

/// Glob patterns matched against entry basenames.
///
/// Directory patterns only apply to directories and file patterns only to
/// everything else. A matching entry is pruned together with its subtree.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    directories: Vec<Pattern>,
    files: Vec<Pattern>,
}

impl ExclusionRules {
    /// Compile directory and file patterns.
    pub fn new<D, F>(directories: D, files: F) -> Result<Self, PatternError>
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        Ok(Self {
            directories: compile(directories)?,
            files: compile(files)?,
        })
    }

    /// Rules that exclude nothing
    pub fn none() -> Self {
        Self {
            directories: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Whether a directory with this basename is pruned
    pub fn excludes_dir(&self, name: &str) -> bool {
        self.directories.iter().any(|p| p.matches(name))
    }

    /// Whether a file with this basename is skipped
    pub fn excludes_file(&self, name: &str) -> bool {
        self.files.iter().any(|p| p.matches(name))
    }

    pub(super) fn excludes(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            self.excludes_dir(&name)
        } else {
            self.excludes_file(&name)
        }
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        // The built-in patterns are valid globs.
        Self::new(DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_FILES).unwrap_or_else(|_| Self::none())
    }
}

fn compile<I>(patterns: I) -> Result<Vec<Pattern>, PatternError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| Pattern::new(p.as_ref()))
        .collect()
}
