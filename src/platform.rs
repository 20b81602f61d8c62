//! Target platforms and release modes.

use std::fmt;

/// A mobile platform that receives CodePush updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Platform {
    /// Android (primary platform)
    Android,
    /// iOS
    Ios,
}

impl Platform {
    /// All platforms in menu order
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    /// Lowercase identifier used in config keys and logs
    pub fn id(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// Human-readable name used in release titles
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }

    /// The primary platform never carries a build-configuration flag.
    pub fn is_primary(self) -> bool {
        matches!(self, Platform::Android)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The operator's answer to "which platforms?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PlatformSelection {
    /// Android only
    Android,
    /// iOS only
    Ios,
    /// Android and iOS
    Both,
}

impl PlatformSelection {
    /// Menu entries, in index order
    pub const MENU: [PlatformSelection; 3] = [
        PlatformSelection::Android,
        PlatformSelection::Ios,
        PlatformSelection::Both,
    ];

    /// Label shown in the selection menu
    pub fn label(self) -> &'static str {
        match self {
            PlatformSelection::Android => "ANDROID only",
            PlatformSelection::Ios => "IOS only",
            PlatformSelection::Both => "BOTH",
        }
    }

    /// Map a menu index back to a selection
    pub fn from_index(index: usize) -> Option<Self> {
        Self::MENU.get(index).copied()
    }

    /// Platforms covered by this selection, primary first
    pub fn platforms(self) -> Vec<Platform> {
        match self {
            PlatformSelection::Android => vec![Platform::Android],
            PlatformSelection::Ios => vec![Platform::Ios],
            PlatformSelection::Both => Platform::ALL.to_vec(),
        }
    }
}

/// Which workflow the orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fingerprint, tag a release, deploy to the production ring
    Production,
    /// Deploy straight to the staging ring, no tagging
    Staging,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Production => f.write_str("production"),
            Mode::Staging => f.write_str("staging"),
        }
    }
}

/// Deployment channel a release is pushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ring {
    /// Production deployment
    Production,
    /// Staging deployment
    Staging,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_indices_map_to_platform_sets() {
        assert_eq!(
            PlatformSelection::from_index(0).map(PlatformSelection::platforms),
            Some(vec![Platform::Android])
        );
        assert_eq!(
            PlatformSelection::from_index(1).map(PlatformSelection::platforms),
            Some(vec![Platform::Ios])
        );
        assert_eq!(
            PlatformSelection::from_index(2).map(PlatformSelection::platforms),
            Some(vec![Platform::Android, Platform::Ios])
        );
        assert_eq!(PlatformSelection::from_index(3), None);
    }

    #[test]
    fn only_android_is_primary() {
        assert!(Platform::Android.is_primary());
        assert!(!Platform::Ios.is_primary());
    }
}
