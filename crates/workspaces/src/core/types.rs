//! Core types for identifying package managers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the package managers with first-class handling.
///
/// The set is closed on purpose: adding a manager means adding a variant and
/// fixing every exhaustive `match` the compiler points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm package manager
    Npm,
    /// pnpm package manager
    Pnpm,
    /// Yarn Modern (v2+, Berry)
    Yarn,
    /// Yarn Classic (v1.x)
    #[serde(rename = "yarnv1")]
    YarnClassic,
}

impl PackageManager {
    /// Every known manager, in the order identifiers are documented.
    pub const ALL: [Self; 4] = [Self::Npm, Self::Yarn, Self::YarnClassic, Self::Pnpm];

    /// Matches a user-supplied identifier, ignoring case and surrounding whitespace.
    ///
    /// # Example
    ///
    /// ```
    /// use setpm_workspaces::PackageManager;
    ///
    /// assert_eq!(PackageManager::parse_identifier(" PNPM "), Some(PackageManager::Pnpm));
    /// assert_eq!(PackageManager::parse_identifier("yarnv1"), Some(PackageManager::YarnClassic));
    /// assert_eq!(PackageManager::parse_identifier("bun"), None);
    /// ```
    #[must_use]
    pub fn parse_identifier(input: &str) -> Option<Self> {
        let normalized = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|manager| manager.identifier() == normalized)
    }

    /// Returns the identifier accepted on the command line.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::YarnClassic => "yarnv1",
        }
    }

    /// Returns the name the manager is published under, which is also the
    /// name recorded in a `packageManager` field.
    ///
    /// # Example
    ///
    /// ```
    /// use setpm_workspaces::PackageManager;
    ///
    /// assert_eq!(PackageManager::YarnClassic.package_name(), "yarn");
    /// assert_eq!(PackageManager::Pnpm.package_name(), "pnpm");
    /// ```
    #[must_use]
    pub const fn package_name(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn | Self::YarnClassic => "yarn",
        }
    }

    /// Returns the lockfile name for this package manager.
    ///
    /// # Example
    ///
    /// ```
    /// use setpm_workspaces::PackageManager;
    ///
    /// assert_eq!(PackageManager::Npm.lockfile_name(), "package-lock.json");
    /// assert_eq!(PackageManager::Pnpm.lockfile_name(), "pnpm-lock.yaml");
    /// ```
    #[must_use]
    pub const fn lockfile_name(&self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Yarn | Self::YarnClassic => "yarn.lock",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier_known() {
        assert_eq!(PackageManager::parse_identifier("npm"), Some(PackageManager::Npm));
        assert_eq!(PackageManager::parse_identifier("pnpm"), Some(PackageManager::Pnpm));
        assert_eq!(PackageManager::parse_identifier("yarn"), Some(PackageManager::Yarn));
        assert_eq!(
            PackageManager::parse_identifier("yarnv1"),
            Some(PackageManager::YarnClassic)
        );
    }

    #[test]
    fn test_parse_identifier_normalizes() {
        assert_eq!(PackageManager::parse_identifier("  Yarn\n"), Some(PackageManager::Yarn));
        assert_eq!(PackageManager::parse_identifier("NPM"), Some(PackageManager::Npm));
    }

    #[test]
    fn test_parse_identifier_rejects_others() {
        assert_eq!(PackageManager::parse_identifier(""), None);
        assert_eq!(PackageManager::parse_identifier("bun"), None);
        assert_eq!(PackageManager::parse_identifier("yarn@4"), None);
    }

    #[test]
    fn test_identifier_round_trips() {
        for manager in PackageManager::ALL {
            assert_eq!(PackageManager::parse_identifier(manager.identifier()), Some(manager));
        }
    }

    #[test]
    fn test_yarn_variants_share_package_and_lockfile() {
        assert_eq!(
            PackageManager::Yarn.package_name(),
            PackageManager::YarnClassic.package_name()
        );
        assert_eq!(
            PackageManager::Yarn.lockfile_name(),
            PackageManager::YarnClassic.lockfile_name()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PackageManager::YarnClassic.to_string(), "yarnv1");
        assert_eq!(PackageManager::Npm.to_string(), "npm");
    }

    #[test]
    fn test_serde_uses_identifiers() {
        let json = serde_json::to_string(&PackageManager::YarnClassic).unwrap();
        assert_eq!(json, "\"yarnv1\"");
        let parsed: PackageManager = serde_json::from_str("\"pnpm\"").unwrap();
        assert_eq!(parsed, PackageManager::Pnpm);
    }
}
