//! Classification of the argument given to `setpm`.

use setpm_registry::{is_version_or_range, parse_specifier};
use setpm_workspaces::PackageManager;

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerSpecifier {
    /// A bare manager identifier: `npm`, `pnpm`, `yarn` or `yarnv1`.
    Known(PackageManager),
    /// A version or range for whichever manager the project uses.
    VersionOrRange(String),
    /// A registry specifier naming the package, `pnpm@^9`.
    Registry {
        /// Package name.
        name: String,
        /// Version, range or tag; `*` when omitted.
        spec: String,
    },
    /// Anything else: git URLs, tarballs, local paths, unparseable text.
    Unsupported(String),
}

impl ManagerSpecifier {
    /// Classifies `text`, or returns `None` when it is empty.
    ///
    /// Identifiers and versions are matched case-insensitively after
    /// trimming; registry specifiers keep their original case so the
    /// name check can reject uppercase package names.
    ///
    /// # Example
    ///
    /// ```
    /// use setpm::specifier::ManagerSpecifier;
    /// use setpm_workspaces::PackageManager;
    ///
    /// assert_eq!(
    ///     ManagerSpecifier::classify(" PNPM "),
    ///     Some(ManagerSpecifier::Known(PackageManager::Pnpm))
    /// );
    /// assert_eq!(
    ///     ManagerSpecifier::classify("^9"),
    ///     Some(ManagerSpecifier::VersionOrRange("^9".into()))
    /// );
    /// assert_eq!(ManagerSpecifier::classify("  "), None);
    /// ```
    #[must_use]
    pub fn classify(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = trimmed.to_lowercase();
        if let Some(manager) = PackageManager::parse_identifier(&normalized) {
            return Some(Self::Known(manager));
        }
        if is_version_or_range(&normalized) {
            return Some(Self::VersionOrRange(normalized));
        }

        let classified = match parse_specifier(trimmed) {
            Ok(spec) if spec.kind.is_registry() => match spec.name {
                Some(name) => Self::Registry {
                    name,
                    spec: spec.fetch_spec,
                },
                None => Self::Unsupported(trimmed.to_string()),
            },
            Ok(spec) => {
                tracing::debug!(specifier = trimmed, kind = %spec.kind, "Specifier is not a registry spec");
                Self::Unsupported(trimmed.to_string())
            }
            Err(e) => {
                tracing::debug!(specifier = trimmed, error = %e, "Specifier did not parse");
                Self::Unsupported(trimmed.to_string())
            }
        };
        Some(classified)
    }
}
