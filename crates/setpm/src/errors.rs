//! Errors surfaced by the `setpm` and `find-root-package-json` commands.
//!
//! Library errors from the workspace and registry crates pass through
//! unchanged so their diagnostic codes and help text reach the terminal.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving and recording a package manager.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No ancestor of the start directory holds a `package.json`.
    #[error("package.json not found")]
    #[diagnostic(
        code(setpm::cli::manifest_not_found),
        help("Run from inside a JavaScript project or pass the project directory explicitly")
    )]
    ManifestNotFound {
        /// Where the upward search began.
        start: PathBuf,
    },

    /// The user's specifier is neither a manager, a version nor a registry spec.
    #[error("Not sure how to handle specified package manager")]
    #[diagnostic(
        code(setpm::cli::unsupported_specifier),
        help("Use npm, pnpm, yarn, yarnv1, a version such as 9.1.0, or name@range")
    )]
    UnsupportedSpecifier {
        /// The text as given.
        specifier: String,
    },

    /// The registry had no version satisfying the request, or could not be read.
    #[error("Could not find a version of {name} matching {version}")]
    #[diagnostic(code(setpm::cli::no_matching_version))]
    NoMatchingVersion {
        /// Package looked up.
        name: String,
        /// Version, range or tag requested.
        version: String,
        /// Underlying failure, when there was one.
        #[help]
        reason: Option<String>,
    },

    /// The yarn tag endpoint failed.
    #[error("Could not fetch yarn berry tags")]
    #[diagnostic(code(setpm::cli::yarn_tags_unavailable))]
    YarnTagsUnavailable {
        /// What went wrong.
        #[help]
        reason: Option<String>,
    },

    /// `package.json` exists but could not be read.
    #[error("Failed to read {}", .path.display())]
    #[diagnostic(
        code(setpm::cli::manifest_read),
        help("Check file permissions and ensure the path exists")
    )]
    ManifestRead {
        /// The manifest path.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// `package.json` is not valid JSON.
    #[error("Failed to parse {}", .path.display())]
    #[diagnostic(
        code(setpm::cli::manifest_parse),
        help("Fix the JSON syntax before setting a package manager")
    )]
    ManifestParse {
        /// The manifest path.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// `package.json` parsed, but its top level is not an object.
    #[error("{} does not contain a JSON object", .path.display())]
    #[diagnostic(code(setpm::cli::manifest_not_object))]
    ManifestNotObject {
        /// The manifest path.
        path: PathBuf,
    },

    /// `package.json` could not be written back.
    #[error("Failed to write {}", .path.display())]
    #[diagnostic(
        code(setpm::cli::manifest_write),
        help("Check file permissions and available disk space")
    )]
    ManifestWrite {
        /// The manifest path.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The updated manifest could not be serialized.
    #[error("Failed to serialize {}", .path.display())]
    #[diagnostic(code(setpm::cli::manifest_serialize))]
    ManifestSerialize {
        /// The manifest path.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Workspace discovery failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Workspaces(#[from] setpm_workspaces::Error),

    /// A registry client could not be set up.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] setpm_registry::Error),
}

impl Error {
    /// Creates a [`Error::NoMatchingVersion`] carrying the underlying failure.
    #[must_use]
    pub fn no_matching_version(
        name: impl Into<String>,
        version: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self::NoMatchingVersion {
            name: name.into(),
            version: version.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        let error = Error::ManifestNotFound {
            start: PathBuf::from("/tmp"),
        };
        assert_eq!(error.to_string(), "package.json not found");

        let error = Error::UnsupportedSpecifier {
            specifier: "file:../pm".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Not sure how to handle specified package manager"
        );

        let error = Error::no_matching_version("pnpm", "^42", None);
        assert_eq!(error.to_string(), "Could not find a version of pnpm matching ^42");

        let error = Error::YarnTagsUnavailable { reason: None };
        assert_eq!(error.to_string(), "Could not fetch yarn berry tags");
    }

    #[test]
    fn test_reason_becomes_help() {
        let error = Error::no_matching_version("npm", "latest", Some("HTTP 500".to_string()));
        assert_eq!(
            error.help().map(|h| h.to_string()).as_deref(),
            Some("HTTP 500")
        );
        assert_eq!(
            error.code().map(|c| c.to_string()).as_deref(),
            Some("setpm::cli::no_matching_version")
        );
    }

    #[test]
    fn test_serialize_failure_is_not_a_parse_failure() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::ManifestSerialize {
            path: PathBuf::from("/repo/package.json"),
            source,
        };
        assert_eq!(error.to_string(), "Failed to serialize /repo/package.json");
        assert_eq!(
            error.code().map(|c| c.to_string()).as_deref(),
            Some("setpm::cli::manifest_serialize")
        );
    }

    #[test]
    fn test_library_errors_are_transparent() {
        let inner = setpm_registry::Error::YarnTagsUnavailable {
            reason: "offline".to_string(),
        };
        let error = Error::from(inner);
        assert_eq!(error.to_string(), "Could not fetch yarn berry tags");
        assert_eq!(
            error.code().map(|c| c.to_string()).as_deref(),
            Some("setpm::registry::yarn_tags_unavailable")
        );
    }
}
