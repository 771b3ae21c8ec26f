//! Error types for workspace operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during workspace operations.
///
/// Most filesystem trouble never surfaces here: missing or unreadable entries
/// are treated as absent while walking. These variants cover the few cases a
/// caller has to decide about.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The process working directory could not be determined.
    #[error("Failed to determine the current working directory: {source}")]
    #[diagnostic(
        code(setpm::workspaces::working_directory),
        help("Run setpm from an existing directory or pass an absolute path")
    )]
    WorkingDirectory {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A workspace glob in a manifest could not be compiled.
    #[error("Invalid workspace pattern '{pattern}' in {manifest}: {message}")]
    #[diagnostic(
        code(setpm::workspaces::invalid_pattern),
        help("Workspace patterns are globs relative to the manifest, such as 'packages/*'")
    )]
    InvalidWorkspacePattern {
        /// The offending pattern.
        pattern: String,
        /// Manifest declaring the pattern.
        manifest: PathBuf,
        /// Description of the glob error.
        message: String,
    },

    /// Two workspace members declare the same package name.
    #[error("Workspace '{name}' is declared twice: {first} and {second}")]
    #[diagnostic(
        code(setpm::workspaces::duplicate_workspace),
        help("Every workspace member must have a unique package name")
    )]
    DuplicateWorkspace {
        /// The shared package name.
        name: String,
        /// Directory of the first member.
        first: PathBuf,
        /// Directory of the second member.
        second: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_working_directory_error() {
        let error = Error::WorkingDirectory {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };

        let message = error.to_string();
        assert!(message.contains("current working directory"));
        assert!(message.contains("gone"));
    }

    #[test]
    fn test_invalid_workspace_pattern_error() {
        let error = Error::InvalidWorkspacePattern {
            pattern: "packages/[".to_string(),
            manifest: PathBuf::from("/repo/package.json"),
            message: "invalid range pattern".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("packages/["));
        assert!(message.contains("/repo/package.json"));
        assert!(message.contains("invalid range pattern"));
    }

    #[test]
    fn test_duplicate_workspace_error() {
        let error = Error::DuplicateWorkspace {
            name: "shared".to_string(),
            first: PathBuf::from("/repo/packages/a"),
            second: PathBuf::from("/repo/packages/b"),
        };

        let message = error.to_string();
        assert!(message.contains("'shared'"));
        assert!(message.contains("packages/a"));
        assert!(message.contains("packages/b"));
    }

    #[test]
    fn test_diagnostic_codes_and_help() {
        let errors = [
            Error::WorkingDirectory {
                source: std::io::Error::other("boom"),
            },
            Error::InvalidWorkspacePattern {
                pattern: "[".to_string(),
                manifest: PathBuf::from("/p"),
                message: "bad".to_string(),
            },
            Error::DuplicateWorkspace {
                name: "x".to_string(),
                first: PathBuf::from("/a"),
                second: PathBuf::from("/b"),
            },
        ];

        for error in &errors {
            let code = error.code().map(|c| c.to_string()).unwrap_or_default();
            assert!(code.starts_with("setpm::workspaces::"));
            assert!(error.help().is_some());
        }
    }
}
