//! Error types for registry lookups.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing specifiers or talking to version endpoints.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A dependency specifier could not be parsed.
    #[error("Invalid package specifier '{spec}': {reason}")]
    #[diagnostic(
        code(setpm::registry::invalid_specifier),
        help("Use a form like 'pnpm', 'pnpm@9', 'yarn@^4.1.0' or 'npm@latest'")
    )]
    InvalidSpecifier {
        /// The raw specifier text.
        spec: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A configured endpoint URL does not parse.
    #[error("Invalid URL '{url}': {source}")]
    #[diagnostic(
        code(setpm::registry::invalid_url),
        help("Registry and tag endpoints must be absolute http(s) URLs")
    )]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// The parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {source}")]
    #[diagnostic(code(setpm::registry::client))]
    Client {
        /// The reqwest builder error.
        #[source]
        source: reqwest::Error,
    },

    /// A request failed before a response arrived.
    #[error("Request to {url} failed: {source}")]
    #[diagnostic(
        code(setpm::registry::http),
        help("Check your network connection and the --registry setting")
    )]
    Http {
        /// The requested URL.
        url: String,
        /// The transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The registry has no packument for the package.
    #[error("Package '{name}' not found in registry (HTTP {status})")]
    #[diagnostic(
        code(setpm::registry::packument_not_found),
        help("Check the package manager name for typos")
    )]
    PackumentNotFound {
        /// The package name.
        name: String,
        /// The HTTP status returned.
        status: u16,
    },

    /// A response body was not the expected JSON.
    #[error("Failed to decode response from {url}: {source}")]
    #[diagnostic(code(setpm::registry::decode))]
    Decode {
        /// The requested URL.
        url: String,
        /// The decoding error.
        #[source]
        source: reqwest::Error,
    },

    /// No published version satisfies the request.
    #[error("Could not find a version of {name} matching {wanted}")]
    #[diagnostic(
        code(setpm::registry::no_matching_version),
        help("Pick an existing version, range or dist-tag")
    )]
    NoMatchingVersion {
        /// The package name.
        name: String,
        /// The requested version, range or tag.
        wanted: String,
    },

    /// The yarn tag endpoint could not be used.
    #[error("Could not fetch yarn berry tags")]
    #[diagnostic(
        code(setpm::registry::yarn_tags_unavailable),
        help("{reason}")
    )]
    YarnTagsUnavailable {
        /// What went wrong.
        reason: String,
    },
}

impl Error {
    /// Creates a [`Error::NoMatchingVersion`].
    #[must_use]
    pub fn no_matching_version(name: impl Into<String>, wanted: impl Into<String>) -> Self {
        Self::NoMatchingVersion {
            name: name.into(),
            wanted: wanted.into(),
        }
    }

    /// Creates a [`Error::InvalidSpecifier`].
    #[must_use]
    pub fn invalid_specifier(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpecifier {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_version_message() {
        let error = Error::no_matching_version("pnpm", "^99");
        assert_eq!(error.to_string(), "Could not find a version of pnpm matching ^99");
    }

    #[test]
    fn test_yarn_tags_unavailable_message() {
        let error = Error::YarnTagsUnavailable {
            reason: "HTTP 503".to_string(),
        };
        assert_eq!(error.to_string(), "Could not fetch yarn berry tags");
        assert_eq!(error.help().map(|h| h.to_string()).as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn test_invalid_specifier_message() {
        let error = Error::invalid_specifier("Bad Name@1", "name is not URL-safe");
        let message = error.to_string();
        assert!(message.contains("Bad Name@1"));
        assert!(message.contains("URL-safe"));
    }

    #[test]
    fn test_packument_not_found_code() {
        let error = Error::PackumentNotFound {
            name: "nope".to_string(),
            status: 404,
        };
        assert!(error.to_string().contains("HTTP 404"));
        assert_eq!(
            error.code().map(|c| c.to_string()).as_deref(),
            Some("setpm::registry::packument_not_found")
        );
    }
}
