//! Endpoint and HTTP settings shared by the version sources.

use crate::error::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Public npm registry.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Tag listing for Yarn 2+ releases.
pub const DEFAULT_YARN_TAGS_URL: &str = "https://repo.yarnpkg.com/tags";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how version lookups are performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Base URL of the npm registry.
    pub registry: String,
    /// URL of the yarn tag endpoint.
    pub yarn_tags_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            yarn_tags_url: DEFAULT_YARN_TAGS_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("setpm/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ResolverConfig {
    /// Builds the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if the TLS backend cannot be initialized.
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(|source| Error::Client { source })
    }

    /// The registry base URL, validated and without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the registry is not an absolute URL.
    pub fn registry_url(&self) -> Result<String> {
        validate_url(&self.registry).map(|url| url.trim_end_matches('/').to_string())
    }

    /// The yarn tag endpoint, validated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the endpoint is not an absolute URL.
    pub fn yarn_tags_url(&self) -> Result<String> {
        validate_url(&self.yarn_tags_url)
    }
}

fn validate_url(raw: &str) -> Result<String> {
    Url::parse(raw)
        .map(|url| url.to_string())
        .map_err(|source| Error::InvalidUrl {
            url: raw.to_string(),
            source,
        })
}
