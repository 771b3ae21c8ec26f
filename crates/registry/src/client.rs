//! npm registry client.

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::packument::Packument;
use reqwest::Client;
use reqwest::header::ACCEPT;

/// Prefer the abbreviated install document, fall back to full JSON.
const PACKUMENT_ACCEPT: &str =
    "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8, */*";

/// Fetches package documents from an npm-compatible registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    registry: String,
}

impl RegistryClient {
    /// Creates a client for the registry in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        Ok(Self::with_client(config.http_client()?, config.registry_url()?))
    }

    /// Creates a client around an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, registry: impl Into<String>) -> Self {
        let registry = registry.into().trim_end_matches('/').to_string();
        Self { client, registry }
    }

    /// URL of `name`'s packument.
    #[must_use]
    pub fn packument_url(&self, name: &str) -> String {
        format!("{}/{}", self.registry, escape_name(name))
    }

    /// Fetches the packument for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure,
    /// [`Error::PackumentNotFound`] on a non-success status and
    /// [`Error::Decode`] if the body is not a packument.
    pub async fn fetch_packument(&self, name: &str) -> Result<Packument> {
        let url = self.packument_url(name);
        tracing::debug!(%url, package = name, "Fetching packument");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, PACKUMENT_ACCEPT)
            .send()
            .await
            .map_err(|source| Error::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "Registry returned an error status");
            return Err(Error::PackumentNotFound {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }

        let mut packument: Packument = response
            .json()
            .await
            .map_err(|source| Error::Decode { url, source })?;
        if packument.name.is_empty() {
            packument.name = name.to_string();
        }

        tracing::debug!(
            package = name,
            versions = packument.versions.len(),
            "Fetched packument"
        );
        Ok(packument)
    }
}

/// Escapes the scope separator the way registries expect (`@scope%2fname`).
fn escape_name(name: &str) -> String {
    if name.starts_with('@') {
        name.replacen('/', "%2f", 1)
    } else {
        name.to_string()
    }
}
