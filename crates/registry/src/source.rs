//! Version sources: where a package manager's concrete version comes from.

use crate::client::RegistryClient;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::packument::pick_version;
use crate::yarn::YarnTagsClient;
use async_trait::async_trait;

/// Turns a requested version, range or tag into a concrete version.
///
/// Each call performs exactly one network request.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolves `wanted` for package `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint fails or nothing satisfies `wanted`.
    async fn resolve(&self, name: &str, wanted: &str) -> Result<String>;
}

/// Resolves through the npm registry's packument.
#[derive(Debug, Clone)]
pub struct NpmRegistrySource {
    client: RegistryClient,
}

impl NpmRegistrySource {
    /// Creates a source for the registry in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry URL or HTTP client is invalid.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        Ok(Self::from_client(RegistryClient::new(config)?))
    }

    /// Wraps an existing registry client.
    #[must_use]
    pub fn from_client(client: RegistryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VersionSource for NpmRegistrySource {
    fn name(&self) -> &'static str {
        "npm-registry"
    }

    async fn resolve(&self, name: &str, wanted: &str) -> Result<String> {
        let packument = self.client.fetch_packument(name).await?;
        pick_version(&packument, wanted)
    }
}

/// Resolves Yarn 2+ through the yarn tag endpoint.
#[derive(Debug, Clone)]
pub struct YarnBerrySource {
    client: YarnTagsClient,
}

impl YarnBerrySource {
    /// Creates a source for the endpoint in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL or HTTP client is invalid.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        Ok(Self::from_client(YarnTagsClient::new(config)?))
    }

    /// Wraps an existing tag client.
    #[must_use]
    pub fn from_client(client: YarnTagsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VersionSource for YarnBerrySource {
    fn name(&self) -> &'static str {
        "yarn-berry-tags"
    }

    async fn resolve(&self, name: &str, wanted: &str) -> Result<String> {
        tracing::trace!(package = name, wanted, "Resolving through yarn tag endpoint");
        let tags = self.client.fetch_tags().await?;
        tags.select(Some(wanted))
    }
}
