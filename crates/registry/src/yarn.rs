//! Yarn 2+ release tags.
//!
//! Modern Yarn is not published to the npm registry under `yarn`; its
//! releases are listed by a dedicated endpoint:
//!
//! ```json
//! { "latest": { "stable": "4.5.1", "canary": "4.5.1-git.1" }, "tags": ["4.5.1", "4.5.0"] }
//! ```

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::packument::DEFAULT_TAG;
use crate::range::{NpmRange, max_satisfying};
use reqwest::Client;
use serde::Deserialize;

/// Package name Yarn versions are recorded under.
pub const YARN_PACKAGE: &str = "yarn";

/// The tag endpoint's response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct YarnTags {
    /// Current release channels.
    pub latest: YarnLatest,
    /// Every published version.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Current release of each channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct YarnLatest {
    /// Latest stable release.
    pub stable: String,
    /// Latest canary build.
    #[serde(default)]
    pub canary: Option<String>,
}

impl YarnTags {
    /// Picks the release for `wanted`.
    ///
    /// `None` or `latest` selects the stable channel; anything else is read
    /// as a range and matched against the published tags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMatchingVersion`] when no tag satisfies `wanted`.
    ///
    /// # Example
    ///
    /// ```
    /// use setpm_registry::yarn::{YarnLatest, YarnTags};
    ///
    /// let tags = YarnTags {
    ///     latest: YarnLatest { stable: "4.5.1".into(), canary: None },
    ///     tags: vec!["3.8.7".into(), "4.5.0".into(), "4.5.1".into()],
    /// };
    /// assert_eq!(tags.select(None).unwrap(), "4.5.1");
    /// assert_eq!(tags.select(Some("3")).unwrap(), "3.8.7");
    /// assert!(tags.select(Some("^5")).is_err());
    /// ```
    pub fn select(&self, wanted: Option<&str>) -> Result<String> {
        let wanted = match wanted.map(str::trim) {
            None | Some(DEFAULT_TAG) => {
                tracing::debug!(version = %self.latest.stable, "Using latest stable yarn");
                return Ok(self.latest.stable.clone());
            }
            Some(wanted) => wanted,
        };

        let picked = NpmRange::parse(wanted)
            .and_then(|range| max_satisfying(self.tags.iter().map(String::as_str), &range));

        match picked {
            Some(version) => {
                tracing::debug!(wanted, %version, "Matched yarn tag");
                Ok(version.to_string())
            }
            None => Err(Error::no_matching_version(YARN_PACKAGE, wanted)),
        }
    }
}

/// Fetches [`YarnTags`] from the tag endpoint.
#[derive(Debug, Clone)]
pub struct YarnTagsClient {
    client: Client,
    url: String,
}

impl YarnTagsClient {
    /// Creates a client for the endpoint in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        Ok(Self::with_client(config.http_client()?, config.yarn_tags_url()?))
    }

    /// Creates a client around an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetches the current tag listing.
    ///
    /// # Errors
    ///
    /// Every failure, whether transport, status or body, is reported as
    /// [`Error::YarnTagsUnavailable`].
    pub async fn fetch_tags(&self) -> Result<YarnTags> {
        tracing::debug!(url = %self.url, "Fetching yarn berry tags");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| unavailable(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("{} returned HTTP {status}", self.url)));
        }

        let tags: YarnTags = response
            .json()
            .await
            .map_err(|e| unavailable(format!("unexpected response from {}: {e}", self.url)))?;

        tracing::debug!(
            stable = %tags.latest.stable,
            count = tags.tags.len(),
            "Fetched yarn berry tags"
        );
        Ok(tags)
    }
}

fn unavailable(reason: String) -> Error {
    tracing::debug!(%reason, "Yarn tag endpoint unavailable");
    Error::YarnTagsUnavailable { reason }
}
