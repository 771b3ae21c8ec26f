//! Tolerant `package.json` reading.
//!
//! Only the three fields the resolvers look at are modeled. Everything else in
//! the document is ignored, and fields holding an unexpected JSON type are
//! treated as absent rather than failing the whole manifest.

use crate::core::FileSystem;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Name of the directory package managers install dependencies into.
pub const INSTALL_DIR: &str = "node_modules";

/// The parts of a `package.json` the resolvers care about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Package name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    /// Previously recorded `packageManager` value, e.g. `pnpm@9.1.0`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub package_manager: Option<String>,

    /// Workspace member globs.
    #[serde(default)]
    pub workspaces: Option<WorkspacesField>,
}

/// The two shapes the `workspaces` field comes in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WorkspacesField {
    /// `"workspaces": ["packages/*"]`
    Array(Vec<String>),
    /// `"workspaces": { "packages": ["packages/*"], "nohoist": [...] }`
    Object {
        /// Member globs.
        #[serde(default)]
        packages: Vec<String>,
    },
    /// Anything else declares no members.
    Other(serde_json::Value),
}

impl Manifest {
    /// Parses manifest text, returning `None` for malformed JSON or a
    /// document that is not an object.
    ///
    /// # Example
    ///
    /// ```
    /// use setpm_workspaces::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"{"name":"root","workspaces":["packages/*"]}"#).unwrap();
    /// assert_eq!(manifest.name.as_deref(), Some("root"));
    /// assert_eq!(manifest.workspace_patterns(), ["packages/*"]);
    ///
    /// assert!(Manifest::parse("{ not json").is_none());
    /// assert!(Manifest::parse("[]").is_none());
    /// ```
    #[must_use]
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim_start_matches('\u{feff}');
        let value = match serde_json::from_str::<serde_json::Value>(content) {
            Ok(value @ serde_json::Value::Object(_)) => value,
            Ok(_) => {
                tracing::debug!("Ignoring package.json that is not a JSON object");
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparseable package.json");
                return None;
            }
        };

        serde_json::from_value(value)
            .map_err(|e| tracing::debug!(error = %e, "Ignoring malformed package.json"))
            .ok()
    }

    /// Reads and parses the manifest at `path` through `fs`.
    pub fn load(fs: &impl FileSystem, path: &Path) -> Option<Self> {
        let content = fs.read_to_string(path)?;
        let manifest = Self::parse(&content);
        if manifest.is_none() {
            tracing::debug!(path = %path.display(), "Manifest could not be parsed");
        }
        manifest
    }

    /// Returns the declared workspace globs, empty when there are none.
    #[must_use]
    pub fn workspace_patterns(&self) -> &[String] {
        match &self.workspaces {
            Some(WorkspacesField::Array(patterns) | WorkspacesField::Object { packages: patterns }) => {
                patterns
            }
            Some(WorkspacesField::Other(_)) | None => &[],
        }
    }

    /// Returns true if the manifest declares at least one workspace glob.
    #[must_use]
    pub fn has_workspaces(&self) -> bool {
        !self.workspace_patterns().is_empty()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}
