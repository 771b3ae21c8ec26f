//! Registry package documents and version selection.

use crate::error::{Error, Result};
use crate::range::{NpmRange, parse_version, precedence};
use semver::{BuildMetadata, Version};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Tag used when no version is requested.
pub const DEFAULT_TAG: &str = "latest";

/// A package document as served by the registry.
///
/// Only the fields needed to pick a version are kept; the abbreviated
/// (`application/vnd.npm.install-v1+json`) document carries all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Packument {
    /// Package name.
    #[serde(default)]
    pub name: String,

    /// Dist-tag to version mapping, e.g. `latest -> 9.1.0`.
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: BTreeMap<String, String>,

    /// Published versions keyed by version string.
    #[serde(default)]
    pub versions: BTreeMap<String, PackumentVersion>,
}

/// One published version in a [`Packument`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackumentVersion {
    /// The version string.
    #[serde(default)]
    pub version: String,

    /// Deprecation notice; any truthy JSON value marks the version deprecated.
    #[serde(default)]
    pub deprecated: Option<serde_json::Value>,
}

impl PackumentVersion {
    /// Returns true if the registry marks this version deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        match &self.deprecated {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(message)) => !message.is_empty(),
            Some(_) => true,
        }
    }
}

impl Packument {
    fn version(&self, version: &str) -> Option<&PackumentVersion> {
        self.versions.get(version)
    }

    fn no_match(&self, wanted: &str) -> Error {
        Error::no_matching_version(self.name.clone(), wanted)
    }
}

/// Picks the version of `packument` that best satisfies `wanted`.
///
/// - empty `wanted` means the `latest` dist-tag;
/// - a dist-tag resolves through `dist-tags` and must name a published version;
/// - an exact version must be published;
/// - a range takes the `latest` dist-tag when it satisfies the range and is
///   not deprecated, and otherwise the highest satisfying version, preferring
///   versions that are not deprecated.
///
/// # Errors
///
/// Returns [`Error::NoMatchingVersion`] when nothing qualifies.
///
/// # Example
///
/// ```
/// use setpm_registry::packument::{Packument, pick_version};
///
/// let packument: Packument = serde_json::from_str(r#"{
///     "name": "pnpm",
///     "dist-tags": { "latest": "9.1.0" },
///     "versions": {
///         "8.15.9": { "version": "8.15.9" },
///         "9.0.0": { "version": "9.0.0" },
///         "9.1.0": { "version": "9.1.0" }
///     }
/// }"#).unwrap();
///
/// assert_eq!(pick_version(&packument, "latest").unwrap(), "9.1.0");
/// assert_eq!(pick_version(&packument, "8").unwrap(), "8.15.9");
/// assert!(pick_version(&packument, "^10").is_err());
/// ```
pub fn pick_version(packument: &Packument, wanted: &str) -> Result<String> {
    let wanted = wanted.trim();
    let wanted = if wanted.is_empty() { DEFAULT_TAG } else { wanted };

    if let Some(tagged) = packument.dist_tags.get(wanted) {
        return match packument.version(tagged) {
            Some(_) => {
                tracing::debug!(tag = wanted, version = %tagged, "Resolved dist-tag");
                Ok(tagged.clone())
            }
            None => {
                tracing::debug!(tag = wanted, version = %tagged, "Dist-tag points at unpublished version");
                Err(packument.no_match(wanted))
            }
        };
    }

    if let Some(mut exact) = parse_version(wanted) {
        // Registries key versions without build metadata.
        exact.build = BuildMetadata::EMPTY;
        let key = exact.to_string();
        return match packument.version(&key) {
            Some(_) => Ok(key),
            None => Err(packument.no_match(wanted)),
        };
    }

    let Some(range) = NpmRange::parse(wanted) else {
        tracing::debug!(wanted, "Neither a dist-tag, a version nor a range");
        return Err(packument.no_match(wanted));
    };

    if let Some(latest) = packument.dist_tags.get(DEFAULT_TAG)
        && let Some(entry) = packument.version(latest)
        && !entry.is_deprecated()
        && (range.is_any() || parse_version(latest).is_some_and(|v| range.satisfies(&v)))
    {
        tracing::debug!(range = %range, version = %latest, "Range satisfied by latest dist-tag");
        return Ok(latest.clone());
    }

    let best = packument
        .versions
        .iter()
        .filter_map(|(key, entry)| {
            let version = parse_version(key)?;
            range
                .satisfies(&version)
                .then_some((key, entry.is_deprecated(), version))
        })
        .max_by(|a, b| compare_candidates((a.1, &a.2), (b.1, &b.2)));

    match best {
        Some((key, deprecated, _)) => {
            tracing::debug!(range = %range, version = %key, deprecated, "Picked highest satisfying version");
            Ok(key.clone())
        }
        None => Err(packument.no_match(wanted)),
    }
}

/// Non-deprecated beats deprecated, then higher precedence wins.
fn compare_candidates(a: (bool, &Version), b: (bool, &Version)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| precedence(a.1, b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn packument(value: serde_json::Value) -> Packument {
        serde_json::from_value(value).unwrap()
    }

    fn pnpm() -> Packument {
        packument(json!({
            "name": "pnpm",
            "dist-tags": { "latest": "9.1.0", "next-9": "9.2.0-rc.0", "ghost": "7.0.0" },
            "versions": {
                "8.15.8": { "version": "8.15.8" },
                "8.15.9": { "version": "8.15.9", "deprecated": "broken publish" },
                "9.0.0": { "version": "9.0.0" },
                "9.1.0": { "version": "9.1.0" },
                "9.2.0-rc.0": { "version": "9.2.0-rc.0" },
                "9.3.0": { "version": "9.3.0", "deprecated": "" },
                "10.0.0-alpha.1": { "version": "10.0.0-alpha.1" }
            }
        }))
    }

    #[test]
    fn test_dist_tags() {
        assert_eq!(pick_version(&pnpm(), "latest").unwrap(), "9.1.0");
        assert_eq!(pick_version(&pnpm(), "next-9").unwrap(), "9.2.0-rc.0");
        assert_eq!(pick_version(&pnpm(), "").unwrap(), "9.1.0");
    }

    #[test]
    fn test_tag_pointing_at_missing_version() {
        assert!(matches!(
            pick_version(&pnpm(), "ghost"),
            Err(Error::NoMatchingVersion { ref name, ref wanted }) if name == "pnpm" && wanted == "ghost"
        ));
    }

    #[test]
    fn test_unknown_tag() {
        assert!(pick_version(&pnpm(), "canary").is_err());
    }

    #[test]
    fn test_exact_version() {
        assert_eq!(pick_version(&pnpm(), "9.0.0").unwrap(), "9.0.0");
        assert_eq!(pick_version(&pnpm(), "v9.0.0").unwrap(), "9.0.0");
        assert_eq!(pick_version(&pnpm(), "8.15.9").unwrap(), "8.15.9");
        assert!(pick_version(&pnpm(), "9.0.1").is_err());
    }

    #[test]
    fn test_exact_version_ignores_build_metadata() {
        assert_eq!(pick_version(&pnpm(), "9.0.0+sha512.abc").unwrap(), "9.0.0");
        assert_eq!(pick_version(&pnpm(), "v9.1.0+build.7").unwrap(), "9.1.0");
        assert!(matches!(
            pick_version(&pnpm(), "9.0.1+sha512.abc"),
            Err(Error::NoMatchingVersion { ref wanted, .. }) if wanted == "9.0.1+sha512.abc"
        ));
    }

    #[test]
    fn test_range_prefers_latest() {
        assert_eq!(pick_version(&pnpm(), "^9").unwrap(), "9.1.0");
        assert_eq!(pick_version(&pnpm(), "*").unwrap(), "9.1.0");
    }

    #[test]
    fn test_range_outside_latest_takes_highest() {
        assert_eq!(pick_version(&pnpm(), ">=9.1.1").unwrap(), "9.3.0");
        assert_eq!(pick_version(&pnpm(), "~9.0").unwrap(), "9.0.0");
    }

    #[test]
    fn test_range_avoids_deprecated() {
        assert_eq!(pick_version(&pnpm(), "8").unwrap(), "8.15.8");
    }

    #[test]
    fn test_range_falls_back_to_deprecated() {
        assert_eq!(pick_version(&pnpm(), "8.15.9 - 8.15.9").unwrap(), "8.15.9");
    }

    #[test]
    fn test_range_skips_prereleases() {
        assert!(pick_version(&pnpm(), "^10").is_err());
        assert_eq!(pick_version(&pnpm(), "^10.0.0-alpha.0").unwrap(), "10.0.0-alpha.1");
    }

    #[test]
    fn test_deprecated_latest_is_skipped() {
        let doc = packument(json!({
            "name": "yarn",
            "dist-tags": { "latest": "1.22.22" },
            "versions": {
                "1.22.21": { "version": "1.22.21" },
                "1.22.22": { "version": "1.22.22", "deprecated": true }
            }
        }));
        assert_eq!(pick_version(&doc, "1").unwrap(), "1.22.21");
        assert_eq!(pick_version(&doc, "latest").unwrap(), "1.22.22");
    }

    #[test]
    fn test_missing_fields_default() {
        let doc = packument(json!({}));
        assert!(doc.versions.is_empty());
        assert!(pick_version(&doc, "latest").is_err());
    }

    #[test]
    fn test_is_deprecated() {
        let with = |value| PackumentVersion {
            version: "1.0.0".to_string(),
            deprecated: value,
        };
        assert!(!with(None).is_deprecated());
        assert!(!with(Some(json!(false))).is_deprecated());
        assert!(!with(Some(json!(""))).is_deprecated());
        assert!(with(Some(json!("use v2"))).is_deprecated());
        assert!(with(Some(json!(true))).is_deprecated());
    }
}
