//! Package manager detection from lockfiles.
//!
//! Looks at the lockfiles sitting next to a root manifest and infers which
//! package manager produced them. Only the manifest directory is examined.
//!
//! # Examples
//!
//! ```no_run
//! use setpm_workspaces::detection::detect_package_manager;
//! use setpm_workspaces::OsFileSystem;
//! use std::path::Path;
//!
//! let detection = detect_package_manager(&OsFileSystem, Path::new("/path/to/repo"));
//! println!("Detected: {}", detection.manager);
//! ```

use crate::core::{FileSystem, PackageManager};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

/// Leading comment block written by Yarn 1.x lockfiles.
#[allow(clippy::expect_used)]
static LEGACY_YARN_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(#.*(\r?\n))*?#\s+yarn\s+lockfile\s+v1\r?\n")
        .expect("legacy yarn lockfile header regex")
});

/// Top-level key every Yarn 2+ lockfile carries.
const BERRY_METADATA_KEY: &str = "__metadata";

/// Result of sniffing a directory's lockfiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// The inferred package manager.
    pub manager: PackageManager,
    /// Set when the inference had to fall back on a guess.
    pub warning: Option<DetectionWarning>,
}

impl Detection {
    fn certain(manager: PackageManager) -> Self {
        Self {
            manager,
            warning: None,
        }
    }
}

/// Non-fatal oddities found while detecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionWarning {
    /// `yarn.lock` is neither a Yarn 1.x lockfile nor a YAML document with
    /// `__metadata`; Yarn 2+ is assumed.
    UnexpectedYarnLockfile,
}

impl fmt::Display for DetectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedYarnLockfile => {
                write!(f, "Unexpected yarn.lock file, proceeding with yarn")
            }
        }
    }
}

/// Infers the package manager from the lockfiles in `dir`.
///
/// Priority order:
///
/// 1. `pnpm-lock.yaml` ⇒ [`PackageManager::Pnpm`]
/// 2. `yarn.lock` with the Yarn 1.x header ⇒ [`PackageManager::YarnClassic`]
/// 3. `yarn.lock` otherwise ⇒ [`PackageManager::Yarn`], with a warning if the
///    file is not YAML with a top-level `__metadata` key
/// 4. nothing ⇒ [`PackageManager::Npm`]
///
/// Only regular files count; a directory named like a lockfile is ignored.
///
/// # Examples
///
/// ```
/// use setpm_workspaces::detection::detect_package_manager;
/// use setpm_workspaces::{OsFileSystem, PackageManager};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("pnpm-lock.yaml"), "lockfileVersion: '9.0'\n").unwrap();
///
/// let detection = detect_package_manager(&OsFileSystem, dir.path());
/// assert_eq!(detection.manager, PackageManager::Pnpm);
/// assert!(detection.warning.is_none());
/// ```
pub fn detect_package_manager(fs: &impl FileSystem, dir: &Path) -> Detection {
    tracing::debug!(dir = %dir.display(), "Detecting package manager from lockfiles");

    if fs.is_file(&dir.join(PackageManager::Pnpm.lockfile_name())) {
        tracing::debug!("Found pnpm lockfile");
        return Detection::certain(PackageManager::Pnpm);
    }

    let yarn_lock = dir.join(PackageManager::Yarn.lockfile_name());
    if fs.is_file(&yarn_lock) {
        let content = fs.read_to_string(&yarn_lock).unwrap_or_default();
        return detect_yarn_flavor(&content);
    }

    tracing::debug!("No lockfile found, defaulting to npm");
    Detection::certain(PackageManager::Npm)
}

/// Tells Yarn 1.x and Yarn 2+ lockfiles apart.
fn detect_yarn_flavor(content: &str) -> Detection {
    if LEGACY_YARN_HEADER.is_match(content) {
        tracing::debug!("yarn.lock has the v1 header");
        return Detection::certain(PackageManager::YarnClassic);
    }

    if has_berry_metadata(content) {
        tracing::debug!("yarn.lock has __metadata");
        return Detection::certain(PackageManager::Yarn);
    }

    tracing::debug!("yarn.lock format not recognized, assuming yarn");
    Detection {
        manager: PackageManager::Yarn,
        warning: Some(DetectionWarning::UnexpectedYarnLockfile),
    }
}

/// Returns true if `content` is a YAML mapping with a non-empty `__metadata` entry.
fn has_berry_metadata(content: &str) -> bool {
    match serde_yaml::from_str::<serde_yaml::Value>(content) {
        Ok(serde_yaml::Value::Mapping(mapping)) => mapping
            .get(BERRY_METADATA_KEY)
            .is_some_and(is_present),
        Ok(_) => false,
        Err(e) => {
            tracing::debug!(error = %e, "yarn.lock is not valid YAML");
            false
        }
    }
}

/// Every scalar counts as text, so `false` and `0` are present markers.
fn is_present(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => false,
        serde_yaml::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OsFileSystem;
    use std::fs;
    use tempfile::TempDir;

    const CLASSIC_LOCKFILE: &str = "# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.\n\
        # yarn lockfile v1\n\
        \n\
        \n\
        left-pad@^1.3.0:\n  version \"1.3.0\"\n";

    const BERRY_LOCKFILE: &str = r#"# This file is generated by running "yarn install" inside your project.
# Manual changes might be lost - proceed with caution!

__metadata:
  version: 8
  cacheKey: 10c0

"left-pad@npm:^1.3.0":
  version: 1.3.0
  resolution: "left-pad@npm:1.3.0"
"#;

    fn detect_in(files: &[(&str, &str)]) -> Detection {
        let temp_dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).unwrap();
        }
        detect_package_manager(&OsFileSystem, temp_dir.path())
    }

    #[test]
    fn test_detect_npm_without_lockfiles() {
        assert_eq!(detect_in(&[]), Detection::certain(PackageManager::Npm));
    }

    #[test]
    fn test_detect_npm_with_package_lock() {
        let detection = detect_in(&[("package-lock.json", "{}")]);
        assert_eq!(detection.manager, PackageManager::Npm);
    }

    #[test]
    fn test_detect_pnpm() {
        let detection = detect_in(&[("pnpm-lock.yaml", "lockfileVersion: '9.0'\n")]);
        assert_eq!(detection, Detection::certain(PackageManager::Pnpm));
    }

    #[test]
    fn test_pnpm_wins_over_yarn() {
        let detection = detect_in(&[
            ("pnpm-lock.yaml", "lockfileVersion: '9.0'\n"),
            ("yarn.lock", CLASSIC_LOCKFILE),
        ]);
        assert_eq!(detection.manager, PackageManager::Pnpm);
    }

    #[test]
    fn test_detect_yarn_classic() {
        let detection = detect_in(&[("yarn.lock", CLASSIC_LOCKFILE)]);
        assert_eq!(detection, Detection::certain(PackageManager::YarnClassic));
    }

    #[test]
    fn test_detect_yarn_classic_header_case_and_crlf() {
        let detection = detect_in(&[("yarn.lock", "# Yarn Lockfile V1\r\n\r\nfoo@1:\r\n")]);
        assert_eq!(detection.manager, PackageManager::YarnClassic);
    }

    #[test]
    fn test_detect_yarn_berry() {
        let detection = detect_in(&[("yarn.lock", BERRY_LOCKFILE)]);
        assert_eq!(detection, Detection::certain(PackageManager::Yarn));
    }

    #[test]
    fn test_unexpected_yarn_lockfile_warns() {
        let detection = detect_in(&[("yarn.lock", "packages:\n  foo: bar\n")]);
        assert_eq!(detection.manager, PackageManager::Yarn);
        assert_eq!(
            detection.warning,
            Some(DetectionWarning::UnexpectedYarnLockfile)
        );
    }

    #[test]
    fn test_scalar_metadata_marks_berry() {
        for marker in ["false", "0", "v8"] {
            let lockfile = format!("__metadata: {marker}\n");
            let detection = detect_in(&[("yarn.lock", lockfile.as_str())]);
            assert_eq!(detection, Detection::certain(PackageManager::Yarn), "{marker}");
        }

        for marker in ["", "''"] {
            let lockfile = format!("__metadata: {marker}\n");
            let detection = detect_in(&[("yarn.lock", lockfile.as_str())]);
            assert!(detection.warning.is_some(), "{marker:?}");
        }
    }

    #[test]
    fn test_unparseable_yarn_lockfile_warns() {
        let detection = detect_in(&[("yarn.lock", "key: [unclosed\n  - : :")]);
        assert_eq!(detection.manager, PackageManager::Yarn);
        assert!(detection.warning.is_some());
    }

    #[test]
    fn test_empty_yarn_lockfile_warns() {
        let detection = detect_in(&[("yarn.lock", "")]);
        assert_eq!(detection.manager, PackageManager::Yarn);
        assert!(detection.warning.is_some());
    }

    #[test]
    fn test_lockfile_directory_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("pnpm-lock.yaml")).unwrap();
        fs::create_dir(temp_dir.path().join("yarn.lock")).unwrap();

        let detection = detect_package_manager(&OsFileSystem, temp_dir.path());

        assert_eq!(detection.manager, PackageManager::Npm);
    }

    #[test]
    fn test_legacy_header_must_be_leading_comments() {
        assert!(LEGACY_YARN_HEADER.is_match("# yarn lockfile v1\n"));
        assert!(LEGACY_YARN_HEADER.is_match("# one\n# two\n#   yarn   lockfile v1\n"));
        assert!(!LEGACY_YARN_HEADER.is_match("foo:\n# yarn lockfile v1\n"));
        assert!(!LEGACY_YARN_HEADER.is_match("# yarn lockfile v1"));
    }

    #[test]
    fn test_warning_message() {
        assert_eq!(
            DetectionWarning::UnexpectedYarnLockfile.to_string(),
            "Unexpected yarn.lock file, proceeding with yarn"
        );
    }
}
