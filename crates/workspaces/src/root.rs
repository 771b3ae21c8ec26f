//! Root `package.json` discovery for monorepos.
//!
//! Walking up from a starting directory, the first directory holding a
//! `package.json` or a `node_modules` directory becomes the *candidate*. Every
//! manifest above it is then asked whether its workspace globs include the
//! candidate; the first one that does is the monorepo root. When none does,
//! the candidate's own manifest is the answer.
//!
//! The walk is an explicit two-state machine ([`RootSearch`]) driven over the
//! ancestor sequence, with filesystem access and workspace expansion injected,
//! so the re-ascension logic can be exercised without a directory tree.
//!
//! # Example
//!
//! ```no_run
//! use setpm_workspaces::find_root_manifest;
//! use std::path::Path;
//!
//! match find_root_manifest(Path::new("packages/app/src"))? {
//!     Some(manifest) => println!("root manifest: {}", manifest.display()),
//!     None => eprintln!("package.json not found"),
//! }
//! # Ok::<(), setpm_workspaces::Error>(())
//! ```

use crate::core::{FileSystem, OsFileSystem};
use crate::discovery::{GlobExpander, WorkspaceExpander};
use crate::error::{Error, Result};
use crate::manifest::{INSTALL_DIR, MANIFEST_FILE, Manifest};
use std::path::{Component, Path, PathBuf};

/// State of an in-progress root search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RootSearch {
    /// No candidate yet; looking for the nearest project directory.
    #[default]
    Searching,
    /// A candidate is fixed; looking for an ancestor workspace that lists it.
    VerifyingRoot {
        /// The first project directory found while ascending.
        candidate: PathBuf,
    },
}

/// Outcome of feeding one directory to [`RootSearch::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep ascending.
    Continue,
    /// The workspace root's manifest was found.
    Found(PathBuf),
}

impl RootSearch {
    /// Starts a fresh search.
    #[must_use]
    pub fn new() -> Self {
        Self::Searching
    }

    /// Examines one ancestor directory.
    ///
    /// In [`RootSearch::Searching`], a directory with a manifest or an install
    /// directory becomes the candidate and the step ends there. In
    /// [`RootSearch::VerifyingRoot`], a directory whose manifest parses and
    /// whose workspaces include the candidate ends the search.
    pub fn step(
        &mut self,
        fs: &impl FileSystem,
        expander: &impl WorkspaceExpander,
        dir: &Path,
    ) -> Step {
        let manifest_path = dir.join(MANIFEST_FILE);
        let has_manifest = fs.is_file(&manifest_path);

        match self {
            Self::Searching => {
                if has_manifest || fs.is_dir(&dir.join(INSTALL_DIR)) {
                    tracing::trace!(candidate = %dir.display(), "Fixed workspace candidate");
                    *self = Self::VerifyingRoot {
                        candidate: dir.to_path_buf(),
                    };
                }
                Step::Continue
            }
            Self::VerifyingRoot { candidate } => {
                if !has_manifest {
                    return Step::Continue;
                }

                let Some(manifest) = Manifest::load(fs, &manifest_path) else {
                    return Step::Continue;
                };
                if !manifest.has_workspaces() {
                    return Step::Continue;
                }

                match expander.expand(dir, &manifest) {
                    Ok(membership) if membership.contains(candidate) => {
                        tracing::debug!(
                            root = %dir.display(),
                            member = %candidate.display(),
                            "Found workspace root listing candidate"
                        );
                        Step::Found(manifest_path)
                    }
                    Ok(_) => {
                        tracing::trace!(
                            dir = %dir.display(),
                            "Ancestor workspaces do not include candidate"
                        );
                        Step::Continue
                    }
                    Err(e) => {
                        tracing::debug!(
                            dir = %dir.display(),
                            error = %e,
                            "Skipping ancestor with unresolvable workspaces"
                        );
                        Step::Continue
                    }
                }
            }
        }
    }

    /// Ends the search after the ancestors are exhausted, yielding the
    /// candidate's manifest path.
    #[must_use]
    pub fn finish(self) -> Option<PathBuf> {
        match self {
            Self::Searching => None,
            Self::VerifyingRoot { candidate } => Some(candidate.join(MANIFEST_FILE)),
        }
    }
}

/// Runs a root search from `start` with injected capabilities.
///
/// `start` should already be absolute and normalized (see [`normalize_start`]).
pub fn resolve_root_with(
    fs: &impl FileSystem,
    expander: &impl WorkspaceExpander,
    start: &Path,
) -> Option<PathBuf> {
    let mut search = RootSearch::new();

    for dir in ancestors(start) {
        if let Step::Found(manifest) = search.step(fs, expander, dir) {
            return Some(manifest);
        }
    }

    search.finish()
}

/// Yields `start` followed by each parent directory up to the filesystem root.
///
/// ```
/// use setpm_workspaces::root::ancestors;
/// use std::path::Path;
///
/// let dirs: Vec<_> = ancestors(Path::new("/a/b")).collect();
/// assert_eq!(dirs, [Path::new("/a/b"), Path::new("/a"), Path::new("/")]);
/// ```
pub fn ancestors(start: &Path) -> impl Iterator<Item = &Path> {
    start.ancestors()
}

/// Finds the root `package.json` governing `start`.
///
/// Relative paths are resolved against the process working directory.
/// `Ok(None)` means no project directory exists anywhere above `start`.
///
/// # Errors
///
/// Returns [`Error::WorkingDirectory`] if `start` is relative and the working
/// directory cannot be determined.
pub fn find_root_manifest(start: &Path) -> Result<Option<PathBuf>> {
    let start = if start.is_absolute() {
        normalize_start(start, Path::new("/"))
    } else {
        let cwd = std::env::current_dir().map_err(|source| Error::WorkingDirectory { source })?;
        normalize_start(start, &cwd)
    };

    tracing::debug!(start = %start.display(), "Searching for root package.json");
    let found = resolve_root_with(&OsFileSystem, &GlobExpander, &start);

    match &found {
        Some(manifest) => tracing::debug!(manifest = %manifest.display(), "Resolved root manifest"),
        None => tracing::debug!(start = %start.display(), "No package.json found"),
    }

    Ok(found)
}

/// Makes `start` absolute against `cwd` and folds `.` and `..` lexically.
///
/// # Example
///
/// ```
/// use setpm_workspaces::root::normalize_start;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     normalize_start(Path::new("a/./b/../c"), Path::new("/repo")),
///     PathBuf::from("/repo/a/c")
/// );
/// assert_eq!(normalize_start(Path::new("/x/.."), Path::new("/repo")), PathBuf::from("/"));
/// ```
#[must_use]
pub fn normalize_start(start: &Path, cwd: &Path) -> PathBuf {
    let joined = if start.is_absolute() {
        start.to_path_buf()
    } else {
        cwd.join(start)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
