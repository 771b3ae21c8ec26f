//! Expansion of `package.json` workspace globs into named member directories.

use crate::discovery::resolve_glob_patterns;
use crate::error::{Error, Result};
use crate::manifest::{MANIFEST_FILE, Manifest};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Maps a manifest's workspace globs to member directories.
///
/// This is the seam the root resolver uses to ask "which directories does this
/// ancestor's manifest claim as members?" so membership checks can be tested
/// without a real directory tree.
pub trait WorkspaceExpander {
    /// Returns member package names mapped to their directories.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the manifest's workspace
    /// declaration cannot be resolved.
    fn expand(&self, dir: &Path, manifest: &Manifest) -> Result<WorkspaceMembership>;
}

/// [`WorkspaceExpander`] that walks the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobExpander;

impl WorkspaceExpander for GlobExpander {
    fn expand(&self, dir: &Path, manifest: &Manifest) -> Result<WorkspaceMembership> {
        expand_workspace_globs(dir, manifest).map(WorkspaceMembership::new)
    }
}

/// Resolved workspace members of one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceMembership {
    members: BTreeMap<String, PathBuf>,
}

impl WorkspaceMembership {
    /// Wraps a name-to-directory mapping.
    #[must_use]
    pub fn new(members: BTreeMap<String, PathBuf>) -> Self {
        Self { members }
    }

    /// Returns true if `dir` is one of the member directories.
    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        self.members.values().any(|member| member == dir)
    }
}

/// Resolves `manifest`'s workspace globs relative to `dir`.
///
/// A matched directory only counts as a member if it holds a `package.json`.
/// The member's name comes from that manifest, falling back to the directory
/// name when the manifest is unnamed or unparseable.
///
/// # Errors
///
/// Returns [`Error::InvalidWorkspacePattern`] for a glob that does not
/// compile and [`Error::DuplicateWorkspace`] when two members share a name.
pub fn expand_workspace_globs(dir: &Path, manifest: &Manifest) -> Result<BTreeMap<String, PathBuf>> {
    let patterns = manifest.workspace_patterns();
    if patterns.is_empty() {
        return Ok(BTreeMap::new());
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    let matched_paths = resolve_glob_patterns(dir, patterns, &manifest_path)?;

    let mut members: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in matched_paths {
        let member_manifest = path.join(MANIFEST_FILE);
        let Ok(content) = fs::read_to_string(&member_manifest) else {
            continue;
        };

        let name = Manifest::parse(&content)
            .and_then(|m| m.name)
            .or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            });
        let Some(name) = name else {
            continue;
        };

        if let Some(first) = members.get(&name) {
            return Err(Error::DuplicateWorkspace {
                name,
                first: first.clone(),
                second: path,
            });
        }

        tracing::trace!(member = %name, path = %path.display(), "Resolved workspace member");
        members.insert(name, path);
    }

    tracing::debug!(
        root = %dir.display(),
        members = members.len(),
        "Expanded workspace globs"
    );

    Ok(members)
}
