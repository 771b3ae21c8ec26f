//! `find-root-package-json`.

use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Locates the workspace root `package.json` above `start`.
///
/// # Errors
///
/// Returns [`Error::ManifestNotFound`] when no candidate exists, or a
/// workspace error if the working directory cannot be read.
#[instrument(skip_all, fields(start = %start.display()))]
pub fn execute_find_root(start: &Path) -> Result<PathBuf> {
    setpm_workspaces::find_root_manifest(start)?.ok_or_else(|| Error::ManifestNotFound {
        start: start.to_path_buf(),
    })
}
