//! `setpm`: resolve a package manager and record it in the root manifest.

use crate::errors::{Error, Result};
use crate::manifest::PackageJson;
use crate::resolver::{ManagerResolver, ResolvedManager};
use std::path::PathBuf;
use tracing::instrument;

/// Inputs to [`execute_set`].
#[derive(Debug, Clone)]
pub struct SetOptions {
    /// The user's argument, if any.
    pub specifier: Option<String>,
    /// Directory the root search starts from.
    pub start: PathBuf,
    /// Resolve only; leave package.json untouched.
    pub dry_run: bool,
}

/// What [`execute_set`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOutcome {
    /// The root manifest that was (or would have been) updated.
    pub manifest: PathBuf,
    /// The pinned manager.
    pub resolved: ResolvedManager,
    /// The `packageManager` value before the update.
    pub previous: Option<String>,
    /// Whether package.json was written.
    pub written: bool,
}

/// Finds the root manifest, resolves the manager and records it.
///
/// The manifest is loaded before any network access, so a malformed
/// package.json fails fast.
///
/// # Errors
///
/// Returns [`Error::ManifestNotFound`] when there is no project above
/// `start`, a manifest error if package.json cannot be read or written,
/// and any resolution error from [`ManagerResolver::resolve`].
#[instrument(skip_all, fields(start = %options.start.display(), dry_run = options.dry_run))]
pub async fn execute_set(options: &SetOptions, resolver: &ManagerResolver) -> Result<SetOutcome> {
    let manifest_path = setpm_workspaces::find_root_manifest(&options.start)?.ok_or_else(|| {
        Error::ManifestNotFound {
            start: options.start.clone(),
        }
    })?;
    let root_dir = manifest_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();

    let mut manifest = PackageJson::load_or_create(&root_dir)?;
    let previous = manifest.package_manager().map(str::to_string);
    tracing::debug!(
        manifest = %manifest.path().display(),
        previous = previous.as_deref().unwrap_or("<none>"),
        "Loaded root manifest"
    );

    let resolved = resolver
        .resolve(&root_dir, options.specifier.as_deref(), previous.as_deref())
        .await?;

    if !options.dry_run {
        manifest.set_package_manager(resolved.to_string());
        manifest.save()?;
        tracing::info!(manifest = %manifest.path().display(), value = %resolved, "Updated packageManager");
    }

    Ok(SetOutcome {
        manifest: manifest.path().to_path_buf(),
        resolved,
        previous,
        written: !options.dry_run,
    })
}
