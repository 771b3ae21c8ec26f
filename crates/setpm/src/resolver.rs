//! Choosing which package manager and version to record.
//!
//! Resolution happens in two phases. [`plan`] decides the manager name and
//! the requested version from the user's argument, the existing
//! `packageManager` field and the lockfiles on disk; it performs no network
//! access. [`ManagerResolver::resolve_plan`] then pins the request to a
//! concrete release with a single call to the matching [`VersionSource`].

use crate::errors::{Error, Result};
use crate::specifier::ManagerSpecifier;
use setpm_registry::{
    NpmRegistrySource, ResolverConfig, VersionSource, YarnBerrySource, parse_specifier,
};
use setpm_workspaces::{DetectionWarning, FileSystem, PackageManager, detect_package_manager};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Version requested when neither the user nor the project names one.
pub const DEFAULT_VERSION: &str = "latest";

/// The manager a plan resolves against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerName {
    /// One of the managers with first-class handling.
    Known(PackageManager),
    /// Any other registry package, looked up on the npm registry as-is.
    Other(String),
}

impl ManagerName {
    /// Maps a published package name to a manager.
    ///
    /// Names are matched exactly. `yarn` means Yarn 2+; Yarn Classic is only
    /// chosen through the `yarnv1` identifier or by lockfile detection.
    #[must_use]
    pub fn from_package_name(name: &str) -> Self {
        match name {
            "npm" => Self::Known(PackageManager::Npm),
            "pnpm" => Self::Known(PackageManager::Pnpm),
            "yarn" => Self::Known(PackageManager::Yarn),
            "yarnv1" => Self::Known(PackageManager::YarnClassic),
            other => Self::Other(other.to_string()),
        }
    }

    /// The name written to `packageManager` and used for registry lookups.
    #[must_use]
    pub fn package_name(&self) -> &str {
        match self {
            Self::Known(manager) => manager.package_name(),
            Self::Other(name) => name,
        }
    }

    /// Whether versions come from the yarn tag endpoint.
    #[must_use]
    pub fn uses_yarn_tags(&self) -> bool {
        matches!(self, Self::Known(PackageManager::Yarn))
    }
}

impl fmt::Display for ManagerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.package_name())
    }
}

/// A manager name and the version, range or tag wanted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Which manager to record.
    pub manager: ManagerName,
    /// Requested version, range or tag.
    pub version: String,
    /// Set when lockfile detection found something worth telling the user.
    pub warning: Option<DetectionWarning>,
}

/// Decides the manager and requested version for the project at `root_dir`.
///
/// The user's specifier wins; otherwise the name recorded in
/// `packageManager` is kept; otherwise the lockfiles in `root_dir` decide.
/// Lockfiles are only inspected when no name is known.
///
/// # Errors
///
/// Returns [`Error::UnsupportedSpecifier`] when the specifier is not a
/// manager, a version or a registry spec.
pub fn plan<F: FileSystem>(
    fs: &F,
    root_dir: &Path,
    user_specifier: Option<&str>,
    recorded_manager: Option<&str>,
) -> Result<Plan> {
    let mut name = None;
    let mut version = DEFAULT_VERSION.to_string();

    match user_specifier.and_then(ManagerSpecifier::classify) {
        Some(ManagerSpecifier::Known(manager)) => name = Some(ManagerName::Known(manager)),
        Some(ManagerSpecifier::VersionOrRange(wanted)) => version = wanted,
        Some(ManagerSpecifier::Registry { name: package, spec }) => {
            name = Some(ManagerName::from_package_name(&package));
            version = spec;
        }
        Some(ManagerSpecifier::Unsupported(specifier)) => {
            return Err(Error::UnsupportedSpecifier { specifier });
        }
        None => {}
    }

    let mut warning = None;
    let manager = match name.or_else(|| recorded_manager.and_then(recorded_name)) {
        Some(manager) => manager,
        None => {
            let detection = detect_package_manager(fs, root_dir);
            warning = detection.warning;
            ManagerName::Known(detection.manager)
        }
    };

    tracing::debug!(manager = %manager, version = %version, "Planned package manager");
    Ok(Plan {
        manager,
        version,
        warning,
    })
}

/// Name portion of an existing `packageManager` value such as `pnpm@9.1.0+sha512.abc`.
fn recorded_name(recorded: &str) -> Option<ManagerName> {
    match parse_specifier(recorded) {
        Ok(spec) => spec.name.map(|name| ManagerName::from_package_name(&name)),
        Err(e) => {
            tracing::debug!(recorded, error = %e, "Ignoring unreadable packageManager field");
            None
        }
    }
}

/// A package manager pinned to a published version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManager {
    /// Package name, e.g. `pnpm`.
    pub name: String,
    /// Concrete version, e.g. `9.1.0`.
    pub version: String,
}

impl fmt::Display for ResolvedManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Pins plans to releases through the npm registry and the yarn tag endpoint.
#[derive(Clone)]
pub struct ManagerResolver {
    npm: Arc<dyn VersionSource>,
    yarn: Arc<dyn VersionSource>,
    interactive: bool,
}

impl fmt::Debug for ManagerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerResolver")
            .field("npm", &self.npm.name())
            .field("yarn", &self.yarn.name())
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl ManagerResolver {
    /// Creates a resolver talking to the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        Ok(Self::with_sources(
            Arc::new(NpmRegistrySource::new(config)?),
            Arc::new(YarnBerrySource::new(config)?),
        ))
    }

    /// Creates a resolver over explicit sources.
    #[must_use]
    pub fn with_sources(npm: Arc<dyn VersionSource>, yarn: Arc<dyn VersionSource>) -> Self {
        Self {
            npm,
            yarn,
            interactive: false,
        }
    }

    /// Surfaces detection warnings at `warn` level instead of `debug`.
    #[must_use]
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Plans and resolves in one step, reading lockfiles from disk.
    ///
    /// # Errors
    ///
    /// See [`plan`] and [`ManagerResolver::resolve_plan`].
    pub async fn resolve(
        &self,
        root_dir: &Path,
        user_specifier: Option<&str>,
        recorded_manager: Option<&str>,
    ) -> Result<ResolvedManager> {
        let plan = plan(
            &setpm_workspaces::OsFileSystem,
            root_dir,
            user_specifier,
            recorded_manager,
        )?;
        self.resolve_plan(&plan).await
    }

    /// Pins `plan` to a concrete version with one lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::YarnTagsUnavailable`] when the yarn endpoint fails
    /// and [`Error::NoMatchingVersion`] when nothing satisfies the request
    /// or the registry cannot be read.
    pub async fn resolve_plan(&self, plan: &Plan) -> Result<ResolvedManager> {
        if let Some(warning) = &plan.warning {
            if self.interactive {
                tracing::warn!("{warning}");
            } else {
                tracing::debug!(%warning, "Detection warning");
            }
        }

        let name = plan.manager.package_name();
        let wanted = plan.version.as_str();

        let version = if plan.manager.uses_yarn_tags() {
            tracing::debug!(source = self.yarn.name(), wanted, "Resolving yarn berry");
            self.yarn
                .resolve(name, wanted)
                .await
                .map_err(|e| match e {
                    setpm_registry::Error::YarnTagsUnavailable { reason } => {
                        Error::YarnTagsUnavailable {
                            reason: Some(reason),
                        }
                    }
                    setpm_registry::Error::NoMatchingVersion { .. } => {
                        Error::no_matching_version(name, wanted, None)
                    }
                    other => Error::Registry(other),
                })?
        } else {
            tracing::debug!(source = self.npm.name(), package = name, wanted, "Resolving from registry");
            self.npm.resolve(name, wanted).await.map_err(|e| {
                let reason = match e {
                    setpm_registry::Error::NoMatchingVersion { .. } => None,
                    other => Some(other.to_string()),
                };
                Error::no_matching_version(name, wanted, reason)
            })?
        };

        let resolved = ResolvedManager {
            name: name.to_string(),
            version,
        };
        tracing::info!(resolved = %resolved, "Resolved package manager");
        Ok(resolved)
    }
}
