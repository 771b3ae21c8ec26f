//! Root `package.json` discovery and package manager detection for
//! JavaScript monorepos.
//!
//! This crate answers two questions about a directory inside a JavaScript
//! project:
//!
//! - Which `package.json` governs it? Nested packages inside a workspace
//!   resolve to the workspace root, not to their own manifest.
//! - Which package manager produced the lockfiles next to that manifest?
//!
//! # Root discovery
//!
//! [`find_root_manifest`] walks up from a starting directory. The first
//! directory containing `package.json` or `node_modules` becomes the
//! candidate; any ancestor whose `workspaces` globs include the candidate is
//! the root. The walk itself lives in [`root::RootSearch`] and takes its
//! filesystem ([`FileSystem`]) and workspace expansion
//! ([`discovery::WorkspaceExpander`]) as injected capabilities.
//!
//! ```no_run
//! use setpm_workspaces::find_root_manifest;
//! use std::path::Path;
//!
//! if let Some(manifest) = find_root_manifest(Path::new("."))? {
//!     println!("{}", manifest.display());
//! }
//! # Ok::<(), setpm_workspaces::Error>(())
//! ```
//!
//! # Package manager detection
//!
//! ```no_run
//! use setpm_workspaces::{OsFileSystem, detect_package_manager};
//! use std::path::Path;
//!
//! let detection = detect_package_manager(&OsFileSystem, Path::new("."));
//! println!("{}", detection.manager);
//! ```
//!
//! ## Feature flags
//!
//! - `discovery-package-json` - workspace glob expansion and root discovery (**enabled by default**)
//! - `detection` - lockfile-based package manager detection (**enabled by default**)
//!
//! ## Edge cases
//!
//! - **Malformed manifests** above the candidate are skipped, never fatal.
//! - **Workspace members without `package.json`** are not members.
//! - **Unreadable directories** are treated as empty.

// Transitive dependencies bring in multiple versions of some crates
#![allow(clippy::multiple_crate_versions)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod core;
pub mod error;
pub mod manifest;

#[cfg(feature = "detection")]
pub mod detection;

#[cfg(feature = "discovery-package-json")]
pub mod discovery;

#[cfg(feature = "discovery-package-json")]
pub mod root;

// Re-export core types
pub use core::{FileSystem, OsFileSystem, PackageManager};

// Re-export error types
pub use error::{Error, Result};

pub use manifest::{INSTALL_DIR, MANIFEST_FILE, Manifest, WorkspacesField};

// Re-export detection functions
#[cfg(feature = "detection")]
pub use detection::{Detection, DetectionWarning, detect_package_manager};

#[cfg(feature = "discovery-package-json")]
pub use discovery::{GlobExpander, WorkspaceExpander, WorkspaceMembership, expand_workspace_globs};

#[cfg(feature = "discovery-package-json")]
pub use root::{RootSearch, Step, find_root_manifest, resolve_root_with};
