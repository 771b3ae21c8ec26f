//! Pin a JavaScript project's package manager.
//!
//! Backs two binaries:
//!
//! - `find-root-package-json` prints the workspace root manifest governing a
//!   directory
//! - `setpm` resolves a package manager request to a published release and
//!   records it as `packageManager` in that manifest
//!
//! Root discovery and lockfile detection live in [`setpm_workspaces`];
//! registry lookups live in [`setpm_registry`]. This crate decides what to
//! ask for ([`resolver`]), edits the manifest ([`manifest`]) and wires both
//! into the command line ([`cli`], [`commands`]).

#![warn(clippy::all, clippy::pedantic)]

pub mod cli;
pub mod commands;
pub mod errors;
pub mod manifest;
pub mod resolver;
pub mod specifier;
pub mod tracing;

pub use errors::{Error, Result};
pub use manifest::PackageJson;
pub use resolver::{ManagerName, ManagerResolver, Plan, ResolvedManager, plan};
pub use specifier::ManagerSpecifier;
