//! Package manager version lookups.
//!
//! Pins a package manager request such as `pnpm@^9` or `yarn@latest` to a
//! concrete published version:
//!
//! - [`spec`] parses `name@spec` dependency specifiers
//! - [`range`] evaluates npm-style semver ranges
//! - [`packument`] selects a version from a registry document
//! - [`client`] and [`yarn`] talk to the npm registry and the yarn tag endpoint
//! - [`source`] wraps both behind the [`VersionSource`] trait
//!
//! # Example
//!
//! ```no_run
//! use setpm_registry::{NpmRegistrySource, ResolverConfig, VersionSource};
//!
//! # async fn run() -> setpm_registry::Result<()> {
//! let source = NpmRegistrySource::new(&ResolverConfig::default())?;
//! let version = source.resolve("pnpm", "^9").await?;
//! println!("pnpm@{version}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod packument;
pub mod range;
pub mod source;
pub mod spec;
pub mod yarn;

pub use client::RegistryClient;
pub use config::ResolverConfig;
pub use error::{Error, Result};
pub use packument::{Packument, PackumentVersion, pick_version};
pub use range::{NpmRange, is_version_or_range, max_satisfying, parse_version};
pub use source::{NpmRegistrySource, VersionSource, YarnBerrySource};
pub use spec::{Specifier, SpecifierKind, parse_specifier};
pub use yarn::{YarnTags, YarnTagsClient};
