//! Core abstractions shared by root discovery and package manager detection.
//!
//! - **Traits** - [`FileSystem`] is the capability set injected into the
//!   resolvers so they can be exercised without touching the disk
//! - **Types** - [`PackageManager`] identifies the managers `setpm` knows about

pub mod traits;
pub mod types;

pub use traits::{FileSystem, OsFileSystem};
pub use types::PackageManager;
