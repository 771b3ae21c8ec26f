//! Filesystem capability used by the resolvers.

use std::fs;
use std::path::Path;

/// The read-only filesystem operations root discovery and lockfile sniffing need.
///
/// Every method folds failures (missing entries, permission errors, invalid
/// UTF-8) into a negative answer. Nothing here is allowed to abort a walk.
///
/// # Example
///
/// ```rust,ignore
/// use setpm_workspaces::{FileSystem, OsFileSystem};
/// use std::path::Path;
///
/// let fs = OsFileSystem;
/// if fs.is_file(Path::new("package.json")) {
///     println!("found a manifest");
/// }
/// ```
pub trait FileSystem {
    /// Returns true if `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Returns true if `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Reads `path` as UTF-8, or `None` if it cannot be read.
    fn read_to_string(&self, path: &Path) -> Option<String>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|m| m.is_file())
    }

    fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|m| m.is_dir())
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "Treating unreadable file as absent");
                None
            }
        }
    }
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        (**self).read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_os_file_system_distinguishes_files_and_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("package.json");
        fs::write(&file, "{}").unwrap();
        fs::create_dir(temp_dir.path().join("node_modules")).unwrap();

        let fs = OsFileSystem;
        assert!(fs.is_file(&file));
        assert!(!fs.is_dir(&file));
        assert!(fs.is_dir(&temp_dir.path().join("node_modules")));
        assert!(!fs.is_file(&temp_dir.path().join("node_modules")));
    }

    #[test]
    fn test_os_file_system_missing_paths_are_negative() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let fs = OsFileSystem;
        assert!(!fs.is_file(&missing));
        assert!(!fs.is_dir(&missing));
        assert_eq!(fs.read_to_string(&missing), None);
    }

    #[test]
    fn test_os_file_system_reads_content() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("yarn.lock");
        fs::write(&file, "# yarn lockfile v1\n").unwrap();

        assert_eq!(
            OsFileSystem.read_to_string(&file).as_deref(),
            Some("# yarn lockfile v1\n")
        );
    }
}
