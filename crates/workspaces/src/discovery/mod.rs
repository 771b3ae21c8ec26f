//! Workspace member discovery from `package.json` workspace globs.
//!
//! npm, Yarn and pnpm (when it reads `package.json`) all declare members the
//! same way: a `workspaces` field holding glob patterns relative to the root
//! manifest. This module turns those patterns into member directories.
//!
//! # Usage
//!
//! ```rust,ignore
//! use setpm_workspaces::discovery::expand_workspace_globs;
//! use setpm_workspaces::Manifest;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let manifest = Manifest::parse(&std::fs::read_to_string("package.json")?).unwrap();
//! for (name, dir) in expand_workspace_globs(root, &manifest)? {
//!     println!("{name} -> {}", dir.display());
//! }
//! ```

use crate::error::{Error, Result};
use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub mod package_json;

pub use package_json::{GlobExpander, WorkspaceExpander, WorkspaceMembership, expand_workspace_globs};

/// Directories that are never descended into while matching patterns.
const PRUNED_DIRS: [&str; 2] = ["node_modules", ".git"];

/// One compiled workspace pattern.
///
/// `*` and `?` never cross a separator, `{a,b}` alternates, and a trailing
/// `/**` also matches the directory it hangs off. Wildcards never match a
/// component starting with `.`; such components have to be spelled out.
#[derive(Debug)]
struct WorkspacePattern {
    set: GlobSet,
    dot_segments: Vec<GlobMatcher>,
}

impl WorkspacePattern {
    fn compile(normalized: &str, raw: &str, manifest: &Path) -> Result<Self> {
        let invalid = |e: globset::Error| Error::InvalidWorkspacePattern {
            pattern: raw.to_string(),
            manifest: manifest.to_path_buf(),
            message: e.to_string(),
        };

        let mut builder = GlobSetBuilder::new();
        builder.add(
            GlobBuilder::new(normalized)
                .literal_separator(true)
                .build()
                .map_err(invalid)?,
        );
        if let Some(base) = normalized.strip_suffix("/**")
            && !base.is_empty()
        {
            builder.add(
                GlobBuilder::new(base)
                    .literal_separator(true)
                    .build()
                    .map_err(invalid)?,
            );
        }
        let set = builder.build().map_err(invalid)?;

        let dot_segments = normalized
            .split('/')
            .filter(|segment| segment.starts_with('.'))
            .map(|segment| {
                GlobBuilder::new(segment)
                    .build()
                    .map(|glob| glob.compile_matcher())
                    .map_err(invalid)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { set, dot_segments })
    }

    fn matches(&self, rel_path: &Path) -> bool {
        self.set.is_match(rel_path)
            && rel_path.components().all(|component| match component {
                Component::Normal(name) => {
                    let name = name.to_string_lossy();
                    !name.starts_with('.')
                        || self.dot_segments.iter().any(|m| m.is_match(name.as_ref()))
                }
                _ => true,
            })
    }
}

/// Resolves glob patterns to find directories, handling exclusions.
///
/// # Arguments
///
/// * `root` - The root directory to resolve patterns from.
/// * `patterns` - List of glob patterns to match (e.g., "packages/*").
///   Patterns starting with "!" are treated as exclusions.
/// * `manifest` - The manifest declaring the patterns, used for error reporting.
///
/// # Returns
///
/// A sorted list of unique, absolute paths (rooted under `root`) that match the
/// patterns and are not excluded.
///
/// # Errors
///
/// Returns [`Error::InvalidWorkspacePattern`] if any glob pattern is invalid.
/// Unreadable directories are skipped.
pub fn resolve_glob_patterns(
    root: &Path,
    patterns: &[String],
    manifest: &Path,
) -> Result<Vec<PathBuf>> {
    let mut inclusion_patterns = Vec::new();
    let mut exclusion_patterns = Vec::new();
    let mut max_depth = Some(0usize);

    for raw in patterns {
        let (negated, body) = match raw.trim().strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw.trim()),
        };
        let normalized = normalize_pattern(body);
        if normalized.is_empty() {
            continue;
        }

        let pattern = WorkspacePattern::compile(&normalized, raw, manifest)?;

        if negated {
            exclusion_patterns.push(pattern);
        } else {
            max_depth = match (max_depth, pattern_depth(&normalized)) {
                (Some(current), Some(depth)) => Some(current.max(depth)),
                _ => None,
            };
            inclusion_patterns.push(pattern);
        }
    }

    if inclusion_patterns.is_empty() {
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(root).follow_links(false).min_depth(1);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut matched_paths = HashSet::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            !PRUNED_DIRS.contains(&name)
        })
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let Ok(rel_path) = path.strip_prefix(root) else {
            continue;
        };

        if exclusion_patterns.iter().any(|p| p.matches(rel_path)) {
            continue;
        }

        if inclusion_patterns.iter().any(|p| p.matches(rel_path)) {
            matched_paths.insert(path.to_path_buf());
        }
    }

    let mut result: Vec<PathBuf> = matched_paths.into_iter().collect();
    result.sort();
    Ok(result)
}

/// Strips the `./` prefix and trailing separators npm tolerates in patterns.
fn normalize_pattern(pattern: &str) -> String {
    let mut trimmed = pattern.trim();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.trim_end_matches('/').to_string()
}

/// Upper bound on the path components a pattern can match, or `None` when
/// `**` makes it unbounded. Braces only ever pick a subset of the separators.
fn pattern_depth(pattern: &str) -> Option<usize> {
    if pattern.contains("**") {
        return None;
    }
    Some(pattern.split('/').filter(|c| !c.is_empty()).count())
}
