//! Dependency specifier parsing (`name@spec`).
//!
//! Classifies the strings users type after `npm install`: registry
//! versions, ranges and dist-tags, plus the non-registry forms (aliases, git,
//! tarball URLs, local paths) so callers can reject those explicitly.

use crate::error::{Error, Result};
use crate::range::{NpmRange, parse_version};
use std::fmt;

/// What kind of dependency a specifier points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// An exact published version, `pnpm@9.1.0`.
    Version,
    /// A semver range, `pnpm@^9` (also the implicit `*` of a bare name).
    Range,
    /// A dist-tag, `pnpm@next-9`.
    Tag,
    /// An `npm:` alias to another package.
    Alias,
    /// A git repository or hosted-git shorthand.
    Git,
    /// A tarball URL.
    Remote,
    /// A local tarball.
    File,
    /// A local directory.
    Directory,
}

impl SpecifierKind {
    /// Returns true for the kinds the registry can resolve.
    #[must_use]
    pub fn is_registry(self) -> bool {
        matches!(self, Self::Version | Self::Range | Self::Tag)
    }
}

impl fmt::Display for SpecifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Version => "version",
            Self::Range => "range",
            Self::Tag => "tag",
            Self::Alias => "alias",
            Self::Git => "git",
            Self::Remote => "remote",
            Self::File => "file",
            Self::Directory => "directory",
        };
        f.write_str(kind)
    }
}

/// A parsed dependency specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    /// Package name; absent for bare URLs, paths and git shorthands.
    pub name: Option<String>,
    /// The part after the name, trimmed; `*` when none was given.
    pub fetch_spec: String,
    /// Classification of `fetch_spec`.
    pub kind: SpecifierKind,
}

const HOSTED_GIT_PREFIXES: [&str; 4] = ["github:", "gitlab:", "bitbucket:", "gist:"];
const URL_PREFIXES: [&str; 3] = ["http://", "https://", "file:"];
const TARBALL_SUFFIXES: [&str; 3] = [".tgz", ".tar.gz", ".tar"];

/// Parses `text` as a dependency specifier.
///
/// # Errors
///
/// Returns [`Error::InvalidSpecifier`] for an invalid package name or a
/// dist-tag containing characters that are not URL-safe.
///
/// # Example
///
/// ```
/// use setpm_registry::spec::{SpecifierKind, parse_specifier};
///
/// let spec = parse_specifier("pnpm@^9").unwrap();
/// assert_eq!(spec.name.as_deref(), Some("pnpm"));
/// assert_eq!(spec.fetch_spec, "^9");
/// assert_eq!(spec.kind, SpecifierKind::Range);
///
/// let spec = parse_specifier("@yarnpkg/cli-dist@next").unwrap();
/// assert_eq!(spec.name.as_deref(), Some("@yarnpkg/cli-dist"));
/// assert_eq!(spec.kind, SpecifierKind::Tag);
///
/// assert!(parse_specifier("bad name@1").is_err());
/// ```
pub fn parse_specifier(text: &str) -> Result<Specifier> {
    let arg = text.trim();
    if arg.is_empty() {
        return Err(Error::invalid_specifier(text, "specifier is empty"));
    }

    if is_url_like(arg) || is_scp_git(arg) {
        return Ok(nameless(arg));
    }

    let name_end = if let Some(rest) = arg.strip_prefix('@') {
        rest.find('@').map(|i| i + 1)
    } else {
        arg.find('@')
    };

    let (name, spec) = match name_end {
        Some(end) if end > 0 => (&arg[..end], Some(&arg[end + 1..])),
        _ => {
            if is_path_like(arg) || (validate_name(arg).is_err() && is_git_shorthand(arg)) {
                return Ok(nameless(arg));
            }
            (arg, None)
        }
    };

    validate_name(name).map_err(|reason| Error::invalid_specifier(text, reason))?;

    let spec = spec.map(str::trim).unwrap_or_default();
    let (kind, fetch_spec) = classify_spec(spec)
        .map_err(|reason| Error::invalid_specifier(text, reason))?;

    tracing::trace!(name, spec = %fetch_spec, kind = %kind, "Parsed specifier");

    Ok(Specifier {
        name: Some(name.to_string()),
        fetch_spec,
        kind,
    })
}

fn nameless(arg: &str) -> Specifier {
    Specifier {
        name: None,
        fetch_spec: arg.to_string(),
        kind: classify_location(arg).unwrap_or(SpecifierKind::Git),
    }
}

/// Classifies the text after `name@`.
fn classify_spec(spec: &str) -> std::result::Result<(SpecifierKind, String), String> {
    if spec.is_empty() || spec == "*" {
        return Ok((SpecifierKind::Range, "*".to_string()));
    }
    if spec.starts_with("npm:") {
        return Ok((SpecifierKind::Alias, spec.to_string()));
    }
    if let Some(kind) = classify_location(spec) {
        return Ok((kind, spec.to_string()));
    }
    if is_git_shorthand(spec) {
        return Ok((SpecifierKind::Git, spec.to_string()));
    }
    if parse_version(spec).is_some() {
        return Ok((SpecifierKind::Version, spec.to_string()));
    }
    if NpmRange::parse(spec).is_some() {
        return Ok((SpecifierKind::Range, spec.to_string()));
    }
    if !spec.chars().all(is_uri_component_safe) {
        return Err(format!("tag name '{spec}' must be URL-safe"));
    }
    Ok((SpecifierKind::Tag, spec.to_string()))
}

/// Recognizes URLs, git remotes and filesystem paths.
fn classify_location(spec: &str) -> Option<SpecifierKind> {
    let lower = spec.to_ascii_lowercase();

    if lower.starts_with("git+")
        || lower.starts_with("git:")
        || lower.starts_with("ssh:")
        || HOSTED_GIT_PREFIXES.iter().any(|p| lower.starts_with(p))
        || is_scp_git(spec)
    {
        return Some(SpecifierKind::Git);
    }

    if lower.starts_with("file:") || is_path_like(spec) {
        return Some(if is_tarball(&lower) {
            SpecifierKind::File
        } else {
            SpecifierKind::Directory
        });
    }

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(if is_hosted_git_url(&lower) {
            SpecifierKind::Git
        } else {
            SpecifierKind::Remote
        });
    }

    if is_tarball(&lower) && !lower.contains('@') {
        return Some(SpecifierKind::File);
    }

    None
}

fn is_url_like(arg: &str) -> bool {
    let lower = arg.to_ascii_lowercase();
    URL_PREFIXES.iter().any(|p| lower.starts_with(p))
        || HOSTED_GIT_PREFIXES.iter().any(|p| lower.starts_with(p))
        || lower.starts_with("git+")
        || lower.starts_with("git:")
}

/// `git@github.com:user/repo.git`
fn is_scp_git(arg: &str) -> bool {
    let Some((user, rest)) = arg.split_once('@') else {
        return false;
    };
    let Some((host, path)) = rest.split_once(':') else {
        return false;
    };
    !user.is_empty() && !user.contains('/') && host.contains('.') && !path.is_empty()
}

fn is_path_like(arg: &str) -> bool {
    let bytes = arg.as_bytes();
    arg.starts_with('.')
        || arg.starts_with('/')
        || arg.starts_with('\\')
        || arg.starts_with("~/")
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

fn is_tarball(lower: &str) -> bool {
    TARBALL_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

fn is_hosted_git_url(lower: &str) -> bool {
    lower.ends_with(".git")
        || ["github.com/", "gitlab.com/", "bitbucket.org/"]
            .iter()
            .any(|host| lower.contains(host))
}

/// `user/repo` or `user/repo#ref`.
fn is_git_shorthand(arg: &str) -> bool {
    let path = arg.split_once('#').map_or(arg, |(path, _)| path);
    let Some((user, repo)) = path.split_once('/') else {
        return false;
    };
    !user.is_empty()
        && !repo.is_empty()
        && !user.starts_with('@')
        && !repo.contains('/')
        && !path.contains(':')
        && user.chars().chain(repo.chars()).all(is_uri_component_safe)
}

/// Characters `encodeURIComponent` leaves untouched.
fn is_uri_component_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
}

/// Validates a package name as npm accepts it for existing packages.
fn validate_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name.trim() != name {
        return Err("name cannot contain leading or trailing spaces".to_string());
    }
    if name.starts_with('.') || name.starts_with('_') {
        return Err("name cannot start with a period or underscore".to_string());
    }
    if matches!(name.to_ascii_lowercase().as_str(), "node_modules" | "favicon.ico") {
        return Err(format!("'{name}' is not a valid package name"));
    }

    let safe = |part: &str| !part.is_empty() && part.chars().all(is_uri_component_safe);
    let valid = match name.strip_prefix('@') {
        Some(scoped) => scoped
            .split_once('/')
            .is_some_and(|(scope, pkg)| safe(scope) && safe(pkg) && !pkg.starts_with('.')),
        None => safe(name),
    };
    if valid {
        Ok(())
    } else {
        Err(format!("name '{name}' can only contain URL-friendly characters"))
    }
}
