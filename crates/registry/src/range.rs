//! npm-style semver ranges.
//!
//! Cargo's [`semver::VersionReq`] reads a bare `1.2.3` as `^1.2.3`, while npm
//! reads it as an exact match, and the two disagree on partials and hyphen
//! ranges. Ranges are therefore desugared here the way node-semver does it:
//! each range becomes a union of comparator sets over [`semver::Version`].
//!
//! Supported syntax:
//!
//! | Input | Meaning |
//! |---|---|
//! | `1.2.3`, `=1.2.3`, `v1.2.3` | exactly `1.2.3` |
//! | `1.2`, `1.2.x`, `1` | `>=1.2.0 <1.3.0-0`, `>=1.0.0 <2.0.0-0` |
//! | `*`, `x`, `X`, empty | any release |
//! | `^1.2.3`, `~1.2.3`, `~>1.2` | caret and tilde ranges |
//! | `>=1.2 <3`, `> 1` | comparator sets, spaces after operators allowed |
//! | `1.2.3 - 2.3` | hyphen ranges |
//! | `a \|\| b` | unions |
//!
//! A pre-release version only satisfies a comparator set when one of its
//! comparators names a pre-release of the same `major.minor.patch`.

use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Strictly below the release triple, pre-releases of it included.
    /// Written `<M.m.p-0` by node-semver.
    Below,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn matches(&self, version: &Version) -> bool {
        let ordering = precedence(version, &self.version);
        match self.op {
            Op::Eq => ordering == Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            Op::Below => triple(version) < triple(&self.version),
        }
    }

    /// Whether this comparator lets pre-releases of `version`'s triple through.
    fn admits_prerelease_of(&self, version: &Version) -> bool {
        self.op != Op::Below
            && !self.version.pre.is_empty()
            && triple(&self.version) == triple(version)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::Eq => write!(f, "{}", self.version),
            Op::Gt => write!(f, ">{}", self.version),
            Op::Gte => write!(f, ">={}", self.version),
            Op::Lt => write!(f, "<{}", self.version),
            Op::Lte => write!(f, "<={}", self.version),
            Op::Below => write!(
                f,
                "<{}.{}.{}-0",
                self.version.major, self.version.minor, self.version.patch
            ),
        }
    }
}

/// A parsed npm range: a union of comparator sets.
///
/// # Example
///
/// ```
/// use setpm_registry::range::NpmRange;
/// use semver::Version;
///
/// let range = NpmRange::parse("^8.6 || 9.0.0 - 9.1").unwrap();
/// assert!(range.satisfies(&Version::parse("8.15.9").unwrap()));
/// assert!(range.satisfies(&Version::parse("9.1.4").unwrap()));
/// assert!(!range.satisfies(&Version::parse("9.2.0").unwrap()));
/// assert!(!range.satisfies(&Version::parse("9.0.0-rc.1").unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    sets: Vec<Vec<Comparator>>,
}

impl NpmRange {
    /// Parses node-semver range syntax, returning `None` when it is invalid.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let sets = text
            .split("||")
            .map(parse_comparator_set)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { sets })
    }

    /// Returns true if `version` falls inside any comparator set.
    #[must_use]
    pub fn satisfies(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set_matches(set, version))
    }

    /// Returns true if the range accepts every release.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.sets.iter().any(Vec::is_empty)
    }
}

impl fmt::Display for NpmRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                f.write_str("||")?;
            }
            if set.is_empty() {
                f.write_str("*")?;
            }
            for (j, comparator) in set.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{comparator}")?;
            }
        }
        Ok(())
    }
}

/// Parses an exact version, tolerating surrounding whitespace and a leading
/// `=` or `v`.
///
/// ```
/// use setpm_registry::range::parse_version;
///
/// assert_eq!(parse_version(" v9.1.0 ").unwrap().to_string(), "9.1.0");
/// assert!(parse_version("9.1").is_none());
/// assert!(parse_version("latest").is_none());
/// ```
#[must_use]
pub fn parse_version(text: &str) -> Option<Version> {
    let text = text.trim();
    let text = text.strip_prefix('=').unwrap_or(text).trim_start();
    let text = text.strip_prefix('v').unwrap_or(text);
    Version::parse(text).ok()
}

/// Returns true if `text` is a valid exact version or a valid range.
///
/// ```
/// use setpm_registry::range::is_version_or_range;
///
/// assert!(is_version_or_range("8.15.1"));
/// assert!(is_version_or_range("^9"));
/// assert!(!is_version_or_range("pnpm"));
/// assert!(!is_version_or_range("latest"));
/// ```
#[must_use]
pub fn is_version_or_range(text: &str) -> bool {
    parse_version(text).is_some() || NpmRange::parse(text).is_some()
}

/// Returns the highest entry of `versions` satisfying `range`.
///
/// Entries that are not valid versions are skipped.
pub fn max_satisfying<'a, I>(versions: I, range: &NpmRange) -> Option<Version>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .filter_map(parse_version)
        .filter(|v| range.satisfies(v))
        .max_by(precedence)
}

/// Orders versions by semver precedence, ignoring build metadata.
#[must_use]
pub fn precedence(a: &Version, b: &Version) -> Ordering {
    triple(a)
        .cmp(&triple(b))
        .then_with(|| a.pre.cmp(&b.pre))
}

fn triple(version: &Version) -> (u64, u64, u64) {
    (version.major, version.minor, version.patch)
}

fn set_matches(set: &[Comparator], version: &Version) -> bool {
    if !set.iter().all(|c| c.matches(version)) {
        return false;
    }
    version.pre.is_empty() || set.iter().any(|c| c.admits_prerelease_of(version))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeOp {
    Exact,
    Gt,
    Gte,
    Lt,
    Lte,
    Tilde,
    Caret,
}

const OPERATORS: [(&str, RangeOp); 8] = [
    (">=", RangeOp::Gte),
    ("<=", RangeOp::Lte),
    (">", RangeOp::Gt),
    ("<", RangeOp::Lt),
    ("=", RangeOp::Exact),
    ("~>", RangeOp::Tilde),
    ("~", RangeOp::Tilde),
    ("^", RangeOp::Caret),
];

/// A possibly partial version; `None` components are wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn floor(&self) -> Version {
        let mut version = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        version.pre = self.pre.clone();
        version
    }
}

fn release(major: u64, minor: u64, patch: u64) -> Version {
    Version::new(major, minor, patch)
}

fn parse_comparator_set(text: &str) -> Option<Vec<Comparator>> {
    let tokens = merge_operator_tokens(text.split_whitespace().collect())?;

    if let [from, dash, to] = tokens.as_slice()
        && dash == "-"
    {
        return Some(hyphen(&parse_partial(from)?, &parse_partial(to)?));
    }

    let mut set = Vec::new();
    for token in &tokens {
        let (op, rest) = split_operator(token);
        let partial = parse_partial(rest)?;
        set.extend(desugar(op, &partial));
    }
    Some(set)
}

/// Joins operators separated from their version by whitespace (`>= 1.2`).
fn merge_operator_tokens(tokens: Vec<&str>) -> Option<Vec<String>> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        if OPERATORS.iter().any(|(symbol, _)| *symbol == token) {
            let version = iter.next()?;
            merged.push(format!("{token}{version}"));
        } else {
            merged.push(token.to_string());
        }
    }
    Some(merged)
}

fn split_operator(token: &str) -> (RangeOp, &str) {
    OPERATORS
        .iter()
        .find_map(|(symbol, op)| token.strip_prefix(symbol).map(|rest| (*op, rest)))
        .unwrap_or((RangeOp::Exact, token))
}

fn parse_partial(text: &str) -> Option<Partial> {
    let text = text.strip_prefix('v').unwrap_or(text);
    let text = match text.split_once('+') {
        Some((head, build)) => {
            if build.is_empty() || build.split('.').any(str::is_empty) {
                return None;
            }
            head
        }
        None => text,
    };
    let (core, pre) = match text.split_once('-') {
        Some((_, "")) => return None,
        Some((core, pre)) => (core, Some(Prerelease::new(pre).ok()?)),
        None => (text, None),
    };

    let mut parts = core.split('.');
    let major = parse_component(parts.next()?)?;
    let minor = match parts.next() {
        Some(token) => parse_component(token)?,
        None => None,
    };
    let patch = match parts.next() {
        Some(token) => parse_component(token)?,
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }

    // A wildcard makes every later component a wildcard too.
    let minor = major.and(minor);
    let patch = minor.and(patch);

    let pre = match pre {
        Some(pre) if patch.is_some() => pre,
        Some(_) => return None,
        None => Prerelease::EMPTY,
    };

    Some(Partial {
        major,
        minor,
        patch,
        pre,
    })
}

/// `Some(None)` for a wildcard, `Some(Some(n))` for a number, `None` if invalid.
fn parse_component(text: &str) -> Option<Option<u64>> {
    match text {
        "x" | "X" | "*" => Some(None),
        "0" => Some(Some(0)),
        _ if !text.is_empty()
            && !text.starts_with('0')
            && text.bytes().all(|b| b.is_ascii_digit()) =>
        {
            text.parse().ok().map(Some)
        }
        _ => None,
    }
}

fn desugar(op: RangeOp, p: &Partial) -> Vec<Comparator> {
    match op {
        RangeOp::Exact => exact(p),
        RangeOp::Tilde => tilde(p),
        RangeOp::Caret => caret(p),
        RangeOp::Gt | RangeOp::Gte | RangeOp::Lt | RangeOp::Lte => primitive(op, p),
    }
}

fn nothing() -> Vec<Comparator> {
    vec![Comparator::new(Op::Below, release(0, 0, 0))]
}

fn exact(p: &Partial) -> Vec<Comparator> {
    match (p.major, p.minor, p.patch) {
        (None, _, _) => Vec::new(),
        (Some(major), None, _) => vec![
            Comparator::new(Op::Gte, release(major, 0, 0)),
            Comparator::new(Op::Below, release(major.saturating_add(1), 0, 0)),
        ],
        (Some(major), Some(minor), None) => vec![
            Comparator::new(Op::Gte, release(major, minor, 0)),
            Comparator::new(Op::Below, release(major, minor.saturating_add(1), 0)),
        ],
        (Some(_), Some(_), Some(_)) => vec![Comparator::new(Op::Eq, p.floor())],
    }
}

fn tilde(p: &Partial) -> Vec<Comparator> {
    match (p.major, p.minor) {
        (None, _) => Vec::new(),
        (Some(major), None) => vec![
            Comparator::new(Op::Gte, release(major, 0, 0)),
            Comparator::new(Op::Below, release(major.saturating_add(1), 0, 0)),
        ],
        (Some(major), Some(minor)) => vec![
            Comparator::new(Op::Gte, p.floor()),
            Comparator::new(Op::Below, release(major, minor.saturating_add(1), 0)),
        ],
    }
}

fn caret(p: &Partial) -> Vec<Comparator> {
    let upper = match (p.major, p.minor, p.patch) {
        (None, _, _) => return Vec::new(),
        (Some(major), None, _) => release(major.saturating_add(1), 0, 0),
        (Some(0), Some(0), Some(patch)) => release(0, 0, patch.saturating_add(1)),
        (Some(0), Some(minor), _) => release(0, minor.saturating_add(1), 0),
        (Some(major), Some(_), _) => release(major.saturating_add(1), 0, 0),
    };
    vec![
        Comparator::new(Op::Gte, p.floor()),
        Comparator::new(Op::Below, upper),
    ]
}

fn primitive(op: RangeOp, p: &Partial) -> Vec<Comparator> {
    let Some(major) = p.major else {
        return match op {
            RangeOp::Gt | RangeOp::Lt => nothing(),
            _ => Vec::new(),
        };
    };

    if p.patch.is_some() {
        let op = match op {
            RangeOp::Gt => Op::Gt,
            RangeOp::Gte => Op::Gte,
            RangeOp::Lt => Op::Lt,
            _ => Op::Lte,
        };
        return vec![Comparator::new(op, p.floor())];
    }

    // Partial versions: bump to the next boundary the missing parts imply.
    let next = match p.minor {
        None => release(major.saturating_add(1), 0, 0),
        Some(minor) => release(major, minor.saturating_add(1), 0),
    };
    match op {
        RangeOp::Gt => vec![Comparator::new(Op::Gte, next)],
        RangeOp::Gte => vec![Comparator::new(Op::Gte, p.floor())],
        RangeOp::Lt => vec![Comparator::new(Op::Below, p.floor())],
        _ => vec![Comparator::new(Op::Below, next)],
    }
}

fn hyphen(from: &Partial, to: &Partial) -> Vec<Comparator> {
    let mut set = Vec::with_capacity(2);
    if from.major.is_some() {
        set.push(Comparator::new(Op::Gte, from.floor()));
    }
    match (to.major, to.minor, to.patch) {
        (None, _, _) => {}
        (Some(major), None, _) => {
            set.push(Comparator::new(Op::Below, release(major.saturating_add(1), 0, 0)));
        }
        (Some(major), Some(minor), None) => {
            set.push(Comparator::new(Op::Below, release(major, minor.saturating_add(1), 0)));
        }
        (Some(_), Some(_), Some(_)) => set.push(Comparator::new(Op::Lte, to.floor())),
    }
    set
}
