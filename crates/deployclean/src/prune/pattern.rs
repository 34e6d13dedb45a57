//! Whitelist patterns and the wanted set of a single prune call.
//!
//! Patterns are absolute paths with filename-style wildcards: `*`, `?` and `[...]` never match a
//! path separator and there is no recursive `**` operator.

use std::{
    cmp::Ordering,
    fmt,
    path::{Component, Path},
};

use glob::{MatchOptions, Pattern as GlobPattern};
use thiserror::Error;

const PATH_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

const SEPARATOR: char = '/';

/// Input that turns a prune call into a no-op
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    #[error("Directory argument is blank")]
    BlankDirectory,

    #[error("Pattern is blank")]
    BlankPattern,

    #[error("Pattern '{0}' is not an absolute path")]
    RelativePattern(String),

    #[error("Pattern '{0}' contains a parent directory component")]
    ParentComponent(String),

    #[error("Pattern '{pattern}' is not a valid glob: {reason}")]
    MalformedGlob { pattern: String, reason: String },
}

/// A single whitelist entry
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    glob: GlobPattern,
    segments: Vec<GlobPattern>,
}

impl Pattern {
    /// Normalizes and compiles `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] for blank, relative or unparsable patterns and for patterns
    /// containing `..`.
    pub fn new(raw: &str) -> Result<Self, InvalidInputError> {
        let raw = normalize(raw);
        if raw.is_empty() {
            return Err(InvalidInputError::BlankPattern);
        }
        if !Path::new(&raw).is_absolute() {
            return Err(InvalidInputError::RelativePattern(raw));
        }

        let compile = |source: &str| {
            GlobPattern::new(source).map_err(|e| InvalidInputError::MalformedGlob {
                pattern: raw.clone(),
                reason: e.msg.to_string(),
            })
        };

        let mut segments = Vec::new();
        for component in Path::new(&raw).components() {
            match component {
                Component::Normal(segment) => {
                    // `raw` is a `str`, so every component is valid UTF-8.
                    segments.push(compile(&segment.to_string_lossy())?);
                }
                Component::ParentDir => {
                    return Err(InvalidInputError::ParentComponent(raw.clone()));
                }
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            }
        }
        let glob = compile(&raw)?;

        Ok(Self {
            raw,
            glob,
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern names `path` itself.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.glob.matches_path_with(path, PATH_MATCH)
    }

    /// Whether the pattern may name something strictly inside `dir`.
    ///
    /// True when the pattern text starts with `dir` plus a separator, or when the leading
    /// segments of the pattern glob-match every segment of `dir` and segments remain.
    #[must_use]
    pub fn descends_into(&self, dir: &Path) -> bool {
        let Some(dir_str) = dir.to_str() else {
            return false;
        };

        let literal = self
            .raw
            .strip_prefix(dir_str.trim_end_matches(SEPARATOR))
            .is_some_and(|rest| rest.starts_with(SEPARATOR) && rest.len() > 1);
        if literal {
            return true;
        }

        let dir_segments: Vec<_> = dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(segment) => Some(segment),
                _ => None,
            })
            .collect();
        if dir_segments.len() >= self.segments.len() {
            return false;
        }

        dir_segments
            .iter()
            .zip(&self.segments)
            .all(|(segment, glob)| {
                segment
                    .to_str()
                    .is_some_and(|s| glob.matches_with(s, PATH_MATCH))
            })
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Pattern {}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Collapses repeated separators, drops `.` segments and trailing separators (except for the root
/// itself).
fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    let joined = raw
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if raw.starts_with(SEPARATOR) {
        format!("{SEPARATOR}{joined}")
    } else {
        joined
    }
}

/// The sorted, de-duplicated whitelist of one prune call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WantedSet {
    patterns: Vec<Pattern>,
}

impl WantedSet {
    /// Parses every raw pattern.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed pattern.
    pub fn parse<I, S>(raw: I) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = raw
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_patterns(patterns))
    }

    fn from_patterns(mut patterns: Vec<Pattern>) -> Self {
        patterns.sort();
        patterns.dedup();
        Self { patterns }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// First pattern (in sorted order) naming `path` itself.
    #[must_use]
    pub fn matching(&self, path: &Path) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.matches(path))
    }

    /// Moves every pattern written under `from` onto `to`, at a segment boundary.
    ///
    /// Lets a caller name the pruned directory through a symlink while the walk sees canonical
    /// paths. `to` is matched literally.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] if a moved pattern no longer compiles.
    pub fn rebase(&self, from: &Path, to: &Path) -> Result<Self, InvalidInputError> {
        let (Some(from), Some(to)) = (from.to_str(), to.to_str()) else {
            return Ok(self.clone());
        };
        let from = normalize(from);
        if from == to || from == SEPARATOR.to_string() {
            return Ok(self.clone());
        }
        let to = GlobPattern::escape(to);

        let patterns = self
            .patterns
            .iter()
            .map(|pattern| match pattern.raw.strip_prefix(from.as_str()) {
                Some(rest) if rest.is_empty() || rest.starts_with(SEPARATOR) => {
                    Pattern::new(&format!("{to}{rest}"))
                }
                _ => Ok(pattern.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_patterns(patterns))
    }

    /// The patterns that may name something inside `dir`.
    #[must_use]
    pub fn within(&self, dir: &Path) -> Self {
        Self {
            patterns: self
                .patterns
                .iter()
                .filter(|p| p.descends_into(dir))
                .cloned()
                .collect(),
        }
    }
}
