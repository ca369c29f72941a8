//! Path patterns compiled into per-segment specifications.

use std::fmt;

use crate::{Matcher, PatternError, split_scheme};

/// One `/`-separated piece of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Exact name; membership can be checked by joining and stat'ing.
    Literal(String),
    /// Contains `*`, `?` or a class; needs a directory listing.
    Wildcard(Matcher),
}

impl Segment {
    /// Returns true for wildcard segments.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(name) => f.write_str(name),
            Segment::Wildcard(m) => f.write_str(m.as_str()),
        }
    }
}

/// A compiled path pattern.
///
/// Relative patterns are applied below a base directory. A pattern that
/// starts with `/` or `scheme://` is absolute: its [`origin`](Self::origin)
/// names the root to start from and the base is ignored.
///
/// ```
/// use urifs_glob::Pattern;
///
/// let p = Pattern::compile("*/b/c/*/W???d/x/file[1-2].txt").unwrap();
/// assert_eq!(p.segments().len(), 7);
/// assert_eq!(p.wildcard_count(), 4);
/// assert!(!p.is_absolute());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    origin: Option<String>,
    segments: Vec<Segment>,
    dir_only: bool,
}

impl Pattern {
    /// Compile a raw pattern string.
    ///
    /// Fails only on malformed bracket expressions. Everything else
    /// compiles, including patterns that can never match anything.
    pub fn compile(raw: &str) -> Result<Self, PatternError> {
        let (origin, rest) = split_origin(raw);
        let (canonical, trailing_sep) = canonicalize(rest);

        let segments = canonical
            .split('/')
            .filter(|s| !s.is_empty())
            .map(compile_segment)
            .collect::<Result<Vec<_>, _>>()?;

        let dir_only = trailing_sep && !segments.is_empty();

        Ok(Self {
            origin,
            segments,
            dir_only,
        })
    }

    /// The compiled segments, left to right.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Root URI for absolute patterns (`/`, `mem://`, `file:///`).
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn is_absolute(&self) -> bool {
        self.origin.is_some()
    }

    /// True when the raw pattern ended in `/`: only directories match.
    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    /// True for the empty pattern, which denotes the base itself.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of wildcard segments, which is the length of every capture list.
    pub fn wildcard_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_wildcard()).count()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            f.write_str(origin)?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        if self.dir_only {
            f.write_str("/")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

/// Canonicalize the path part of a pattern.
///
/// Repeated separators collapse and `.` segments are dropped. `..` is kept
/// as-is: it is an ordinary literal name to the compiler. Leading
/// separators are stripped. Returns the canonical text and whether the
/// input ended in a separator.
pub fn canonicalize(raw: &str) -> (String, bool) {
    let trailing_sep = raw.ends_with('/');
    let canonical = raw
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/");
    (canonical, trailing_sep)
}

/// Peel an absolute origin off the front of a raw pattern.
fn split_origin(raw: &str) -> (Option<String>, &str) {
    if let Some((scheme, rest)) = split_scheme(raw) {
        if rest.starts_with('/') {
            return (Some(format!("{scheme}:///")), rest.trim_start_matches('/'));
        }
        return (Some(format!("{scheme}://")), rest);
    }
    if raw.starts_with('/') {
        return (Some("/".to_string()), raw.trim_start_matches('/'));
    }
    (None, raw)
}

fn compile_segment(segment: &str) -> Result<Segment, PatternError> {
    let matcher = Matcher::new(segment)?;
    Ok(match matcher.literal() {
        Some(name) => Segment::Literal(name),
        None => Segment::Wildcard(matcher),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(p: &Pattern) -> Vec<String> {
        p.segments().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_pattern() {
        let p = Pattern::compile("").unwrap();
        assert!(p.is_empty());
        assert!(!p.is_dir_only());
        assert!(!p.is_absolute());
        assert_eq!(p.wildcard_count(), 0);
    }

    #[test]
    fn test_literal_and_wildcard_segments() {
        let p = Pattern::compile("a/b/c/*").unwrap();
        assert_eq!(names(&p), vec!["a", "b", "c", "*"]);
        assert_eq!(p.segments()[0], Segment::Literal("a".into()));
        assert!(p.segments()[3].is_wildcard());
        assert_eq!(p.wildcard_count(), 1);
    }

    #[test]
    fn test_canonicalization() {
        let p = Pattern::compile("a//./b///c").unwrap();
        assert_eq!(names(&p), vec!["a", "b", "c"]);
        assert_eq!(p.wildcard_count(), 0);

        // `..` survives as a literal segment.
        let p = Pattern::compile("a/../b").unwrap();
        assert_eq!(names(&p), vec!["a", "..", "b"]);
        assert_eq!(p.segments()[1], Segment::Literal("..".into()));
    }

    #[test]
    fn test_dir_only() {
        let p = Pattern::compile("a/b/c/*/").unwrap();
        assert!(p.is_dir_only());
        assert_eq!(p.segments().len(), 4);
        assert_eq!(p.to_string(), "a/b/c/*/");

        assert!(!Pattern::compile("a/b").unwrap().is_dir_only());
        assert!(!Pattern::compile("./").unwrap().is_dir_only());
    }

    #[test]
    fn test_absolute_origins() {
        let p = Pattern::compile("/tmp/*.log").unwrap();
        assert_eq!(p.origin(), Some("/"));
        assert_eq!(names(&p), vec!["tmp", "*.log"]);

        let p = Pattern::compile("mem://a/*").unwrap();
        assert_eq!(p.origin(), Some("mem://"));
        assert_eq!(names(&p), vec!["a", "*"]);

        let p = Pattern::compile("file:///var/*").unwrap();
        assert_eq!(p.origin(), Some("file:///"));
        assert_eq!(names(&p), vec!["var", "*"]);
        assert_eq!(p.to_string(), "file:///var/*");

        let p = Pattern::compile("mem://").unwrap();
        assert!(p.is_absolute());
        assert!(p.is_empty());
    }

    #[test]
    fn test_escaped_metacharacters_are_literal() {
        let p = Pattern::compile("dir/\\*star\\*").unwrap();
        assert_eq!(p.wildcard_count(), 0);
        assert_eq!(p.segments()[1], Segment::Literal("*star*".into()));
    }

    #[test]
    fn test_capture_count_spans_segments() {
        let p = Pattern::compile("*/b/c/*/W???d/x/file[1-2].txt").unwrap();
        assert_eq!(p.wildcard_count(), 4);
        assert_eq!(p.segments().len(), 7);
    }

    #[test]
    fn test_malformed_pattern_fails_whole() {
        let err = Pattern::compile("a/b/c/[file1.txt").unwrap_err();
        assert!(matches!(err, PatternError::UnterminatedClass { .. }));

        assert!(Pattern::compile("*/[z-a]/x").is_err());
    }

    #[test]
    fn test_from_str() {
        let p: Pattern = "x/*".parse().unwrap();
        assert_eq!(p.wildcard_count(), 1);
    }
}
