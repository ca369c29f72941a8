//! urifs-glob: segment-wise glob patterns.
//!
//! Provides:
//! - **Matcher**: single-name glob matching (`*`, `?`, `[...]`, `\` escapes)
//! - **Pattern**: a path pattern compiled into literal and wildcard segments
//!
//! Patterns never cross a `/`. There is no `**`; every wildcard matches
//! within exactly one path segment, which is what lets the glob engine
//! expand a pattern one directory level at a time.

mod matcher;
mod pattern;

pub use matcher::Matcher;
pub use pattern::{Pattern, Segment, canonicalize};

use thiserror::Error;

/// Errors from compiling a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `[` with no closing `]`.
    #[error("unterminated character class at offset {offset} in {pattern:?}")]
    UnterminatedClass { pattern: String, offset: usize },

    /// A class range whose upper bound sorts before its lower bound.
    #[error("reversed range '{lo}-{hi}' in {pattern:?}")]
    ReversedRange { pattern: String, lo: char, hi: char },
}

/// Split `scheme://rest` into `(scheme, rest)`.
///
/// The scheme must start with an ASCII letter and contain only letters,
/// digits, `+`, `-` and `.`; anything else is treated as a plain path.
pub fn split_scheme(s: &str) -> Option<(&str, &str)> {
    let idx = s.find("://")?;
    let scheme = &s[..idx];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some((scheme, &s[idx + 3..]))
}
