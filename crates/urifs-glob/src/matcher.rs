//! Single-name glob matching.

use std::fmt;

use crate::PatternError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Char(char),
    /// `*`: any run of characters, possibly empty.
    Star,
    /// `?`: exactly one character.
    Any,
    Class(CharClass),
}

impl Token {
    fn matches_char(&self, c: char) -> bool {
        match self {
            Token::Char(expected) => *expected == c,
            Token::Any => c != '/',
            Token::Class(class) => c != '/' && class.contains(c),
            Token::Star => false,
        }
    }
}

/// A bracket expression: `[abc]`, `[a-z]`, `[!0-9]`, `[^.]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CharClass {
    negated: bool,
    /// Inclusive ranges; single characters are stored as `(c, c)`.
    ranges: Vec<(char, char)>,
}

impl CharClass {
    fn contains(&self, c: char) -> bool {
        let hit = self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
        hit != self.negated
    }
}

/// A compiled glob for a single path segment.
///
/// ```
/// use urifs_glob::Matcher;
///
/// let m = Matcher::new("file[1-2].txt").unwrap();
/// assert!(m.matches("file1.txt"));
/// assert!(!m.matches("file3.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    source: String,
    tokens: Vec<Token>,
}

impl Matcher {
    /// Compile a single-segment glob.
    pub fn new(source: &str) -> Result<Self, PatternError> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    /// The pattern text this matcher was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The unescaped text of a literal pattern, `None` if it has wildcards.
    ///
    /// Escaped metacharacters (`\*`) count as literal.
    pub fn literal(&self) -> Option<String> {
        self.tokens
            .iter()
            .map(|t| match t {
                Token::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Test a name against the pattern. The whole name must match.
    pub fn matches(&self, name: &str) -> bool {
        let text: Vec<char> = name.chars().collect();
        match_tokens(&self.tokens, &text)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, PatternError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                // Runs of stars are equivalent to one.
                if tokens.last() != Some(&Token::Star) {
                    tokens.push(Token::Star);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::Any);
                i += 1;
            }
            '[' => {
                let (class, next) = parse_class(&chars, i, source)?;
                tokens.push(Token::Class(class));
                i = next;
            }
            '\\' if i + 1 < chars.len() => {
                tokens.push(Token::Char(chars[i + 1]));
                i += 2;
            }
            c => {
                tokens.push(Token::Char(c));
                i += 1;
            }
        }
    }

    Ok(tokens)
}

/// Parse a bracket expression starting at `chars[start] == '['`.
///
/// Returns the class and the index just past the closing `]`.
fn parse_class(
    chars: &[char],
    start: usize,
    source: &str,
) -> Result<(CharClass, usize), PatternError> {
    let unterminated = || PatternError::UnterminatedClass {
        pattern: source.to_string(),
        offset: start,
    };

    let mut i = start + 1;
    let mut negated = false;
    if matches!(chars.get(i), Some('!') | Some('^')) {
        negated = true;
        i += 1;
    }

    let mut ranges = Vec::new();
    let mut first = true;

    loop {
        let c = *chars.get(i).ok_or_else(unterminated)?;

        // `]` right after the opening bracket is a member, not the end.
        if c == ']' && !first {
            return Ok((CharClass { negated, ranges }, i + 1));
        }
        first = false;

        let lo = if c == '\\' {
            i += 1;
            *chars.get(i).ok_or_else(unterminated)?
        } else {
            c
        };
        i += 1;

        let is_range = chars.get(i) == Some(&'-') && chars.get(i + 1).is_some_and(|&n| n != ']');
        if !is_range {
            ranges.push((lo, lo));
            continue;
        }

        i += 1;
        let mut hi = chars[i];
        if hi == '\\' {
            i += 1;
            hi = *chars.get(i).ok_or_else(unterminated)?;
        }
        i += 1;

        if hi < lo {
            return Err(PatternError::ReversedRange {
                pattern: source.to_string(),
                lo,
                hi,
            });
        }
        ranges.push((lo, hi));
    }
}

/// Iterative wildcard match, backtracking only to the most recent star.
fn match_tokens(tokens: &[Token], text: &[char]) -> bool {
    let mut p = 0;
    let mut t = 0;
    // (token index after the star, text index the star currently absorbs up to)
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::Star) => {
                star = Some((p + 1, t));
                p += 1;
                continue;
            }
            Some(tok) if tok.matches_char(text[t]) => {
                p += 1;
                t += 1;
                continue;
            }
            _ => {}
        }

        match star {
            Some((after, absorbed)) if text[absorbed] != '/' => {
                p = after;
                t = absorbed + 1;
                star = Some((after, t));
            }
            _ => return false,
        }
    }

    tokens[p..].iter().all(|tok| matches!(tok, Token::Star))
}
