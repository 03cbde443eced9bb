//! EditorConfig glob patterns.
//!
//! A pattern is translated into a [`Regex`]. Numeric ranges (`{1..10}`) become
//! capture groups whose values are checked against their bounds after the
//! regex itself matched.

use regex::Regex;
use thiserror::Error;

/// Section names longer than this are ignored.
pub const MAX_PATTERN_LENGTH: usize = 4096;

/// Brace groups nested deeper than this are rejected.
pub const MAX_BRACE_DEPTH: usize = 64;

/// Reasons a glob pattern fails to compile.
#[derive(Debug, Error)]
pub enum GlobError {
    #[error("pattern is longer than {MAX_PATTERN_LENGTH} characters")]
    TooLong,
    #[error("unterminated character class at offset {0}")]
    UnterminatedClass(usize),
    #[error("unbalanced brace at offset {0}")]
    UnbalancedBrace(usize),
    #[error("brace group at offset {0} is nested more than {MAX_BRACE_DEPTH} levels deep")]
    TooDeep(usize),
    #[error("numeric range bound `{0}` does not fit in 64 bits")]
    RangeBound(String),
    #[error("translated pattern is not a valid regex: {0}")]
    Regex(#[from] regex::Error),
}

/// A compiled EditorConfig glob.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
    ranges: Vec<(i64, i64)>,
    basename_only: bool,
}

impl Glob {
    /// Compile `pattern`.
    ///
    /// Patterns without a `/` are matched against the basename of a path.
    /// Patterns containing a `/` are matched against the whole relative path,
    /// with a single leading `/` anchoring them to the config directory.
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(GlobError::TooLong);
        }

        let basename_only = !pattern.contains('/');
        let body = pattern.strip_prefix('/').unwrap_or(pattern);
        let chars: Vec<char> = body.chars().collect();

        let mut translator = Translator::default();
        translator.translate(&chars, 0)?;
        let regex = Regex::new(&format!(r"(?s)\A(?:{})\z", translator.out))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            ranges: translator.ranges,
            basename_only,
        })
    }

    /// The pattern as written in the section header.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Test a `/`-separated path, relative to the config file's directory.
    pub fn is_match(&self, path: &str) -> bool {
        let candidate = if self.basename_only {
            path.rsplit('/').next().unwrap_or(path)
        } else {
            path
        };

        let Some(captures) = self.regex.captures(candidate) else {
            return false;
        };

        self.ranges
            .iter()
            .enumerate()
            .all(|(idx, &(low, high))| match captures.get(idx + 1) {
                // Group sits in an alternative that did not participate.
                None => true,
                Some(m) => in_range(m.as_str(), low, high),
            })
    }
}

/// Compile `pattern` and test it against `path` in one go.
///
/// Malformed patterns match nothing.
pub fn matches(pattern: &str, path: &str) -> bool {
    Glob::new(pattern).is_ok_and(|glob| glob.is_match(path))
}

fn in_range(text: &str, low: i64, high: i64) -> bool {
    // Only the canonical spelling counts: "01", "+1" and "-0" are rejected.
    text.parse::<i64>()
        .is_ok_and(|n| n.to_string() == text && (low..=high).contains(&n))
}

#[derive(Default)]
struct Translator {
    out: String,
    ranges: Vec<(i64, i64)>,
    /// Brace groups currently being translated
    depth: usize,
}

impl Translator {
    /// Translate `chars`, which start at `offset` within the whole pattern.
    fn translate(&mut self, chars: &[char], offset: usize) -> Result<(), GlobError> {
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '\\' => match chars.get(i + 1) {
                    Some(&next) => {
                        push_literal(&mut self.out, next);
                        i += 2;
                    }
                    None => {
                        push_literal(&mut self.out, '\\');
                        i += 1;
                    }
                },
                '*' if chars.get(i + 1) == Some(&'*') => {
                    let at_start = offset == 0 && i == 0;
                    i += 2;
                    while chars.get(i) == Some(&'*') {
                        i += 1;
                    }
                    if at_start && chars.get(i) == Some(&'/') {
                        // leading "**/" also matches files directly in the config dir
                        self.out.push_str("(?:.*/)?");
                        i += 1;
                    } else {
                        self.out.push_str(".*");
                    }
                }
                '*' => {
                    self.out.push_str("[^/]*");
                    i += 1;
                }
                '?' => {
                    self.out.push_str("[^/]");
                    i += 1;
                }
                '/' if chars[i + 1..].starts_with(&['*', '*', '/']) => {
                    // "a/**/b" also matches "a/b"
                    self.out.push_str("(?:/|/.*/)");
                    i += 4;
                }
                '[' => i = self.class(chars, i, offset)?,
                '{' => i = self.braces(chars, i, offset)?,
                '}' => return Err(GlobError::UnbalancedBrace(offset + i)),
                c => {
                    push_literal(&mut self.out, c);
                    i += 1;
                }
            }
        }
        Ok(())
    }

    /// Translate the class opening at `start`, returning the index after it.
    fn class(&mut self, chars: &[char], start: usize, offset: usize) -> Result<usize, GlobError> {
        let mut body_start = start + 1;
        let negated = matches!(chars.get(body_start), Some('!' | '^'));
        if negated {
            body_start += 1;
        }

        let mut end = None;
        let mut has_slash = false;
        let mut j = body_start;
        while j < chars.len() {
            match chars[j] {
                '\\' => j += 2,
                ']' if j > body_start => {
                    end = Some(j);
                    break;
                }
                c => {
                    has_slash |= c == '/';
                    j += 1;
                }
            }
        }
        let end = end.ok_or(GlobError::UnterminatedClass(offset + start))?;

        if has_slash {
            // A class can never match a separator, so the brackets are literal.
            for &c in &chars[start..=end] {
                push_literal(&mut self.out, c);
            }
            return Ok(end + 1);
        }

        self.out.push('[');
        if negated {
            self.out.push_str("^/");
        }

        let mut k = body_start;
        while k < end {
            let (low, next) = class_char(chars, k, end);
            k = next;
            push_class_char(&mut self.out, low);
            if k + 1 < end && chars[k] == '-' {
                let (high, next) = class_char(chars, k + 1, end);
                k = next;
                self.out.push('-');
                push_class_char(&mut self.out, high);
            }
        }

        self.out.push(']');
        Ok(end + 1)
    }

    /// Translate the brace group opening at `start`, returning the index after it.
    fn braces(&mut self, chars: &[char], start: usize, offset: usize) -> Result<usize, GlobError> {
        let mut depth = 0usize;
        let mut commas = Vec::new();
        let mut end = None;
        let mut j = start + 1;
        while j < chars.len() {
            match chars[j] {
                '\\' => j += 1,
                '{' => depth += 1,
                '}' if depth == 0 => {
                    end = Some(j);
                    break;
                }
                '}' => depth -= 1,
                ',' if depth == 0 => commas.push(j),
                _ => {}
            }
            j += 1;
        }
        let end = end.ok_or(GlobError::UnbalancedBrace(offset + start))?;

        if self.depth == MAX_BRACE_DEPTH {
            return Err(GlobError::TooDeep(offset + start));
        }
        self.depth += 1;
        let translated = self.brace_body(chars, start, end, &commas, offset);
        self.depth -= 1;
        translated?;

        Ok(end + 1)
    }

    fn brace_body(
        &mut self,
        chars: &[char],
        start: usize,
        end: usize,
        commas: &[usize],
        offset: usize,
    ) -> Result<(), GlobError> {
        let inner = &chars[start + 1..end];

        if !commas.is_empty() {
            self.out.push_str("(?:");
            let mut from = start + 1;
            for (n, &stop) in commas.iter().chain(std::iter::once(&end)).enumerate() {
                if n > 0 {
                    self.out.push('|');
                }
                self.translate(&chars[from..stop], offset + from)?;
                from = stop + 1;
            }
            self.out.push(')');
        } else if let Some((low, high)) = parse_range(inner)? {
            self.out.push_str(r"(-?[0-9]+)");
            self.ranges.push((low.min(high), low.max(high)));
        } else {
            self.out.push_str(r"\{");
            self.translate(inner, offset + start + 1)?;
            self.out.push_str(r"\}");
        }

        Ok(())
    }
}

/// Read one possibly-escaped class member at `k`, returning it and the next index.
fn class_char(chars: &[char], k: usize, end: usize) -> (char, usize) {
    if chars[k] == '\\' && k + 1 < end {
        (chars[k + 1], k + 2)
    } else {
        (chars[k], k + 1)
    }
}

/// Parse `n1..n2`. Returns `None` if `inner` does not have that shape.
fn parse_range(inner: &[char]) -> Result<Option<(i64, i64)>, GlobError> {
    let text: String = inner.iter().collect();
    let Some((low, high)) = text.split_once("..") else {
        return Ok(None);
    };
    if !is_integer(low) || !is_integer(high) {
        return Ok(None);
    }

    let bound = |s: &str| {
        s.parse::<i64>()
            .map_err(|_| GlobError::RangeBound(s.to_string()))
    };
    Ok(Some((bound(low)?, bound(high)?)))
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn push_class_char(out: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
        out.push('\\');
    }
    out.push(c);
}
