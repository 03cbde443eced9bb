//! `.editorconfig` file parsing.
//!
//! The format is line oriented: comments, `[glob]` section headers and
//! `key = value` assignments. Parsing never fails; lines that cannot be used
//! are recorded in [`ConfigFile::skipped`] and otherwise ignored.

use std::fmt;

use tracing::trace;

use crate::glob::MAX_PATTERN_LENGTH;
use crate::properties::PropertyMap;

/// Keys longer than this are ignored.
pub const MAX_KEY_LENGTH: usize = 50;

/// Values longer than this are ignored.
pub const MAX_VALUE_LENGTH: usize = 255;

const BOM: char = '\u{feff}';

/// A glob section and the properties it sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Glob pattern as written between the brackets
    pub glob: String,
    pub properties: PropertyMap,
    /// 1-based line number of the section header
    pub line: usize,
}

/// One parsed `.editorconfig` file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// `root = true` appeared before the first section
    pub root: bool,
    pub sections: Vec<Section>,
    pub skipped: Vec<SkippedLine>,
}

/// A line the parser could not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Starts with `[` but is not a well-formed `[glob]` header
    MalformedHeader,
    /// Section name exceeds the maximum glob length
    HeaderTooLong,
    /// Neither comment, header, nor `key = value`
    NotAnAssignment,
    EmptyKey,
    KeyTooLong,
    ValueTooLong,
    /// Assignment inside a section whose header was rejected
    InRejectedSection,
    /// Assignment before the first section other than `root`
    UnknownPreambleKey,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MalformedHeader => "malformed section header",
            SkipReason::HeaderTooLong => "section name too long",
            SkipReason::NotAnAssignment => "not a key = value line",
            SkipReason::EmptyKey => "empty key",
            SkipReason::KeyTooLong => "key too long",
            SkipReason::ValueTooLong => "value too long",
            SkipReason::InRejectedSection => "belongs to a rejected section",
            SkipReason::UnknownPreambleKey => "only `root` is allowed before the first section",
        };
        f.write_str(text)
    }
}

/// Where assignments currently go.
enum State {
    Preamble,
    Section,
    /// After a rejected header, until the next good one
    Rejected,
}

enum Line<'a> {
    Blank,
    Header(&'a str),
    Assignment(&'a str, &'a str),
    Skip(SkipReason),
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();

    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
        return Line::Blank;
    }

    if line.starts_with('[') {
        let Some(glob) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) else {
            return Line::Skip(SkipReason::MalformedHeader);
        };
        // "[]" has no name; an odd run of trailing backslashes escapes the "]"
        let trailing_backslashes = glob.chars().rev().take_while(|&c| c == '\\').count();
        if glob.is_empty() || trailing_backslashes % 2 == 1 {
            return Line::Skip(SkipReason::MalformedHeader);
        }
        if glob.len() > MAX_PATTERN_LENGTH {
            return Line::Skip(SkipReason::HeaderTooLong);
        }
        return Line::Header(glob);
    }

    let Some((key, value)) = line.split_once('=') else {
        return Line::Skip(SkipReason::NotAnAssignment);
    };
    let (key, value) = (key.trim(), value.trim());

    if key.is_empty() {
        Line::Skip(SkipReason::EmptyKey)
    } else if key.len() > MAX_KEY_LENGTH {
        Line::Skip(SkipReason::KeyTooLong)
    } else if value.len() > MAX_VALUE_LENGTH {
        Line::Skip(SkipReason::ValueTooLong)
    } else {
        Line::Assignment(key, value)
    }
}

/// Parse the text of one `.editorconfig` file.
pub fn parse(text: &str) -> ConfigFile {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut file = ConfigFile::default();
    let mut state = State::Preamble;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let mut skip = |reason: SkipReason| {
            trace!(line, %reason, "skipping line");
            file.skipped.push(SkippedLine { line, reason });
        };

        match classify(raw) {
            Line::Blank => {}
            Line::Header(glob) => {
                state = State::Section;
                file.sections.push(Section {
                    glob: glob.to_string(),
                    properties: PropertyMap::new(),
                    line,
                });
            }
            Line::Skip(reason) => {
                if matches!(reason, SkipReason::MalformedHeader | SkipReason::HeaderTooLong) {
                    state = State::Rejected;
                }
                skip(reason);
            }
            Line::Assignment(key, value) => match state {
                State::Preamble if key.eq_ignore_ascii_case("root") => {
                    file.root = value.eq_ignore_ascii_case("true");
                }
                State::Preamble => skip(SkipReason::UnknownPreambleKey),
                State::Rejected => skip(SkipReason::InRejectedSection),
                State::Section => {
                    if let Some(section) = file.sections.last_mut() {
                        section.properties.insert(key, value);
                    }
                }
            },
        }
    }

    file
}
