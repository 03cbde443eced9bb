//! Resolved EditorConfig properties.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

/// The value every well-known property accepts to cancel an inherited setting.
pub const UNSET: &str = "unset";

/// Ordered property name to value mapping.
///
/// Names are stored lower-case. Re-assigning a name replaces its value but
/// keeps the position it was first inserted at.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "IndexMap<String, String>")]
pub struct PropertyMap {
    entries: IndexMap<String, String>,
}

impl From<IndexMap<String, String>> for PropertyMap {
    fn from(entries: IndexMap<String, String>) -> Self {
        entries.into_iter().collect()
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, lower-casing the name.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_lowercase(), value.into());
    }

    /// Copy every entry of `other` over this map, in `other`'s order.
    pub fn extend_from(&mut self, other: &PropertyMap) {
        for (name, value) in other.iter() {
            self.entries.insert(name.to_string(), value.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name.to_lowercase().as_str())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut String> {
        self.entries.get_mut(name)
    }

    /// Value of a well-known property, with `unset` treated as absent.
    fn known(&self, name: &str) -> Option<&str> {
        self.get(name)
            .filter(|value| !value.eq_ignore_ascii_case(UNSET))
    }

    fn parsed<T: FromStr>(&self, name: &str) -> Option<T> {
        self.known(name).and_then(|value| value.parse().ok())
    }

    pub fn indent_style(&self) -> Option<IndentStyle> {
        self.parsed("indent_style")
    }

    pub fn indent_size(&self) -> Option<IndentSize> {
        self.parsed("indent_size")
    }

    pub fn tab_width(&self) -> Option<u32> {
        self.known("tab_width").and_then(parse_columns)
    }

    pub fn end_of_line(&self) -> Option<EndOfLine> {
        self.parsed("end_of_line")
    }

    pub fn charset(&self) -> Option<Charset> {
        self.parsed("charset")
    }

    pub fn trim_trailing_whitespace(&self) -> Option<bool> {
        self.known("trim_trailing_whitespace").and_then(parse_bool)
    }

    pub fn insert_final_newline(&self) -> Option<bool> {
        self.known("insert_final_newline").and_then(parse_bool)
    }

    pub fn max_line_length(&self) -> Option<MaxLineLength> {
        self.parsed("max_line_length")
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (name, value) in iter {
            map.insert(name.as_ref(), value);
        }
        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IndentStyle {
    Tab,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EndOfLine {
    Lf,
    Crlf,
    Cr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum Charset {
    #[strum(serialize = "latin1")]
    Latin1,
    #[strum(serialize = "utf-8")]
    Utf8,
    #[strum(serialize = "utf-8-bom")]
    Utf8Bom,
    #[strum(serialize = "utf-16be")]
    Utf16Be,
    #[strum(serialize = "utf-16le")]
    Utf16Le,
}

/// `indent_size`: a column count, or `tab` to follow `tab_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentSize {
    Tab,
    Columns(u32),
}

impl FromStr for IndentSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("tab") {
            Ok(IndentSize::Tab)
        } else {
            parse_columns(s).map(IndentSize::Columns).ok_or(())
        }
    }
}

/// `max_line_length`: a column count, or `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxLineLength {
    Off,
    Columns(u32),
}

impl FromStr for MaxLineLength {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("off") {
            Ok(MaxLineLength::Off)
        } else {
            parse_columns(s).map(MaxLineLength::Columns).ok_or(())
        }
    }
}

/// Positive integer column counts.
pub(crate) fn parse_columns(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|&n| n > 0)
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut map = PropertyMap::new();
        map.insert("indent_style", "space");
        map.insert("indent_size", "4");
        map.insert("indent_style", "tab");

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("indent_style", "tab"), ("indent_size", "4")]);
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let mut map = PropertyMap::new();
        map.insert("Indent_Style", "space");

        assert_eq!(map.get("indent_style"), Some("space"));
        assert_eq!(map.get("INDENT_STYLE"), Some("space"));
        assert_eq!(map.iter().next(), Some(("indent_style", "space")));
    }

    #[test]
    fn test_typed_accessors() {
        let map: PropertyMap = [
            ("indent_style", "space"),
            ("indent_size", "4"),
            ("tab_width", "8"),
            ("end_of_line", "crlf"),
            ("charset", "utf-8-bom"),
            ("trim_trailing_whitespace", "true"),
            ("insert_final_newline", "false"),
            ("max_line_length", "off"),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.indent_style(), Some(IndentStyle::Space));
        assert_eq!(map.indent_size(), Some(IndentSize::Columns(4)));
        assert_eq!(map.tab_width(), Some(8));
        assert_eq!(map.end_of_line(), Some(EndOfLine::Crlf));
        assert_eq!(map.charset(), Some(Charset::Utf8Bom));
        assert_eq!(map.trim_trailing_whitespace(), Some(true));
        assert_eq!(map.insert_final_newline(), Some(false));
        assert_eq!(map.max_line_length(), Some(MaxLineLength::Off));
    }

    #[test]
    fn test_accessors_ignore_unset_and_garbage() {
        let map: PropertyMap = [
            ("indent_style", "unset"),
            ("indent_size", "wide"),
            ("tab_width", "0"),
            ("charset", "ebcdic"),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.indent_style(), None);
        assert_eq!(map.indent_size(), None);
        assert_eq!(map.tab_width(), None);
        assert_eq!(map.charset(), None);
        assert_eq!(map.get("indent_style"), Some("unset"));
    }

    #[test]
    fn test_enum_round_trip_text() {
        assert_eq!(Charset::Utf16Le.as_ref(), "utf-16le");
        assert_eq!(IndentStyle::Tab.to_string(), "tab");
        assert_eq!("LF".parse::<EndOfLine>().ok(), Some(EndOfLine::Lf));
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let map: PropertyMap = [("b", "1"), ("a", "2")].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"b":"1","a":"2"}"#);
    }

    #[test]
    fn test_deserialize_lowercases_names() {
        let map: PropertyMap =
            serde_json::from_str(r#"{"Indent_Style":"space","TAB_WIDTH":"4"}"#).unwrap();

        assert_eq!(map.get("indent_style"), Some("space"));
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![("indent_style", "space"), ("tab_width", "4")]
        );
    }
}
