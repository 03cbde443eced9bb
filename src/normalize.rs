//! Post-merge cleanup of well-known properties.

use std::fmt;
use std::str::FromStr;

use crate::properties::{
    parse_bool, parse_columns, Charset, EndOfLine, IndentSize, IndentStyle, MaxLineLength,
    PropertyMap, UNSET,
};

/// Property names with an enumerated or numeric value domain.
pub const KNOWN_PROPERTIES: [&str; 9] = [
    "indent_style",
    "indent_size",
    "tab_width",
    "end_of_line",
    "charset",
    "trim_trailing_whitespace",
    "insert_final_newline",
    "max_line_length",
    "root",
];

/// Whether `value` (already lower-cased) is valid for the well-known `name`.
///
/// Returns `None` when `name` is not a well-known property.
fn is_recognized(name: &str, value: &str) -> Option<bool> {
    fn parses<T: FromStr>(value: &str) -> bool {
        value.parse::<T>().is_ok()
    }

    if value == UNSET {
        return KNOWN_PROPERTIES.contains(&name).then_some(true);
    }

    let recognized = match name {
        "indent_style" => parses::<IndentStyle>(value),
        "indent_size" => parses::<IndentSize>(value),
        "tab_width" => parse_columns(value).is_some(),
        "end_of_line" => parses::<EndOfLine>(value),
        "charset" => parses::<Charset>(value),
        "trim_trailing_whitespace" | "insert_final_newline" | "root" => {
            parse_bool(value).is_some()
        }
        "max_line_length" => parses::<MaxLineLength>(value),
        _ => return None,
    };
    Some(recognized)
}

/// Normalize a merged property map.
///
/// Recognized values of well-known properties are lower-cased; anything else
/// is left verbatim. `indent_size = tab` takes the value of `tab_width` when
/// that is set.
pub fn normalize(map: PropertyMap) -> PropertyMap {
    normalize_with(map, false)
}

/// Like [`normalize`], optionally deriving the implied defaults:
///
/// - `indent_style = tab` without `indent_size` sets `indent_size = tab`
/// - a numeric `indent_size` without `tab_width` sets `tab_width` to match
pub fn normalize_with(mut map: PropertyMap, derive_defaults: bool) -> PropertyMap {
    for name in KNOWN_PROPERTIES {
        if let Some(value) = map.get_mut(name) {
            let lowered = value.to_lowercase();
            if is_recognized(name, &lowered) == Some(true) {
                *value = lowered;
            }
        }
    }

    if derive_defaults && map.get("indent_style") == Some("tab") && !map.contains("indent_size")
    {
        map.insert("indent_size", "tab");
    }

    if derive_defaults && !map.contains("tab_width") {
        if let Some(size) = map.get("indent_size").filter(|s| parse_columns(s).is_some()) {
            let size = size.to_string();
            map.insert("tab_width", size);
        }
    }

    if map.get("indent_size") == Some("tab") {
        if let Some(width) = map.get("tab_width").filter(|w| *w != UNSET) {
            let width = width.to_string();
            map.insert("indent_size", width);
        }
    }

    map
}

/// A well-known property whose value is outside its domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyWarning {
    pub name: String,
    pub value: String,
}

impl fmt::Display for PropertyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized value for {}: {:?}", self.name, self.value)
    }
}

/// Report well-known properties holding values they do not accept.
pub fn validate(map: &PropertyMap) -> Vec<PropertyWarning> {
    map.iter()
        .filter(|(name, value)| is_recognized(name, &value.to_lowercase()) == Some(false))
        .map(|(name, value)| PropertyWarning {
            name: name.to_string(),
            value: value.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> PropertyMap {
        entries.iter().copied().collect()
    }

    fn entries(map: &PropertyMap) -> Vec<(&str, &str)> {
        map.iter().collect()
    }

    #[test]
    fn test_lowercases_recognized_values() {
        let result = normalize(map(&[
            ("indent_style", "Space"),
            ("end_of_line", "CRLF"),
            ("charset", "UTF-8"),
            ("insert_final_newline", "TRUE"),
            ("max_line_length", "OFF"),
        ]));

        assert_eq!(
            entries(&result),
            vec![
                ("indent_style", "space"),
                ("end_of_line", "crlf"),
                ("charset", "utf-8"),
                ("insert_final_newline", "true"),
                ("max_line_length", "off"),
            ]
        );
    }

    #[test]
    fn test_unknown_keys_and_unrecognized_values_verbatim() {
        let result = normalize(map(&[("My_Setting", "MixedCase"), ("indent_style", "Tabs")]));

        assert_eq!(result.get("my_setting"), Some("MixedCase"));
        assert_eq!(result.get("indent_style"), Some("Tabs"));
    }

    #[test]
    fn test_unset_is_lowercased() {
        let result = normalize(map(&[("indent_size", "UNSET")]));
        assert_eq!(result.get("indent_size"), Some("unset"));
    }

    #[test]
    fn test_indent_size_tab_uses_tab_width() {
        let result = normalize(map(&[("indent_size", "Tab"), ("tab_width", "8")]));
        assert_eq!(
            entries(&result),
            vec![("indent_size", "8"), ("tab_width", "8")]
        );
    }

    #[test]
    fn test_indent_size_tab_without_tab_width_stays() {
        let result = normalize(map(&[("indent_size", "tab")]));
        assert_eq!(entries(&result), vec![("indent_size", "tab")]);
    }

    #[test]
    fn test_no_defaults_derived_unless_asked() {
        let result = normalize(map(&[("indent_style", "space"), ("indent_size", "4")]));
        assert_eq!(
            entries(&result),
            vec![("indent_style", "space"), ("indent_size", "4")]
        );
    }

    #[test]
    fn test_derive_tab_width_from_indent_size() {
        let result = normalize_with(map(&[("indent_size", "4")]), true);
        assert_eq!(
            entries(&result),
            vec![("indent_size", "4"), ("tab_width", "4")]
        );
    }

    #[test]
    fn test_derive_indent_size_from_tab_style() {
        let result = normalize_with(map(&[("indent_style", "tab")]), true);
        assert_eq!(
            entries(&result),
            vec![("indent_style", "tab"), ("indent_size", "tab")]
        );

        let result = normalize_with(map(&[("indent_style", "tab"), ("tab_width", "3")]), true);
        assert_eq!(result.get("indent_size"), Some("3"));
    }

    #[test]
    fn test_validate_reports_bad_values_only() {
        let warnings = validate(&map(&[
            ("indent_style", "tabs"),
            ("indent_size", "4"),
            ("tab_width", "0"),
            ("charset", "unset"),
            ("custom", "whatever"),
        ]));

        let names: Vec<_> = warnings.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["indent_style", "tab_width"]);
        assert_eq!(
            warnings[0].to_string(),
            r#"unrecognized value for indent_style: "tabs""#
        );
    }
}
