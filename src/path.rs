//! Key path parsing
//!
//! A request key such as `servers[0].env.LOG\.LEVEL` addresses a node in the
//! document tree. It is split on every `.` that is not escaped with a
//! backslash, and each piece may end in a bracketed list index:
//!
//! - `name[3]` - absolute position,
//! - `name[start]` / `name[end]` - first / last position,
//! - `name[anything else]` - a symbolic index, matched against the list's
//!   elements (an equal scalar, or a map element holding that key).
//!
//! A non-digit index is always symbolic; there is no separate error for a
//! malformed number.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static BRACKET_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<name>.*)\[(?P<index>.*)\]$").expect("bracket suffix regex is valid")
});

/// A bracketed index on a path segment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListIndex {
    /// `[start]`, the first position
    Start,
    /// `[end]`, the last existing position
    End,
    /// `[N]`, an absolute position
    Position(usize),
    /// Any other bracket content, searched for among the list's elements
    Symbolic(String),
}

impl ListIndex {
    fn parse(text: &str) -> Self {
        match text {
            "start" => ListIndex::Start,
            "end" => ListIndex::End,
            digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits
                .parse()
                .map(ListIndex::Position)
                .unwrap_or_else(|_| ListIndex::Symbolic(digits.to_string())),
            other => ListIndex::Symbolic(other.to_string()),
        }
    }

    /// `[]` written with nothing between the brackets
    pub fn is_empty_brackets(&self) -> bool {
        matches!(self, ListIndex::Symbolic(s) if s.is_empty())
    }
}

impl fmt::Display for ListIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListIndex::Start => f.write_str("start"),
            ListIndex::End => f.write_str("end"),
            ListIndex::Position(idx) => write!(f, "{}", idx),
            ListIndex::Symbolic(s) => f.write_str(s),
        }
    }
}

/// One dot-delimited component of a key path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    /// Map key or list search value, escapes already removed
    pub name: String,
    pub index: Option<ListIndex>,
}

impl PathSegment {
    /// A segment without an index
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// A segment with an index
    pub fn indexed(name: impl Into<String>, index: ListIndex) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    fn parse(raw: &str) -> Self {
        match BRACKET_SUFFIX.captures(raw) {
            Some(caps) => Self::indexed(&caps["name"], ListIndex::parse(&caps["index"])),
            None => Self::key(raw),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

/// Parse a key into its ordered path segments
///
/// # Examples
///
/// ```
/// use relayer::path::{parse_key_path, ListIndex, PathSegment};
///
/// let segments = parse_key_path(r"dotted\.field.items[0]");
/// assert_eq!(
///     segments,
///     vec![
///         PathSegment::key("dotted.field"),
///         PathSegment::indexed("items", ListIndex::Position(0)),
///     ]
/// );
/// ```
pub fn parse_key_path(key: &str) -> Vec<PathSegment> {
    split_unescaped_dots(key)
        .iter()
        .map(|raw| PathSegment::parse(raw))
        .collect()
}

fn split_unescaped_dots(key: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = key.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'.') => {
                current.push('.');
                chars.next();
            }
            '.' => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_dot_notation() {
        let segments = parse_key_path("foo.bar.baz");
        assert_eq!(
            segments,
            vec![
                PathSegment::key("foo"),
                PathSegment::key("bar"),
                PathSegment::key("baz")
            ]
        );
    }

    #[test]
    fn test_parse_escaped_dot() {
        let segments = parse_key_path(r"a\.b.c");
        assert_eq!(segments, vec![PathSegment::key("a.b"), PathSegment::key("c")]);
    }

    #[test]
    fn test_parse_deeply_escaped_segments() {
        let segments = parse_key_path(
            r"dont_open_dotted_inside.internal\.dotted\.field.internal_1[0].deep\.dotted\.field",
        );
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[1].name, "internal.dotted.field");
        assert_eq!(segments[2].index, Some(ListIndex::Position(0)));
        assert_eq!(segments[3].name, "deep.dotted.field");
    }

    #[test]
    fn test_backslash_without_dot_is_kept() {
        let segments = parse_key_path(r"win\path.x");
        assert_eq!(segments[0].name, r"win\path");
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(
            parse_key_path("items[3]"),
            vec![PathSegment::indexed("items", ListIndex::Position(3))]
        );
        assert_eq!(
            parse_key_path("items[start]"),
            vec![PathSegment::indexed("items", ListIndex::Start)]
        );
        assert_eq!(
            parse_key_path("items[end]"),
            vec![PathSegment::indexed("items", ListIndex::End)]
        );
    }

    #[test]
    fn test_non_digit_index_is_symbolic() {
        assert_eq!(
            parse_key_path("items[relay1_1]")[0].index,
            Some(ListIndex::Symbolic("relay1_1".to_string()))
        );
        assert_eq!(
            parse_key_path("items[-1]")[0].index,
            Some(ListIndex::Symbolic("-1".to_string()))
        );
        // start/end are case-sensitive
        assert_eq!(
            parse_key_path("items[START]")[0].index,
            Some(ListIndex::Symbolic("START".to_string()))
        );
    }

    #[test]
    fn test_empty_brackets() {
        let segments = parse_key_path("items[]");
        let index = segments[0].index.as_ref().unwrap();
        assert!(index.is_empty_brackets());
        assert_eq!(segments[0].name, "items");
    }

    #[test]
    fn test_index_on_middle_segment() {
        let segments = parse_key_path("list_field[1].data.sub_data[start].val");
        assert_eq!(
            segments,
            vec![
                PathSegment::indexed("list_field", ListIndex::Position(1)),
                PathSegment::key("data"),
                PathSegment::indexed("sub_data", ListIndex::Start),
                PathSegment::key("val"),
            ]
        );
    }

    #[test]
    fn test_json_element_selector() {
        let segments = parse_key_path(r#"field_2.sub_field_0[{"name": "a", "data": 0}]"#);
        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[1].index,
            Some(ListIndex::Symbolic(r#"{"name": "a", "data": 0}"#.to_string()))
        );
    }

    #[test]
    fn test_display_round_trips_segment() {
        let segment = PathSegment::indexed("items", ListIndex::End);
        assert_eq!(segment.to_string(), "items[end]");
        assert_eq!(PathSegment::key("plain").to_string(), "plain");
    }
}
