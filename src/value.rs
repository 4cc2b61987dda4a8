//! Value coercion
//!
//! Turns the raw text of a request value into a typed YAML node. A raw value
//! is either a single piece of text or a structure already split out by the
//! inline literal grammar in [`crate::literal`]; every leaf of it is coerced on
//! its own:
//!
//! 1. surrounding whitespace is stripped,
//! 2. an integer parse is attempted, then a float parse,
//! 3. then a case-insensitive boolean (`true/t/y/yes`, `false/f/n/no`),
//! 4. anything else stays a string.
//!
//! Strings are emitted by the dump provider with quotes whenever they would
//! otherwise read back as another type, so the coerced type survives a round
//! trip through the document.

use serde_yaml::{Mapping, Number, Value as YamlValue};

/// A request value before coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawValue {
    /// A single token
    Text(String),
    /// A comma separated list, or a list of map literals
    List(Vec<RawValue>),
    /// One `{key:value,...}` literal, keys in written order
    Map(Vec<(String, RawValue)>),
}

/// Coerce a raw value, recursing into lists and into both keys and values of
/// maps.
pub fn coerce(raw: &RawValue) -> YamlValue {
    match raw {
        RawValue::Text(text) => coerce_scalar(text),
        RawValue::List(items) => YamlValue::Sequence(items.iter().map(coerce).collect()),
        RawValue::Map(entries) => {
            let mut map = Mapping::new();
            for (key, value) in entries {
                map.insert(coerce_scalar(key), coerce(value));
            }
            YamlValue::Mapping(map)
        }
    }
}

/// Coerce a single token into an integer, float, boolean or string.
pub fn coerce_scalar(text: &str) -> YamlValue {
    let text = text.trim();

    if let Ok(int) = text.parse::<i64>() {
        return YamlValue::Number(int.into());
    }
    if let Ok(uint) = text.parse::<u64>() {
        return YamlValue::Number(uint.into());
    }
    // Integers wider than u64 stay text rather than losing digits as floats.
    if is_integer_literal(text) {
        return YamlValue::String(text.to_string());
    }
    if let Ok(float) = text.parse::<f64>() {
        return YamlValue::Number(Number::from(float));
    }
    if let Some(flag) = parse_bool(text) {
        return YamlValue::Bool(flag);
    }

    YamlValue::String(text.to_string())
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse the boolean spellings accepted on the command line.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "true" | "t" | "y" | "yes" => Some(true),
        "false" | "f" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Wrap a value in a single-element list unless it already is a list.
pub fn as_list(value: YamlValue) -> Vec<YamlValue> {
    match value {
        YamlValue::Sequence(items) => items,
        other => vec![other],
    }
}

/// Render a scalar as the text of a mapping key.
///
/// Used when a leaf has to be opened up into a map keyed by its own value.
pub fn stringify(value: &YamlValue) -> String {
    match value {
        YamlValue::String(s) => s.clone(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Get a human-readable type name for a YAML value
///
/// Used for logging and error messages to describe the type of a value.
pub fn type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "Null",
        YamlValue::Bool(_) => "Bool",
        YamlValue::Number(_) => "Number",
        YamlValue::String(_) => "String",
        YamlValue::Sequence(_) => "Sequence",
        YamlValue::Mapping(_) => "Mapping",
        YamlValue::Tagged(_) => "Tagged",
    }
}
