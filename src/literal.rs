//! Inline list and dictionary literals
//!
//! Request values may spell out small structures directly on the command line:
//!
//! - `a,b,c` is a list; empty items are dropped, so `a,,b` and `item,` give
//!   `[a, b]` and `[item]`.
//! - `{k1:v1,k2:v2},{k3:v3}` is a list of maps. Inside a group each entry is
//!   split on its first `:`. A token without `:` is one more value for the
//!   previous key, so `{ports:80,443}` maps `ports` to `[80, 443]`.
//!
//! Grammar:
//!
//! ```text
//! literal := group (sep group)*
//! sep     := (',' | whitespace)*
//! group   := '{' entry (',' token)* '}'
//! entry   := key ':' token
//! ```
//!
//! The output is an uncoerced [`RawValue`]; see [`crate::value::coerce`].

use crate::error::{Error, Result};
use crate::value::RawValue;

/// Whether a raw value needs the literal grammar rather than plain coercion.
pub fn is_literal(text: &str) -> bool {
    text.contains(',') || text.contains('{') || text.contains('}')
}

/// Split a raw request value into its list/map structure.
///
/// Text without commas or braces comes back as a single [`RawValue::Text`].
pub fn parse_literal(text: &str) -> Result<RawValue> {
    if text.contains('{') || text.contains('}') {
        return parse_map_list(text).map(RawValue::List);
    }

    if text.contains(',') {
        let items = text
            .split(',')
            .filter(|item| !item.is_empty())
            .map(|item| RawValue::Text(item.to_string()))
            .collect();
        return Ok(RawValue::List(items));
    }

    Ok(RawValue::Text(text.to_string()))
}

fn parse_map_list(text: &str) -> Result<Vec<RawValue>> {
    let syntax_error = |message: &str| Error::ValueSyntax {
        value: text.to_string(),
        message: message.to_string(),
    };

    let mut groups = Vec::new();
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                let mut body = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(syntax_error("nested braces are not supported")),
                        _ => body.push(inner),
                    }
                }
                if !closed {
                    return Err(syntax_error("unbalanced braces"));
                }
                groups.push(parse_group(&body).map_err(|message| syntax_error(&message))?);
            }
            '}' => return Err(syntax_error("unbalanced braces")),
            ',' => {}
            c if c.is_whitespace() => {}
            c => {
                return Err(syntax_error(&format!(
                    "unexpected '{}' outside of a {{...}} group",
                    c
                )))
            }
        }
    }

    Ok(groups)
}

fn parse_group(body: &str) -> std::result::Result<RawValue, String> {
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();

    for token in body.split(',') {
        if let Some((key, value)) = token.split_once(':') {
            entries.push((key.to_string(), vec![value.to_string()]));
            continue;
        }
        match entries.last_mut() {
            Some((_, values)) => values.push(token.to_string()),
            None => return Err(format!("value '{}' appears before any key", token)),
        }
    }

    let entries = entries
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() > 1 {
                RawValue::List(values.into_iter().map(RawValue::Text).collect())
            } else {
                RawValue::Text(values.remove(0))
            };
            (key, value)
        })
        .collect();

    Ok(RawValue::Map(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::coerce;
    use serde_yaml::Value as YamlValue;

    fn coerced(text: &str) -> YamlValue {
        coerce(&parse_literal(text).unwrap())
    }

    fn yaml(text: &str) -> YamlValue {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_plain_text_is_not_split() {
        assert_eq!(
            parse_literal("abc").unwrap(),
            RawValue::Text("abc".to_string())
        );
        assert!(!is_literal("abc"));
        assert!(is_literal("a,b"));
        assert!(is_literal("{a:b}"));
    }

    #[test]
    fn test_list_drops_empty_items() {
        assert_eq!(coerced("aa,,bb"), yaml("[aa, bb]"));
        assert_eq!(coerced("item,"), yaml("[item]"));
        assert_eq!(coerced("456,54"), yaml("[456, 54]"));
    }

    #[test]
    fn test_list_of_maps() {
        assert_eq!(
            coerced("{bb:aa,dd:22.2},{kk:1}"),
            yaml("[{bb: aa, dd: 22.2}, {kk: 1}]")
        );
    }

    #[test]
    fn test_list_of_maps_with_spaces() {
        assert_eq!(
            coerced("{bb:aa, dd:22.2},{kk: 1},{aa:t}"),
            yaml("[{bb: aa, dd: 22.2}, {kk: 1}, {aa: true}]")
        );
    }

    #[test]
    fn test_single_map_is_still_a_list() {
        assert_eq!(coerced("{kk:1}"), yaml("[{kk: 1}]"));
    }

    #[test]
    fn test_key_collects_following_values() {
        assert_eq!(
            coerced("{ports:80,443,name:web}"),
            yaml("[{ports: [80, 443], name: web}]")
        );
    }

    #[test]
    fn test_value_keeps_colons_after_the_first() {
        assert_eq!(
            coerced("{url:http://localhost:8080}"),
            yaml("[{url: 'http://localhost:8080'}]")
        );
    }

    #[test]
    fn test_dotted_keys_and_values() {
        assert_eq!(
            coerced("{type:d.with.dots,dot.value:4}"),
            yaml("[{type: d.with.dots, dot.value: 4}]")
        );
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let value = coerced("{a:1,b:2,a:3}");
        let map = value[0].as_mapping().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&YamlValue::Number(3.into())));
        assert_eq!(map.keys().next(), Some(&YamlValue::String("a".to_string())));
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        for bad in ["{a:1", "a:1}", "{a:1}}", "{a:1},{b:2"] {
            let err = parse_literal(bad).unwrap_err();
            assert!(
                matches!(err, Error::ValueSyntax { .. }),
                "expected syntax error for {}",
                bad
            );
        }
    }

    #[test]
    fn test_value_before_key_fails() {
        let err = parse_literal("{orphan,a:1}").unwrap_err();
        assert!(err.to_string().contains("before any key"));
        assert!(parse_literal("{}").is_err());
    }

    #[test]
    fn test_nested_braces_fail() {
        let err = parse_literal("{a:{b:1}}").unwrap_err();
        assert!(err.to_string().contains("nested"));
    }

    #[test]
    fn test_text_outside_groups_fails() {
        let err = parse_literal("{a:1}x").unwrap_err();
        assert!(err.to_string().contains("outside"));
    }
}
