//! Deep merge of a secondary document into the edited one
//!
//! Maps are merged key by key, recursing where both sides hold a map. For any
//! other pair the secondary value replaces the primary one, so lists are
//! replaced wholesale rather than concatenated. Keys only present in the
//! primary document are left alone.

use log::debug;
use serde_yaml::Value as YamlValue;

use crate::value::{stringify, type_name};

/// Merge `secondary` into `primary`, secondary values winning on conflict.
///
/// # Examples
///
/// ```
/// use relayer::merge::deep_merge;
///
/// let mut primary: serde_yaml::Value = serde_yaml::from_str("a: {x: 1, y: 2}").unwrap();
/// let secondary: serde_yaml::Value = serde_yaml::from_str("a: {y: 3}\nb: 4").unwrap();
/// deep_merge(&mut primary, &secondary);
///
/// let expected: serde_yaml::Value = serde_yaml::from_str("a: {x: 1, y: 3}\nb: 4").unwrap();
/// assert_eq!(primary, expected);
/// ```
pub fn deep_merge(primary: &mut YamlValue, secondary: &YamlValue) {
    merge_values(primary, secondary, "");
}

fn merge_values(target: &mut YamlValue, source: &YamlValue, path: &str) {
    match (target, source) {
        (YamlValue::Mapping(target_map), YamlValue::Mapping(source_map)) => {
            for (key, value) in source_map {
                let new_path = if path.is_empty() {
                    stringify(key)
                } else {
                    format!("{}.{}", path, stringify(key))
                };

                match target_map.get_mut(key) {
                    Some(existing) if existing.is_mapping() && value.is_mapping() => {
                        merge_values(existing, value, &new_path);
                    }
                    Some(existing) => {
                        if existing != value {
                            debug!(
                                "Merge replaces {} at '{}' with {}",
                                type_name(existing),
                                new_path,
                                type_name(value)
                            );
                            *existing = value.clone();
                        }
                    }
                    None => {
                        debug!("Merge adds '{}'", new_path);
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => {
            if target != source {
                debug!(
                    "Merge replaces {} at '{}' with {}",
                    type_name(target),
                    path,
                    type_name(source)
                );
                *target = source.clone();
            }
        }
    }
}
