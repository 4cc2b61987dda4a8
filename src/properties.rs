//! Property-based tests for coercion, path parsing, merging and mutation.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::literal::parse_literal;
    use crate::merge::deep_merge;
    use crate::mutation::Mutator;
    use crate::operation::Operation;
    use crate::path::{parse_key_path, ListIndex};
    use crate::value::{coerce, coerce_scalar};
    use proptest::prelude::*;
    use serde_yaml::{Mapping, Value as YamlValue};
    use std::collections::BTreeMap;

    fn flat_document(entries: &BTreeMap<String, i64>) -> YamlValue {
        let mut map = Mapping::new();
        for (key, value) in entries {
            map.insert(YamlValue::String(key.clone()), YamlValue::from(*value));
        }
        YamlValue::Mapping(map)
    }

    proptest! {
        #[test]
        fn coerce_integers_round_trip(n in any::<i64>()) {
            prop_assert_eq!(coerce_scalar(&n.to_string()), YamlValue::from(n));
        }

        #[test]
        fn coerce_is_deterministic(input in ".*") {
            prop_assert_eq!(coerce_scalar(&input), coerce_scalar(&input));
        }

        /// Words starting with `v` are never numbers or booleans
        #[test]
        fn coerce_words_stay_strings(word in "v[a-z_]{0,12}") {
            prop_assert_eq!(coerce_scalar(&word), YamlValue::String(word.clone()));
        }

        #[test]
        fn comma_lists_keep_non_empty_items(items in prop::collection::vec("v[a-z]{1,6}", 2..8)) {
            let raw = parse_literal(&items.join(",")).unwrap();
            let expected: Vec<YamlValue> = items.iter().cloned().map(YamlValue::String).collect();
            prop_assert_eq!(coerce(&raw), YamlValue::Sequence(expected));
        }
    }

    proptest! {
        #[test]
        fn plain_paths_split_on_every_dot(parts in prop::collection::vec("[a-z_][a-z0-9_]{0,8}", 1..6)) {
            let segments = parse_key_path(&parts.join("."));
            let names: Vec<_> = segments.iter().map(|s| s.name.clone()).collect();
            prop_assert_eq!(names, parts);
            prop_assert!(segments.iter().all(|s| s.index.is_none()));
        }

        #[test]
        fn escaped_dots_stay_in_one_segment(parts in prop::collection::vec("[a-z]{1,8}", 2..5), tail in "[a-z]{1,8}") {
            let key = format!("{}.{}", parts.join(r"\."), tail);
            let segments = parse_key_path(&key);
            prop_assert_eq!(segments.len(), 2);
            prop_assert_eq!(&segments[0].name, &parts.join("."));
            prop_assert_eq!(&segments[1].name, &tail);
        }

        #[test]
        fn numeric_indices_parse_as_positions(name in "[a-z]{1,8}", idx in 0usize..10_000) {
            let segments = parse_key_path(&format!("{}[{}]", name, idx));
            prop_assert_eq!(segments[0].index.clone(), Some(ListIndex::Position(idx)));
        }
    }

    proptest! {
        /// merge(A, B) holds B's value for every key of B and A's value for the rest
        #[test]
        fn merge_overwrite_law(
            primary in prop::collection::btree_map("[a-e]", any::<i64>(), 0..5),
            secondary in prop::collection::btree_map("[a-e]", any::<i64>(), 0..5),
        ) {
            let mut merged = flat_document(&primary);
            deep_merge(&mut merged, &flat_document(&secondary));

            for (key, value) in &secondary {
                prop_assert_eq!(&merged[key.as_str()], &YamlValue::from(*value));
            }
            for (key, value) in primary.iter().filter(|(k, _)| !secondary.contains_key(*k)) {
                prop_assert_eq!(&merged[key.as_str()], &YamlValue::from(*value));
            }
        }

        /// Updating a key to the value it already holds changes nothing
        #[test]
        fn equal_updates_are_no_ops(entries in prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 1..6)) {
            let mut document = flat_document(&entries);
            let before = document.clone();

            for (key, value) in &entries {
                let value = coerce_scalar(&value.to_string());
                let mutator = Mutator::new(Operation::Update, Some(&value), false);
                let changed = mutator.apply(&mut document, &parse_key_path(key)).unwrap();
                prop_assert!(!changed);
            }
            prop_assert_eq!(document, before);
        }
    }
}
