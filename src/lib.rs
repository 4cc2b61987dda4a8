//! # Relayer
//!
//! Path-addressed edits of YAML configuration documents. A caller names a
//! node with a dotted key path and says what to do with it; everything not
//! addressed by an edit is kept as it was.
//!
//! ## Quick Example
//!
//! ```
//! use relayer::orchestrator::{apply_edits, EditSet};
//!
//! let mut document: serde_yaml::Value =
//!     serde_yaml::from_str("field_0:\n  sub_field_1: old\n").unwrap();
//!
//! let edits = EditSet {
//!     update: vec!["field_0.sub_field_1=456,54".to_string()],
//!     add: vec![r"dotted\.key.inner=true".to_string()],
//!     ..Default::default()
//! };
//! let changed = apply_edits(&mut document, &edits, None).unwrap();
//!
//! assert!(changed);
//! assert_eq!(document["field_0"]["sub_field_1"][1], serde_yaml::Value::from(54));
//! assert_eq!(document["dotted.key"]["inner"], serde_yaml::Value::Bool(true));
//! ```
//!
//! ## Key Paths
//!
//! Segments are separated by `.`; `\.` is a literal dot inside a segment. A
//! segment may end in a bracketed index: `[3]`, `[start]`, `[end]`, or any
//! other text, which is searched for among the list's elements.
//!
//! ## Operations
//!
//! - **update**: replace existing values only
//! - **add**: create or replace, building any missing maps on the way
//! - **extend-list**: splice values into a list
//! - **insert**: insert one value into a list
//! - **rm**: delete a key or list position
//! - **rm-list-element**: delete a list element by value
//!
//! Within one invocation the batches run in a fixed order (removals first) and
//! an optional second document is deep-merged in last. See
//! [`orchestrator::apply_edits`].
//!
//! ## Values
//!
//! Request values are coerced to integers, floats and booleans where they
//! parse as one. `a,b` is a list and `{k:v},{k:w}` a list of maps; see
//! [`literal`].

pub mod batch;
pub mod document;
pub mod error;
pub mod literal;
pub mod merge;
pub mod mutation;
pub mod operation;
pub mod orchestrator;
pub mod output;
pub mod path;
pub mod preserve;
pub mod value;

#[cfg(test)]
mod properties;
