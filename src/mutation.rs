//! Path-addressed tree mutation
//!
//! The [`Mutator`] walks a document along the segments of one request key,
//! creating intermediate maps where the operation allows it, and applies the
//! edit at the last segment. Each level looks its segment up in the current
//! node:
//!
//! - in a map, by key;
//! - in a list, by scanning the elements for a scalar equal to the segment name
//!   or a map element that holds the segment name as a key. When the segment
//!   that led into the list carried an index (`items[1].name`), only that
//!   position is searched.
//!
//! The walk borrows one level at a time, so every write lands directly in the
//! slot (map key or list position) it was found at. A request that fails part
//! way leaves the edits of earlier requests in place.

use log::{debug, info, trace, warn};
use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{Error, Result};
use crate::operation::{Operation, OperationFlags};
use crate::path::{ListIndex, PathSegment};
use crate::value::{as_list, stringify, type_name};

/// Where a path segment was found inside its parent node
#[derive(Clone, Debug, PartialEq)]
enum Slot {
    /// `parent[key]` of a map
    Key(YamlValue),
    /// A list element that is itself equal to the segment name
    Element(usize),
    /// `parent[idx][key]`, a key inside a map element of a list
    Entry(usize, YamlValue),
}

/// Applies one operation with one value along request paths
#[derive(Debug)]
pub struct Mutator<'v> {
    flags: OperationFlags,
    value: Option<&'v YamlValue>,
    ignore_not_found: bool,
}

impl<'v> Mutator<'v> {
    /// `value` is `None` for the removal operations.
    pub fn new(operation: Operation, value: Option<&'v YamlValue>, ignore_not_found: bool) -> Self {
        Self {
            flags: operation.flags(),
            value,
            ignore_not_found,
        }
    }

    /// Apply the edit at `path` below `root`, reporting whether anything changed.
    pub fn apply(&self, root: &mut YamlValue, path: &[PathSegment]) -> Result<bool> {
        self.descend(root, path, None, "")
    }

    fn descend(
        &self,
        node: &mut YamlValue,
        path: &[PathSegment],
        position: Option<&ListIndex>,
        scope: &str,
    ) -> Result<bool> {
        let Some((segment, rest)) = path.split_first() else {
            return Ok(false);
        };
        trace!(
            "Visiting '{}' at '{}' ({} node)",
            segment,
            scope,
            type_name(node)
        );

        let slot = locate(node, &segment.name, position);

        if rest.is_empty() {
            return match slot {
                None => self.create_leaf(node, segment, scope),
                Some(slot) => self.modify_leaf(node, slot, segment, scope),
            };
        }

        match slot {
            None => self.create_subsection(node, segment, rest, scope),
            Some(slot) => self.enter_subsection(node, slot, segment, rest, scope),
        }
    }

    fn create_leaf(&self, node: &mut YamlValue, segment: &PathSegment, scope: &str) -> Result<bool> {
        if !self.flags.append {
            warn!("Key not found in dict: '{}' at '{}'", segment.name, scope);
            return self.ignore_or_fail(Error::KeyNotFound {
                key: segment.name.clone(),
                at: scope.to_string(),
            });
        }

        let value = self.value();
        let new_value = match &segment.index {
            None => value,
            Some(ListIndex::Start | ListIndex::End | ListIndex::Position(0)) => {
                YamlValue::Sequence(as_list(value))
            }
            Some(_) => {
                warn!("List doesn't exist: '{}' at '{}'", segment, scope);
                return Err(Error::ListNotFound {
                    key: segment.name.clone(),
                    at: scope.to_string(),
                });
            }
        };

        debug!(
            "Adding key '{}' at '{}' into {} node",
            segment.name,
            scope,
            type_name(node)
        );
        insert_child(node, &segment.name, new_value);
        Ok(true)
    }

    fn modify_leaf(
        &self,
        node: &mut YamlValue,
        slot: Slot,
        segment: &PathSegment,
        scope: &str,
    ) -> Result<bool> {
        if self.flags.remove_by_value {
            return self.remove_element(node, &slot, segment, scope);
        }
        if self.flags.remove {
            return self.remove_at(node, slot, segment, scope);
        }

        let value = self.value();
        let target = child_mut(node, &slot, segment, scope)?;
        if *target == value {
            debug!("Value of '{}' at '{}' is already set", segment, scope);
            return Ok(false);
        }

        if self.flags.extend {
            return self.extend_list(target, value, segment, scope);
        }
        if self.flags.list_insert {
            return self.insert_into_list(target, value, segment, scope);
        }
        match &segment.index {
            Some(index) => self.assign_in_list(target, value, segment, index, scope),
            None => {
                debug!("Setting value on an existing leaf '{}' at '{}'", segment.name, scope);
                *target = value;
                Ok(true)
            }
        }
    }

    fn extend_list(
        &self,
        target: &mut YamlValue,
        value: YamlValue,
        segment: &PathSegment,
        scope: &str,
    ) -> Result<bool> {
        let items = expect_list(target, segment, scope)?;
        let at = match &segment.index {
            None | Some(ListIndex::End) => items.len(),
            Some(index) if index.is_empty_brackets() => items.len(),
            Some(ListIndex::Start) => 0,
            Some(ListIndex::Position(idx)) => within_insert_bounds(items, *idx, segment)?,
            Some(ListIndex::Symbolic(element)) => find_element(items, element, segment)?,
        };

        debug!("Extending list '{}' at position {}", segment.name, at);
        items.splice(at..at, as_list(value));
        Ok(true)
    }

    fn insert_into_list(
        &self,
        target: &mut YamlValue,
        value: YamlValue,
        segment: &PathSegment,
        scope: &str,
    ) -> Result<bool> {
        let items = expect_list(target, segment, scope)?;
        let at = match &segment.index {
            None | Some(ListIndex::End) => items.len(),
            Some(ListIndex::Start) => 0,
            Some(ListIndex::Position(idx)) => within_insert_bounds(items, *idx, segment)?,
            Some(ListIndex::Symbolic(element)) => find_element(items, element, segment)?,
        };

        debug!("Inserting to list '{}' at position {}", segment.name, at);
        items.insert(at, value);
        Ok(true)
    }

    fn assign_in_list(
        &self,
        target: &mut YamlValue,
        value: YamlValue,
        segment: &PathSegment,
        index: &ListIndex,
        scope: &str,
    ) -> Result<bool> {
        let items = expect_list(target, segment, scope)?;
        let at = match index {
            ListIndex::Start => {
                debug!("Prepending to list '{}'", segment.name);
                items.insert(0, value);
                return Ok(true);
            }
            ListIndex::End => {
                debug!("Appending to list '{}'", segment.name);
                items.push(value);
                return Ok(true);
            }
            ListIndex::Symbolic(element) => find_element(items, element, segment)?,
            other => existing_position(items, other, segment)?,
        };
        if items[at] == value {
            debug!("Element {} of '{}' is already set", at, segment.name);
            return Ok(false);
        }

        debug!("Setting value on a list '{}' at position {}", segment.name, at);
        items[at] = value;
        Ok(true)
    }

    fn remove_at(
        &self,
        node: &mut YamlValue,
        slot: Slot,
        segment: &PathSegment,
        scope: &str,
    ) -> Result<bool> {
        let Some(index) = &segment.index else {
            debug!("Removing key '{}' at '{}'", segment.name, scope);
            remove_slot(node, slot);
            return Ok(true);
        };

        let target = child_mut(node, &slot, segment, scope)?;
        let items = expect_list(target, segment, scope)?;
        let found = match index {
            ListIndex::Symbolic(element) => find_element(items, element, segment),
            other => existing_position(items, other, segment),
        };
        let at = match found {
            Ok(at) => at,
            Err(err) => return self.ignore_or_fail(err),
        };

        debug!("Removing element {} from list '{}'", at, segment.name);
        items.remove(at);
        Ok(true)
    }

    fn remove_element(
        &self,
        node: &mut YamlValue,
        slot: &Slot,
        segment: &PathSegment,
        scope: &str,
    ) -> Result<bool> {
        let Some(index) = &segment.index else {
            return Err(Error::MissingListElement {
                key: segment.name.clone(),
            });
        };

        let target = child_mut(node, slot, segment, scope)?;
        let items = expect_list(target, segment, scope)?;
        let text = index.to_string();

        // Structured match first, so `{"name": "a"}` removes a map element and
        // `5` removes the number 5; then the literal text.
        let structured = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|json| serde_yaml::to_value(json).ok());
        let literal = YamlValue::String(text.clone());
        let found = structured
            .and_then(|wanted| items.iter().position(|item| *item == wanted))
            .or_else(|| items.iter().position(|item| *item == literal));

        match found {
            Some(at) => {
                debug!("Removing element '{}' from list '{}'", text, segment.name);
                items.remove(at);
                Ok(true)
            }
            None => {
                info!("Element not found in list '{}': {}", segment.name, text);
                Ok(false)
            }
        }
    }

    fn create_subsection(
        &self,
        node: &mut YamlValue,
        segment: &PathSegment,
        rest: &[PathSegment],
        scope: &str,
    ) -> Result<bool> {
        if !self.flags.append {
            warn!("Subsection not found in dict: '{}' at '{}'", segment.name, scope);
            return Err(Error::SubsectionNotFound {
                key: segment.name.clone(),
                at: scope.to_string(),
            });
        }

        debug!(
            "Creating subsection object '{}' at '{}' in {} node",
            segment.name,
            scope,
            type_name(node)
        );
        let child = insert_child(node, &segment.name, empty_map());
        self.descend(child, rest, None, &nested_scope(scope, &segment.name))?;
        Ok(true)
    }

    fn enter_subsection(
        &self,
        node: &mut YamlValue,
        slot: Slot,
        segment: &PathSegment,
        rest: &[PathSegment],
        scope: &str,
    ) -> Result<bool> {
        let mut changed = false;
        let mut child = child_mut(node, &slot, segment, scope)?;

        if !matches!(child, YamlValue::Mapping(_) | YamlValue::Sequence(_)) {
            if !self.flags.append {
                warn!(
                    "Leaf key was found where subsection expected: '{}' at '{}' (--add to overwrite)",
                    segment.name, scope
                );
                return Err(Error::LeafWhereSubsectionExpected {
                    key: segment.name.clone(),
                    at: scope.to_string(),
                });
            }

            if let Slot::Element(_) = slot {
                debug!(
                    "Opening list element '{}' at '{}' into a subsection",
                    segment.name, scope
                );
                child = open_up(child, &segment.name);
            } else {
                warn!(
                    "Overriding existing {} '{}' at '{}' with new subsection",
                    type_name(child),
                    segment.name,
                    scope
                );
                *child = empty_map();
            }
            changed = true;
        }

        let nested = self.descend(
            child,
            rest,
            segment.index.as_ref(),
            &nested_scope(scope, &segment.name),
        )?;
        Ok(changed | nested)
    }

    fn value(&self) -> YamlValue {
        self.value.cloned().unwrap_or(YamlValue::Null)
    }

    fn ignore_or_fail(&self, err: Error) -> Result<bool> {
        if self.flags.remove && self.ignore_not_found && err.is_not_found() {
            warn!("{}, ignoring", err);
            return Ok(false);
        }
        Err(err)
    }
}

fn locate(node: &YamlValue, name: &str, position: Option<&ListIndex>) -> Option<Slot> {
    let key = YamlValue::String(name.to_string());
    match node {
        YamlValue::Mapping(map) => map.contains_key(&key).then_some(Slot::Key(key)),
        YamlValue::Sequence(items) => {
            let only = match position {
                Some(index) => Some(resolve_position(items, index)?),
                None => None,
            };
            items
                .iter()
                .enumerate()
                .filter(|(idx, _)| only.map_or(true, |only| only == *idx))
                .find_map(|(idx, element)| {
                    if *element == key {
                        Some(Slot::Element(idx))
                    } else if holds_key(element, &key) {
                        Some(Slot::Entry(idx, key.clone()))
                    } else {
                        None
                    }
                })
        }
        _ => None,
    }
}

fn holds_key(element: &YamlValue, key: &YamlValue) -> bool {
    element
        .as_mapping()
        .is_some_and(|map| map.contains_key(key))
}

/// The existing element an index refers to, if any.
fn resolve_position(items: &[YamlValue], index: &ListIndex) -> Option<usize> {
    match index {
        ListIndex::Start => (!items.is_empty()).then_some(0),
        ListIndex::End => items.len().checked_sub(1),
        ListIndex::Position(idx) => (*idx < items.len()).then_some(*idx),
        ListIndex::Symbolic(element) => {
            let key = YamlValue::String(element.clone());
            items
                .iter()
                .position(|item| *item == key || holds_key(item, &key))
        }
    }
}

fn existing_position(items: &[YamlValue], index: &ListIndex, segment: &PathSegment) -> Result<usize> {
    resolve_position(items, index).ok_or_else(|| Error::IndexOutOfRange {
        key: segment.name.clone(),
        index: match index {
            ListIndex::Position(idx) => *idx,
            _ => 0,
        },
        len: items.len(),
    })
}

fn find_element(items: &[YamlValue], element: &str, segment: &PathSegment) -> Result<usize> {
    resolve_position(items, &ListIndex::Symbolic(element.to_string())).ok_or_else(|| {
        Error::ListElementNotFound {
            key: segment.name.clone(),
            element: element.to_string(),
        }
    })
}

fn within_insert_bounds(items: &[YamlValue], idx: usize, segment: &PathSegment) -> Result<usize> {
    if idx > items.len() {
        warn!("Index out of range: '{}[{}]'", segment.name, idx);
        return Err(Error::IndexOutOfRange {
            key: segment.name.clone(),
            index: idx,
            len: items.len(),
        });
    }
    Ok(idx)
}

fn expect_list<'n>(
    target: &'n mut YamlValue,
    segment: &PathSegment,
    scope: &str,
) -> Result<&'n mut Vec<YamlValue>> {
    match target {
        YamlValue::Sequence(items) => Ok(items),
        other => {
            warn!(
                "Key is not a list: '{}' at '{}' ({})",
                segment.name,
                scope,
                type_name(other)
            );
            Err(Error::NotAList {
                key: segment.name.clone(),
                at: scope.to_string(),
            })
        }
    }
}

fn child_mut<'n>(
    node: &'n mut YamlValue,
    slot: &Slot,
    segment: &PathSegment,
    scope: &str,
) -> Result<&'n mut YamlValue> {
    let child = match (node, slot) {
        (YamlValue::Mapping(map), Slot::Key(key)) => map.get_mut(key),
        (YamlValue::Sequence(items), Slot::Element(idx)) => items.get_mut(*idx),
        (YamlValue::Sequence(items), Slot::Entry(idx, key)) => items
            .get_mut(*idx)
            .and_then(YamlValue::as_mapping_mut)
            .and_then(|map| map.get_mut(key)),
        _ => None,
    };
    child.ok_or_else(|| Error::KeyNotFound {
        key: segment.name.clone(),
        at: scope.to_string(),
    })
}

/// Add `name: value` under `node` and return the new child.
///
/// A list gets a new one-key map element. A null node becomes a map, and any
/// other scalar is opened up into a map keyed by its own text.
fn insert_child<'n>(node: &'n mut YamlValue, name: &str, value: YamlValue) -> &'n mut YamlValue {
    let key = YamlValue::String(name.to_string());
    match node {
        YamlValue::Mapping(map) => map.entry(key).or_insert(value),
        YamlValue::Sequence(items) => {
            items.push(single_entry(key.clone(), value));
            let last = items.len() - 1;
            &mut items[last][key]
        }
        YamlValue::Null => {
            *node = empty_map();
            insert_child(node, name, value)
        }
        _ => {
            let leaf = stringify(node);
            debug!("Coercing leaf '{}' to dict", leaf);
            let inner = open_up(node, &leaf);
            insert_child(inner, name, value)
        }
    }
}

/// Replace a leaf with `{name: {}}` and return the inner map.
fn open_up<'n>(leaf: &'n mut YamlValue, name: &str) -> &'n mut YamlValue {
    let key = YamlValue::String(name.to_string());
    *leaf = single_entry(key.clone(), empty_map());
    &mut leaf[key]
}

fn remove_slot(node: &mut YamlValue, slot: Slot) {
    match (node, slot) {
        (YamlValue::Mapping(map), Slot::Key(key)) => remove_key(map, &key),
        (YamlValue::Sequence(items), Slot::Element(idx)) => {
            items.remove(idx);
        }
        (YamlValue::Sequence(items), Slot::Entry(idx, key)) => {
            let now_empty = match items.get_mut(idx) {
                Some(YamlValue::Mapping(map)) => {
                    remove_key(map, &key);
                    map.is_empty()
                }
                _ => false,
            };
            if now_empty {
                items.remove(idx);
            }
        }
        _ => {}
    }
}

/// Remove a key while keeping the order of the remaining entries.
fn remove_key(map: &mut Mapping, key: &YamlValue) {
    *map = std::mem::take(map)
        .into_iter()
        .filter(|(k, _)| k != key)
        .collect();
}

fn single_entry(key: YamlValue, value: YamlValue) -> YamlValue {
    let mut map = Mapping::new();
    map.insert(key, value);
    YamlValue::Mapping(map)
}

fn empty_map() -> YamlValue {
    YamlValue::Mapping(Mapping::new())
}

fn nested_scope(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}
