//! Formatting-preserving write-back
//!
//! Edits run on a `serde_yaml::Value`, which has no room for comments or quote
//! styles. [`splice_changes`] replays the difference between the loaded tree
//! and the edited tree onto a lossless parse of the original text, so every
//! entry an edit did not touch keeps its comments, quoting and layout.
//!
//! The spliced text is read back before it is accepted. When it does not
//! describe exactly the edited tree (same values, same key order), or the
//! change cannot be expressed on the lossless tree at all, the caller falls
//! back to a plain dump.

use log::{debug, trace};
use serde_yaml::{Mapping, Value as YamlValue};
use std::str::FromStr;
use yaml_edit::{ScalarValue, YamlFile as Yaml};

type EditValue = yaml_edit::YamlValue;

/// Render `after` by editing `original`, the text `before` was parsed from.
///
/// Returns `None` when the document cannot be written this way.
pub fn splice_changes(original: &str, before: &YamlValue, after: &YamlValue) -> Option<String> {
    let (YamlValue::Mapping(old), YamlValue::Mapping(new)) = (before, after) else {
        debug!("Top level is not a map, formatting is not preserved");
        return None;
    };

    let yaml = match Yaml::from_str(original) {
        Ok(yaml) => yaml,
        Err(err) => {
            debug!("Lossless parse failed, formatting is not preserved: {}", err);
            return None;
        }
    };
    let mut root = yaml.document()?.as_mapping()?;
    reconcile(&mut root, old, new)?;

    let mut text = yaml.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    if describes(&text, after) {
        Some(text)
    } else {
        debug!("Spliced document does not read back as the edited one");
        None
    }
}

/// Bring `target` from the `old` entries to the `new` ones.
fn reconcile(target: &mut yaml_edit::Mapping, old: &Mapping, new: &Mapping) -> Option<()> {
    for key in old.keys() {
        if !new.contains_key(key) {
            let name = key.as_str()?;
            trace!("Splicing out '{}'", name);
            if target.remove(name).is_none() {
                return None;
            }
        }
    }

    for (key, value) in new {
        let name = key.as_str()?;
        match (old.get(key), value) {
            (Some(previous), _) if previous == value => {}
            (Some(YamlValue::Mapping(old_inner)), YamlValue::Mapping(new_inner)) => {
                let mut inner = target.get_mapping(name)?;
                reconcile(&mut inner, old_inner, new_inner)?;
            }
            _ => {
                trace!("Splicing in '{}'", name);
                target.set(name, to_edit_value(value)?);
            }
        }
    }

    Some(())
}

fn to_edit_value(value: &YamlValue) -> Option<EditValue> {
    let converted = match value {
        YamlValue::Null => EditValue::Scalar(ScalarValue::null()),
        YamlValue::Bool(flag) => EditValue::from(*flag),
        YamlValue::Number(number) if number.is_f64() => EditValue::from(number.as_f64()?),
        YamlValue::Number(number) => EditValue::from(number.as_i64()?),
        YamlValue::String(text) => EditValue::from(text.as_str()),
        YamlValue::Sequence(items) => EditValue::Sequence(
            items.iter().map(to_edit_value).collect::<Option<Vec<_>>>()?,
        ),
        YamlValue::Mapping(map) => EditValue::Mapping(
            map.iter()
                .map(|(key, value)| Some((key.as_str()?.to_string(), to_edit_value(value)?)))
                .collect::<Option<_>>()?,
        ),
        YamlValue::Tagged(_) => return None,
    };
    Some(converted)
}

/// Whether `text` parses to exactly `expected`, key order included.
fn describes(text: &str, expected: &YamlValue) -> bool {
    let Ok(reread) = serde_yaml::from_str::<YamlValue>(text) else {
        return false;
    };
    match (serde_yaml::to_string(&reread), serde_yaml::to_string(expected)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}
