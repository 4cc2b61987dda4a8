//! Request batches
//!
//! A request is the raw `key=value` text given for one operation. This module
//! splits it, parses the key path and coerces the value, then runs every
//! request of a batch through the [`Mutator`] in order.

use log::{debug, info};
use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};
use crate::literal::{is_literal, parse_literal};
use crate::mutation::Mutator;
use crate::operation::Operation;
use crate::path::{parse_key_path, PathSegment};
use crate::value::{coerce, coerce_scalar};

/// One parsed request
#[derive(Clone, Debug, PartialEq)]
pub struct EditRequest {
    /// The key as written, escapes intact
    pub key: String,
    pub path: Vec<PathSegment>,
    /// Coerced value; `None` for removals
    pub value: Option<YamlValue>,
}

impl EditRequest {
    /// Split and parse a raw request for `operation`.
    ///
    /// Removal requests take everything before the first `=` as the key and
    /// ignore the rest. All other requests must contain `=`; the value is the
    /// text after the first one.
    pub fn parse(operation: Operation, raw: &str) -> Result<Self> {
        if operation.is_removal() {
            let key = raw.split_once('=').map_or(raw, |(key, _)| key);
            return Ok(Self {
                key: key.to_string(),
                path: parse_key_path(key),
                value: None,
            });
        }

        let (key, text) = raw.split_once('=').ok_or_else(|| Error::MalformedRequest {
            request: raw.to_string(),
            message: "expected 'key=value'".to_string(),
        })?;

        let value = if is_literal(text) {
            coerce(&parse_literal(text)?)
        } else {
            coerce_scalar(text)
        };

        Ok(Self {
            key: key.to_string(),
            path: parse_key_path(key),
            value: Some(value),
        })
    }
}

/// Apply every request of one batch, in order.
///
/// Returns whether any request changed the document. The first failing
/// request aborts the batch; edits made by the requests before it stay in
/// `document`.
pub fn apply_batch(
    document: &mut YamlValue,
    operation: Operation,
    requests: &[String],
    ignore_not_found: bool,
) -> Result<bool> {
    if requests.is_empty() {
        return Ok(false);
    }
    info!("{}: {}", operation.describe(), requests.join(" "));

    let mut changed = false;
    for raw in requests {
        let request = EditRequest::parse(operation, raw)?;
        debug!("Applying {} request on '{}'", operation, request.key);
        let mutator = Mutator::new(operation, request.value.as_ref(), ignore_not_found);
        changed |= mutator.apply(document, &request.path)?;
    }

    Ok(changed)
}
