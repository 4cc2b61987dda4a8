//! One edit invocation from start to finish
//!
//! [`apply_edits`] runs the six batches of an [`EditSet`] over a document in
//! the fixed order of [`Operation::APPLY_ORDER`], then merges in the optional
//! secondary document. [`Relayer`] wraps that with loading the document from
//! disk and deciding whether to write it back. Written documents keep the
//! comments and quoting of every entry the edits did not touch.

use log::{info, warn};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::batch::apply_batch;
use crate::document::{self, SourceDocument};
use crate::error::Result;
use crate::merge::deep_merge;
use crate::operation::Operation;

/// Every request of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditSet {
    pub remove: Vec<String>,
    pub remove_list_element: Vec<String>,
    pub update: Vec<String>,
    pub add: Vec<String>,
    pub extend_list: Vec<String>,
    pub insert: Vec<String>,
    /// Document to deep-merge in after all batches
    pub merge_from: Option<PathBuf>,
    /// Treat missing targets of removals as already removed
    pub ignore_not_found: bool,
}

impl EditSet {
    /// The raw requests of one batch
    pub fn requests(&self, operation: Operation) -> &[String] {
        match operation {
            Operation::Remove => &self.remove,
            Operation::RemoveListElement => &self.remove_list_element,
            Operation::Update => &self.update,
            Operation::Add => &self.add,
            Operation::ExtendList => &self.extend_list,
            Operation::InsertToList => &self.insert,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.merge_from.is_none()
            && Operation::APPLY_ORDER
                .iter()
                .all(|op| self.requests(*op).is_empty())
    }
}

/// Apply every batch of `edits`, then merge in `merge_document` if given.
///
/// Returns whether the document changed. A merge always counts as a change.
pub fn apply_edits(
    document: &mut YamlValue,
    edits: &EditSet,
    merge_document: Option<&YamlValue>,
) -> Result<bool> {
    let mut changed = false;
    for operation in Operation::APPLY_ORDER {
        changed |= apply_batch(
            document,
            operation,
            edits.requests(operation),
            edits.ignore_not_found,
        )?;
    }

    if let Some(secondary) = merge_document {
        info!("Merging secondary document");
        deep_merge(document, secondary);
        changed = true;
    }

    Ok(changed)
}

/// What an invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// The file that was edited, after extension fallback
    pub config_path: PathBuf,
    pub changed: bool,
}

/// Edits one configuration file in place
#[derive(Debug, Clone)]
pub struct Relayer {
    config_path: PathBuf,
    debug: bool,
}

impl Relayer {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            debug: false,
        }
    }

    /// Dump the result to stdout instead of writing the file.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn relay(&self, edits: &EditSet) -> Result<RelayOutcome> {
        self.relay_to(edits, &mut io::stdout().lock())
    }

    /// Like [`Relayer::relay`], with debug output going to `debug_sink`.
    pub fn relay_to<W: Write>(&self, edits: &EditSet, debug_sink: &mut W) -> Result<RelayOutcome> {
        let config_path = document::resolve_config_path(&self.config_path)?;
        let source = SourceDocument::read(&config_path)?;
        let mut tree = source.tree().clone();
        let merge_document = edits
            .merge_from
            .as_deref()
            .map(document::load)
            .transpose()?;

        let changed = apply_edits(&mut tree, edits, merge_document.as_ref())?;

        if !changed {
            warn!("No changes to configuration, not overwriting file");
        } else if self.debug {
            source.dump(&tree, debug_sink)?;
        } else {
            source.save(&tree, &config_path)?;
            info!("Configuration written to {}", config_path.display());
        }

        Ok(RelayOutcome {
            config_path,
            changed,
        })
    }
}
