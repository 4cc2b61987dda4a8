//! Loading and dumping configuration documents
//!
//! Documents are YAML (JSON parses as YAML too). A configuration path ending in
//! `.yml` or `.yaml` also matches the file with the other extension, so a
//! caller may name either spelling.
//!
//! A [`SourceDocument`] keeps the text a document was read from, so an edited
//! tree can be written back with the formatting of everything it left alone.

use log::debug;
use serde_yaml::{Mapping, Value as YamlValue};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::preserve::splice_changes;

/// Candidate paths for a configuration path, most preferred first.
pub fn candidate_paths(path: &Path) -> Vec<PathBuf> {
    let alternate = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yml") => Some(path.with_extension("yaml")),
        Some("yaml") => Some(path.with_extension("yml")),
        _ => None,
    };

    std::iter::once(path.to_path_buf()).chain(alternate).collect()
}

/// Find the existing file behind a configuration path.
pub fn resolve_config_path(path: &Path) -> Result<PathBuf> {
    candidate_paths(path)
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::ConfigNotFound {
            path: path.display().to_string(),
        })
}

/// Parse document text; an empty or null document is an empty map.
pub fn parse_document(content: &str) -> Result<YamlValue> {
    let is_blank = content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'));
    if is_blank {
        return Ok(YamlValue::Mapping(Mapping::new()));
    }

    match serde_yaml::from_str(content)? {
        YamlValue::Null => Ok(YamlValue::Mapping(Mapping::new())),
        document => Ok(document),
    }
}

/// Resolve and load the document at `path`.
pub fn load(path: &Path) -> Result<YamlValue> {
    let resolved = resolve_config_path(path)?;
    debug!("Loading document {}", resolved.display());
    let content = fs::read_to_string(&resolved)?;
    parse_document(&content)
}

/// A parsed document and the text it came from
#[derive(Debug, Clone)]
pub struct SourceDocument {
    text: String,
    tree: YamlValue,
}

impl SourceDocument {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let tree = parse_document(&text)?;
        Ok(Self { text, tree })
    }

    /// Read the file at `path` as is, without extension fallback.
    pub fn read(path: &Path) -> Result<Self> {
        debug!("Loading document {}", path.display());
        Self::parse(fs::read_to_string(path)?)
    }

    pub fn tree(&self) -> &YamlValue {
        &self.tree
    }

    /// Serialize `edited`, keeping the source formatting where possible.
    pub fn render(&self, edited: &YamlValue) -> Result<String> {
        match splice_changes(&self.text, &self.tree, edited) {
            Some(text) => Ok(text),
            None => {
                debug!("Writing a plain dump of the document");
                to_yaml_string(edited)
            }
        }
    }

    /// Write `edited` to `path`.
    pub fn save(&self, edited: &YamlValue, path: &Path) -> Result<()> {
        debug!("Writing document {}", path.display());
        fs::write(path, self.render(edited)?)?;
        Ok(())
    }

    /// Write `edited` to a stream.
    pub fn dump<W: Write>(&self, edited: &YamlValue, writer: &mut W) -> Result<()> {
        writer.write_all(self.render(edited)?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Serialize a document, always ending in a newline.
pub fn to_yaml_string(document: &YamlValue) -> Result<String> {
    let mut text = serde_yaml::to_string(document)?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}
