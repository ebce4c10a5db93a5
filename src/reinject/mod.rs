//! Format-preserving reinjection
//!
//! Writes translated text back into a copy of the source document. Block
//! IDs are recomputed with the extractor's addressing, and new text is spread
//! over the existing runs so per-run formatting survives.

pub mod docx;
pub mod split;
pub mod xlsx;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

pub use docx::{ReinjectionReport, apply_translation_map};
pub use split::{cell_lines, proportional_split, split_segments};
pub use xlsx::{
    SheetEntry, SheetOptions, SheetReinjectionReport, apply_sheet_translation_map, apply_sheet_translation_map_with,
};

const ID_KEYS: [&str; 4] = ["id", "unit_id", "block_id", "cell_id"];

/// Block ID to replacement text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationMap {
    entries: HashMap<String, String>,
}

fn text_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

impl TranslationMap {
    /// Normalize translator output: an object `{id: text}` or a list of
    /// `{id|unit_id|block_id|cell_id, text}` items. Blank IDs are dropped.
    pub fn from_json(value: &Value) -> Self {
        let mut entries = HashMap::new();
        match value {
            Value::Object(object) => {
                for (key, text) in object {
                    let key = key.trim();
                    if !key.is_empty() {
                        entries.insert(key.to_string(), text_value(Some(text)));
                    }
                }
            }
            Value::Array(items) => {
                for item in items.iter().filter_map(Value::as_object) {
                    let id = ID_KEYS
                        .iter()
                        .filter_map(|key| item.get(*key))
                        .map(|id| text_value(Some(id)))
                        .find(|id| !id.trim().is_empty());
                    if let Some(id) = id {
                        entries.insert(id.trim().to_string(), text_value(item.get("text")));
                    }
                }
            }
            _ => {}
        }
        Self { entries }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Read a JSON translation map file, unwrapping an `{"ok", "data"}` envelope.
pub fn read_map_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(match value {
        Value::Object(mut object) if object.contains_key("ok") && object.contains_key("data") => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    })
}

/// Spreadsheet entries from a JSON list; malformed items are skipped.
pub fn sheet_entries(value: &Value) -> Vec<SheetEntry> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| SheetEntry::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Refuse to write over the document being read.
pub(crate) fn ensure_distinct(source: &Path, output: &Path) -> Result<()> {
    let source_path = fs::canonicalize(source)?;
    let same = match fs::canonicalize(output) {
        Ok(output_path) => output_path == source_path,
        Err(_) => false,
    };
    if same {
        return Err(Error::SourceOverwrite(source_path));
    }
    Ok(())
}
