//! File I/O for structure snapshots
//!
//! Snapshots are exchanged as JSON, either bare or wrapped in the CLI
//! envelope `{"ok": true, "data": {...}}`.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

use super::models::StructureDocument;

/// Read a structure snapshot from JSON, unwrapping the CLI envelope if present.
pub fn read_structure(path: &Path) -> Result<StructureDocument> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|e| Error::parse(path, e.into()))?;
    let payload = match value {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("blocks") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(payload).map_err(|e| Error::parse(path, e.into()))
}

/// Write any serializable value as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "source_file": "/tmp/a.docx", "file_name": "a.docx",
        "paragraph_count": 1, "table_count": 0, "block_count": 1,
        "language_hint": "en", "content_hash": "00",
        "blocks": [{"kind": "paragraph", "index": 1, "style": "Normal", "text": "Hi"}]
    }"#;

    #[test]
    fn test_reads_bare_and_wrapped_snapshots() {
        let dir = tempfile::tempdir().unwrap();

        let bare = dir.path().join("bare.json");
        fs::write(&bare, SNAPSHOT).unwrap();
        let wrapped = dir.path().join("wrapped.json");
        fs::write(&wrapped, format!(r#"{{"ok": true, "data": {SNAPSHOT}}}"#)).unwrap();

        let a = read_structure(&bare).unwrap();
        let b = read_structure(&wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.lines(), ["Hi"]);
    }

    #[test]
    fn test_missing_snapshot() {
        let result = read_structure(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(Error::MissingFile(_))));
    }
}
