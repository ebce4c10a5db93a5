//! Office Open XML plumbing shared by the Word and spreadsheet readers
//!
//! This module provides the ZIP [`Package`] container and the owned XML tree
//! used by every subsystem, plus file-kind detection.

pub mod package;
pub mod xml;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use package::Package;
pub use xml::{XmlDocument, XmlElement, XmlNode};

use crate::error::{Error, Result};
use package::{DOCUMENT_PART, WORKBOOK_PART};

/// The two document families this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Tree-structured word-processing document (.docx)
    Document,
    /// Grid-structured spreadsheet (.xlsx)
    Grid,
}

impl FileKind {
    /// Select the kind from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = extension_of(path);
        match extension.as_str() {
            "docx" => Ok(FileKind::Document),
            "xlsx" => Ok(FileKind::Grid),
            _ => Err(Error::UnsupportedFormat(format!(".{extension}"))),
        }
    }

    /// Short format label used in reports (`docx` / `xlsx`).
    pub fn format_type(self) -> &'static str {
        match self {
            FileKind::Document => "docx",
            FileKind::Grid => "xlsx",
        }
    }

    fn main_part(self) -> &'static str {
        match self {
            FileKind::Document => DOCUMENT_PART,
            FileKind::Grid => WORKBOOK_PART,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_type())
    }
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Validates that an opened package really is of the expected kind
pub(crate) fn ensure_kind(package: &Package, expected: FileKind) -> Result<()> {
    if package.has_part(expected.main_part()) {
        return Ok(());
    }

    let other = match expected {
        FileKind::Document => FileKind::Grid,
        FileKind::Grid => FileKind::Document,
    };
    if package.has_part(other.main_part()) {
        return Err(Error::InvalidPackage(format!(
            "this appears to be a .{other} file, expected .{expected}"
        )));
    }

    Err(Error::InvalidPackage(format!(
        "invalid .{expected} file: missing {}",
        expected.main_part()
    )))
}

/// Open `path` as a package of the given kind, attributing failures to the path.
pub(crate) fn open_package(path: &Path, expected: FileKind) -> Result<Package> {
    let package = Package::open(path).map_err(|e| Error::parse(path, e))?;
    ensure_kind(&package, expected).map_err(|e| Error::parse(path, e))?;
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(
            FileKind::from_path(Path::new("a/b/report.DOCX")).unwrap(),
            FileKind::Document
        );
        assert_eq!(
            FileKind::from_path(Path::new("book.xlsx")).unwrap(),
            FileKind::Grid
        );
        assert!(matches!(
            FileKind::from_path(Path::new("notes.txt")),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
