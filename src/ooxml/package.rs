//! ZIP package access
//!
//! Every entry is read into memory in archive order so a package can be
//! rewritten with only the touched parts changed. Untouched entries are
//! copied from the source archive without being recompressed.

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::xml::XmlDocument;
use crate::error::{Error, Result};

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    is_dir: bool,
    data: Vec<u8>,
    /// Index in the source archive while the entry is unchanged.
    source_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Package {
    source: Vec<u8>,
    entries: Vec<Entry>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let package = Self::from_bytes(&std::fs::read(path)?)?;
        debug!(
            "opened package {} ({} entries)",
            path.display(),
            package.entries.len()
        );
        Ok(package)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)?;
            }
            entries.push(Entry {
                name,
                is_dir,
                data,
                source_index: Some(index),
            });
        }
        Ok(Self {
            source: bytes.to_vec(),
            entries,
        })
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.data.as_slice())
    }

    pub fn part_string(&self, name: &str) -> Option<String> {
        self.part(name)
            .map(|bytes| String::from_utf8_lossy(strip_bom(bytes)).into_owned())
    }

    /// Parse a part as XML; `Ok(None)` when the part is absent.
    pub fn xml_part(&self, name: &str) -> Result<Option<XmlDocument>> {
        match self.part_string(name) {
            Some(xml) => Ok(Some(XmlDocument::parse(&xml)?)),
            None => Ok(None),
        }
    }

    /// Parse a part that must exist.
    pub fn required_xml_part(&self, name: &str) -> Result<XmlDocument> {
        self.xml_part(name)?
            .ok_or_else(|| Error::InvalidPackage(format!("missing part {name}")))
    }

    /// Replace (or append) a part's bytes.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.data = data;
                entry.source_index = None;
            }
            None => self.entries.push(Entry {
                name: name.to_string(),
                is_dir: false,
                data,
                source_index: None,
            }),
        }
    }

    pub fn set_xml_part(&mut self, name: &str, document: &XmlDocument) {
        self.set_part(name, document.to_xml().into_bytes());
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut source = ZipArchive::new(Cursor::new(self.source.as_slice()))?;
        let file = File::create(path)?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            if let Some(index) = entry.source_index {
                writer.raw_copy_file(source.by_index_raw(index)?)?;
            } else if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
            } else {
                writer.start_file(entry.name.as_str(), options)?;
                writer.write_all(&entry.data)?;
            }
        }
        writer.finish()?;
        debug!("wrote package {}", path.display());
        Ok(())
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}
