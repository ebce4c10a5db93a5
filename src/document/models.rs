//! Core data structures for document representation
//!
//! This module defines the loaded Word document model (paragraphs, runs,
//! tables, sections) together with the addressable block types and the
//! structure snapshot written by the extractor.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::parsing::table::TableGrid;

// Type aliases for convenience
pub type TableRows = Vec<Vec<String>>;

/// A Word document loaded from `word/document.xml`.
#[derive(Debug, Clone)]
pub struct WordDocument {
    pub file_path: PathBuf,
    pub body: Vec<BodyElement>,
    pub sections: Vec<SectionProperties>,
}

/// One element child of the document body, in document order.
#[derive(Debug, Clone)]
pub struct BodyElement {
    /// 1-based position among all element children of the body
    pub block_index: usize,
    pub content: BodyContent,
}

#[derive(Debug, Clone)]
pub enum BodyContent {
    Paragraph(Paragraph),
    Table(Table),
    /// Section properties, bookmarks, content controls and the like
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub style_name: String,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub properties: RunProperties,
}

/// Directly applied run formatting; `None` means inherited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProperties {
    pub font_name: Option<String>,
    /// Size in points
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Table {
    /// 1-based ordinal among body tables
    pub ordinal: usize,
    /// Cells in markup order (`w:tr` / `w:tc`)
    pub rows: Vec<Vec<TableCell>>,
    pub grid: TableGrid,
}

#[derive(Debug, Clone, Default)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    pub has_borders: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionProperties {
    pub has_header: bool,
    pub has_footer: bool,
}

/// Address of a translatable block.
///
/// Paragraphs are addressed by their body position (`p:<i>`), table cells by
/// table ordinal and grid coordinates (`t<n>:r<r>:c<c>`), all 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockAddress {
    Paragraph { block_index: usize },
    Cell { table: usize, row: usize, col: usize },
}

impl fmt::Display for BlockAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockAddress::Paragraph { block_index } => write!(f, "p:{block_index}"),
            BlockAddress::Cell { table, row, col } => write!(f, "t{table}:r{row}:c{col}"),
        }
    }
}

impl FromStr for BlockAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid block id: {s}");
        let number = |part: Option<&str>, prefix: char| -> Result<usize, String> {
            part.and_then(|p| p.strip_prefix(prefix))
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .ok_or_else(invalid)
        };

        if let Some(index) = s.strip_prefix("p:") {
            let block_index = index
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(invalid)?;
            return Ok(BlockAddress::Paragraph { block_index });
        }

        let mut parts = s.split(':');
        let table = number(parts.next(), 't')?;
        let row = number(parts.next(), 'r')?;
        let col = number(parts.next(), 'c')?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(BlockAddress::Cell { table, row, col })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    TableCell,
    TableRow,
}

/// A text-bearing block of a document, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: String,
    pub block_index: usize,
    pub kind: BlockKind,
    pub text: String,
    pub style_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_ordinal: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_index: Option<usize>,
}

/// Structure snapshot of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDocument {
    pub source_file: String,
    pub file_name: String,
    pub paragraph_count: usize,
    pub table_count: usize,
    pub block_count: usize,
    pub language_hint: String,
    /// Lowercase hex SHA-256 of the serialized `blocks`
    pub content_hash: String,
    pub blocks: Vec<StructureBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureBlock {
    Paragraph {
        index: usize,
        style: String,
        text: String,
    },
    Table {
        index: usize,
        table_index: usize,
        /// Normalized cell text per grid position
        rows: TableRows,
    },
}

/// A translation unit handed to a translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub id: String,
    pub kind: BlockKind,
    pub style: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitBatch {
    pub file: String,
    pub unit_count: usize,
    pub truncated: bool,
    pub max_units: Option<usize>,
    pub units: Vec<TranslationUnit>,
}

/// Options for [`extract_units`](super::extract_units).
#[derive(Debug, Clone)]
pub struct UnitOptions {
    pub include_tables: bool,
    pub max_units: Option<usize>,
    /// Longer texts are cut to this many characters (0 disables)
    pub max_chars_per_unit: usize,
}

impl Default for UnitOptions {
    fn default() -> Self {
        Self {
            include_tables: true,
            max_units: None,
            max_chars_per_unit: 800,
        }
    }
}

impl Paragraph {
    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

impl TableCell {
    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.grid.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.grid.column_count
    }

    /// The cell covering grid position (`row`, `col`), 0-based.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&TableCell> {
        let position = self.grid.position(row, col)?;
        self.rows.get(position.row)?.get(position.cell)
    }
}

impl WordDocument {
    /// Body paragraphs paired with their block index.
    pub fn indexed_paragraphs(&self) -> impl Iterator<Item = (usize, &Paragraph)> {
        self.body.iter().filter_map(|element| match &element.content {
            BodyContent::Paragraph(paragraph) => Some((element.block_index, paragraph)),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|element| match &element.content {
            BodyContent::Table(table) => Some(table),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_address_display_and_parse() {
        let paragraph: BlockAddress = "p:7".parse().unwrap();
        assert_eq!(paragraph, BlockAddress::Paragraph { block_index: 7 });
        assert_eq!(paragraph.to_string(), "p:7");

        let cell: BlockAddress = "t2:r3:c1".parse().unwrap();
        assert_eq!(
            cell,
            BlockAddress::Cell {
                table: 2,
                row: 3,
                col: 1
            }
        );
        assert_eq!(cell.to_string(), "t2:r3:c1");
    }

    #[test]
    fn test_block_address_rejects_malformed_ids() {
        for bad in ["p:0", "p:x", "t1:r2", "t1:r2:c3:x", "x1:r1:c1", "t1:r0:c1", ""] {
            assert!(bad.parse::<BlockAddress>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_structure_block_serializes_with_kind_tag() {
        let block = StructureBlock::Paragraph {
            index: 1,
            style: "Normal".to_string(),
            text: "Hello".to_string(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["kind"], "paragraph");
        assert_eq!(json["style"], "Normal");
    }
}
