//! Structure extraction
//!
//! Turns a loaded [`WordDocument`] into the [`StructureDocument`] snapshot,
//! the flat [`ContentBlock`] list, translation units and the ordered text
//! lines consumed by the section builder.

use std::path::Path;

use log::info;
use sha2::{Digest, Sha256};

use crate::config::ExtractConfig;
use crate::error::Result;

use super::cleanup::{language_hint, normalize_cell_text, normalize_text, truncate_chars};
use super::loader::load_document;
use super::models::*;

/// Extract the structure snapshot of a .docx file with default settings.
pub fn extract_structure(path: &Path) -> Result<StructureDocument> {
    extract_structure_with(path, &ExtractConfig::default())
}

pub fn extract_structure_with(path: &Path, config: &ExtractConfig) -> Result<StructureDocument> {
    let document = load_document(path)?;
    let structure = build_structure(&document, config)?;
    info!(
        "extracted {}: {} blocks, hash {}",
        structure.file_name, structure.block_count, structure.content_hash
    );
    Ok(structure)
}

/// Build the snapshot of an already loaded document.
pub fn build_structure(document: &WordDocument, config: &ExtractConfig) -> Result<StructureDocument> {
    let mut blocks = Vec::new();
    let mut paragraph_count = 0;
    let mut table_count = 0;

    for element in &document.body {
        match &element.content {
            BodyContent::Paragraph(paragraph) => {
                let text = normalize_text(&paragraph.text());
                if text.is_empty() {
                    continue;
                }
                paragraph_count += 1;
                blocks.push(StructureBlock::Paragraph {
                    index: element.block_index,
                    style: paragraph.style_name.clone(),
                    text,
                });
            }
            BodyContent::Table(table) => {
                table_count += 1;
                blocks.push(StructureBlock::Table {
                    index: element.block_index,
                    table_index: table.ordinal,
                    rows: table_rows(table),
                });
            }
            BodyContent::Other(_) => {}
        }
    }

    let sample: String = blocks
        .iter()
        .filter_map(|block| match block {
            StructureBlock::Paragraph { text, .. } => Some(text.as_str()),
            StructureBlock::Table { .. } => None,
        })
        .collect::<Vec<_>>()
        .join(" ");
    let sample = truncate_chars(&sample, config.language_sample_chars);

    let source_file = std::fs::canonicalize(&document.file_path)
        .unwrap_or_else(|_| document.file_path.clone());
    let file_name = document
        .file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(StructureDocument {
        source_file: source_file.display().to_string(),
        file_name,
        paragraph_count,
        table_count,
        block_count: blocks.len(),
        language_hint: language_hint(&sample).to_string(),
        content_hash: content_hash(&blocks)?,
        blocks,
    })
}

/// Normalized cell text for every grid position of a table.
fn table_rows(table: &Table) -> TableRows {
    (0..table.row_count())
        .map(|row| {
            let width = table.grid.rows.get(row).map(Vec::len).unwrap_or(0);
            (0..width)
                .map(|col| {
                    table
                        .cell_at(row, col)
                        .map(|cell| normalize_cell_text(&cell.text()))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}

/// Lowercase hex SHA-256 over the JSON serialization of the blocks.
pub fn content_hash(blocks: &[StructureBlock]) -> Result<String> {
    let serialized = serde_json::to_vec(blocks)?;
    Ok(format!("{:x}", Sha256::digest(&serialized)))
}

impl StructureDocument {
    /// Flat list of non-empty content blocks in reading order.
    ///
    /// Table cells are listed per grid position with their `t<n>:r<r>:c<c>` id.
    pub fn content_blocks(&self) -> Vec<ContentBlock> {
        let mut out = Vec::new();
        for block in &self.blocks {
            match block {
                StructureBlock::Paragraph { index, style, text } => out.push(ContentBlock {
                    id: BlockAddress::Paragraph { block_index: *index }.to_string(),
                    block_index: *index,
                    kind: BlockKind::Paragraph,
                    text: text.clone(),
                    style_name: style.clone(),
                    table_ordinal: None,
                    row_index: None,
                    col_index: None,
                }),
                StructureBlock::Table {
                    index,
                    table_index,
                    rows,
                } => {
                    for (r, row) in rows.iter().enumerate() {
                        for (c, text) in row.iter().enumerate() {
                            if text.is_empty() {
                                continue;
                            }
                            let address = BlockAddress::Cell {
                                table: *table_index,
                                row: r + 1,
                                col: c + 1,
                            };
                            out.push(ContentBlock {
                                id: address.to_string(),
                                block_index: *index,
                                kind: BlockKind::TableCell,
                                text: text.clone(),
                                style_name: String::new(),
                                table_ordinal: Some(*table_index),
                                row_index: Some(r + 1),
                                col_index: Some(c + 1),
                            });
                        }
                    }
                }
            }
        }
        out
    }

    /// One block per paragraph and one per non-empty table row (cells joined by ` | `).
    pub fn row_blocks(&self) -> Vec<ContentBlock> {
        let mut out = Vec::new();
        for block in &self.blocks {
            match block {
                StructureBlock::Paragraph { index, style, text } => out.push(ContentBlock {
                    id: BlockAddress::Paragraph { block_index: *index }.to_string(),
                    block_index: *index,
                    kind: BlockKind::Paragraph,
                    text: text.clone(),
                    style_name: style.clone(),
                    table_ordinal: None,
                    row_index: None,
                    col_index: None,
                }),
                StructureBlock::Table {
                    index,
                    table_index,
                    rows,
                } => {
                    for (r, row) in rows.iter().enumerate() {
                        let text = join_row(row);
                        if text.is_empty() {
                            continue;
                        }
                        out.push(ContentBlock {
                            id: format!("t{table_index}:r{}", r + 1),
                            block_index: *index,
                            kind: BlockKind::TableRow,
                            text,
                            style_name: String::new(),
                            table_ordinal: Some(*table_index),
                            row_index: Some(r + 1),
                            col_index: None,
                        });
                    }
                }
            }
        }
        out
    }

    /// Ordered text lines: paragraph texts and table rows.
    pub fn lines(&self) -> Vec<String> {
        self.row_blocks().into_iter().map(|block| block.text).collect()
    }
}

fn join_row(row: &[String]) -> String {
    row.iter()
        .filter(|cell| !cell.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Extract translation units from a .docx file.
pub fn extract_units(path: &Path, options: &UnitOptions) -> Result<UnitBatch> {
    let structure = extract_structure(path)?;
    Ok(units_from_structure(&structure, options))
}

pub fn units_from_structure(structure: &StructureDocument, options: &UnitOptions) -> UnitBatch {
    let mut units: Vec<TranslationUnit> = structure
        .content_blocks()
        .into_iter()
        .filter(|block| options.include_tables || block.kind == BlockKind::Paragraph)
        .map(|block| {
            let text = if options.max_chars_per_unit > 0 {
                truncate_chars(&block.text, options.max_chars_per_unit)
            } else {
                block.text
            };
            TranslationUnit {
                id: block.id,
                kind: block.kind,
                style: block.style_name,
                text,
            }
        })
        .collect();

    let mut truncated = false;
    if let Some(max_units) = options.max_units {
        if units.len() > max_units {
            units.truncate(max_units);
            truncated = true;
        }
    }

    UnitBatch {
        file: structure.file_name.clone(),
        unit_count: units.len(),
        truncated,
        max_units: options.max_units,
        units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_structure() -> StructureDocument {
        let blocks = vec![
            StructureBlock::Paragraph {
                index: 1,
                style: "Heading 1".to_string(),
                text: "1 Introduction".to_string(),
            },
            StructureBlock::Table {
                index: 3,
                table_index: 1,
                rows: vec![
                    vec!["Name".to_string(), "Limit".to_string()],
                    vec!["".to_string(), "".to_string()],
                    vec!["Cash".to_string(), "".to_string()],
                ],
            },
            StructureBlock::Paragraph {
                index: 4,
                style: "Normal".to_string(),
                text: "Closing words".to_string(),
            },
        ];
        StructureDocument {
            source_file: "/tmp/sample.docx".to_string(),
            file_name: "sample.docx".to_string(),
            paragraph_count: 2,
            table_count: 1,
            block_count: blocks.len(),
            language_hint: "en".to_string(),
            content_hash: content_hash(&blocks).unwrap(),
            blocks,
        }
    }

    #[test]
    fn test_content_blocks_use_stable_ids() {
        let ids: Vec<String> = sample_structure()
            .content_blocks()
            .into_iter()
            .map(|block| block.id)
            .collect();
        assert_eq!(ids, ["p:1", "t1:r1:c1", "t1:r1:c2", "t1:r3:c1", "p:4"]);
    }

    #[test]
    fn test_lines_flatten_table_rows() {
        assert_eq!(
            sample_structure().lines(),
            ["1 Introduction", "Name | Limit", "Cash", "Closing words"]
        );
    }

    #[test]
    fn test_units_respect_limits() {
        let structure = sample_structure();
        let batch = units_from_structure(
            &structure,
            &UnitOptions {
                include_tables: false,
                max_units: Some(1),
                max_chars_per_unit: 5,
            },
        );
        assert!(batch.truncated);
        assert_eq!(batch.unit_count, 1);
        assert_eq!(batch.units[0].id, "p:1");
        assert_eq!(batch.units[0].text, "1 Int");
    }

    #[test]
    fn test_content_hash_is_stable_and_content_sensitive() {
        let structure = sample_structure();
        assert_eq!(content_hash(&structure.blocks).unwrap(), structure.content_hash);
        assert_eq!(structure.content_hash.len(), 64);

        let mut changed = structure.blocks.clone();
        changed.pop();
        assert_ne!(content_hash(&changed).unwrap(), structure.content_hash);
    }
}
