//! Delta engine
//!
//! Aligns the flattened rows of two document versions and classifies every
//! non-equal span as added, removed or modified, plus a short human-readable
//! summary grouped by section.

pub mod lcs;

use std::path::Path;

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::DeltaConfig;
use crate::document::cleanup::truncate_chars;
use crate::document::{BlockKind, StructureDocument, extract_structure, read_structure};
use crate::error::{Error, Result};
use crate::ooxml::extension_of;

pub use lcs::{OpTag, Opcode, opcodes};

static SECTION_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(section|domain|heading|القسم|المجال|الغرض|التعليمات)").unwrap()
});

const GENERAL_SECTION: &str = "General";

/// One comparable row of a document version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRow {
    pub kind: BlockKind,
    pub text: String,
    /// 1-based table row for `table_row` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl DeltaRow {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            row: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaItem {
    /// 1-based position in its version
    pub index: usize,
    pub text: String,
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedItem {
    /// Replaced slice `[i1, i2)` of the first version
    pub v1_range: [usize; 2],
    /// Replacing slice `[j1, j2)` of the second version
    pub v2_range: [usize; 2],
    pub before: Vec<String>,
    pub after: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeltaRecord {
    Added(DeltaItem),
    Removed(DeltaItem),
    Modified(ModifiedItem),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionChanges {
    pub section: String,
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaStats {
    pub added_count: usize,
    pub removed_count: usize,
    pub modified_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaPack {
    pub job_id: String,
    pub added: Vec<DeltaItem>,
    pub removed: Vec<DeltaItem>,
    pub modified: Vec<ModifiedItem>,
    pub summary_by_section: Vec<SectionChanges>,
    pub stats: DeltaStats,
}

/// Flatten a structure snapshot into paragraph and table-row entries.
pub fn flatten_rows(structure: &StructureDocument) -> Vec<DeltaRow> {
    structure
        .row_blocks()
        .into_iter()
        .map(|block| DeltaRow {
            kind: block.kind,
            text: block.text,
            row: match block.kind {
                BlockKind::TableRow => block.row_index,
                _ => None,
            },
        })
        .collect()
}

/// Classify the differences between two row sequences.
///
/// Each `replace` span becomes exactly one [`DeltaRecord::Modified`].
pub fn diff_rows(v1: &[DeltaRow], v2: &[DeltaRow]) -> Vec<DeltaRecord> {
    let a: Vec<&str> = v1.iter().map(|row| row.text.as_str()).collect();
    let b: Vec<&str> = v2.iter().map(|row| row.text.as_str()).collect();

    let item = |rows: &[DeltaRow], index: usize| DeltaItem {
        index: index + 1,
        text: rows[index].text.clone(),
        kind: rows[index].kind,
    };

    let mut records = Vec::new();
    for op in opcodes(&a, &b) {
        match op.tag {
            OpTag::Equal => {}
            OpTag::Insert => {
                records.extend((op.j1..op.j2).map(|j| DeltaRecord::Added(item(v2, j))));
            }
            OpTag::Delete => {
                records.extend((op.i1..op.i2).map(|i| DeltaRecord::Removed(item(v1, i))));
            }
            OpTag::Replace => records.push(DeltaRecord::Modified(ModifiedItem {
                v1_range: [op.i1, op.i2],
                v2_range: [op.j1, op.j2],
                before: a[op.i1..op.i2].iter().map(|s| s.to_string()).collect(),
                after: b[op.j1..op.j2].iter().map(|s| s.to_string()).collect(),
            })),
        }
    }
    records
}

fn section_label(text: Option<&str>, config: &DeltaConfig) -> String {
    match text {
        Some(text) if SECTION_HINT.is_match(text) => truncate_chars(text, config.label_chars),
        _ => GENERAL_SECTION.to_string(),
    }
}

/// Build the delta pack for a job.
pub fn build_delta(job_id: &str, v1: &[DeltaRow], v2: &[DeltaRow], config: &DeltaConfig) -> DeltaPack {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut modified = Vec::new();
    for record in diff_rows(v1, v2) {
        match record {
            DeltaRecord::Added(item) => added.push(item),
            DeltaRecord::Removed(item) => removed.push(item),
            DeltaRecord::Modified(item) => modified.push(item),
        }
    }

    let mut summary_by_section: Vec<SectionChanges> = added
        .iter()
        .take(config.summary_limit)
        .map(|item| SectionChanges {
            section: section_label(Some(&item.text), config),
            changes: vec![format!(
                "Added: {}",
                truncate_chars(&item.text, config.change_chars)
            )],
        })
        .collect();
    summary_by_section.extend(modified.iter().take(config.summary_limit).map(|item| {
        SectionChanges {
            section: section_label(item.after.first().map(String::as_str), config),
            changes: vec![format!(
                "Modified block V1[{}:{}] -> V2[{}:{}]",
                item.v1_range[0], item.v1_range[1], item.v2_range[0], item.v2_range[1]
            )],
        }
    }));

    let stats = DeltaStats {
        added_count: added.len(),
        removed_count: removed.len(),
        modified_count: modified.len(),
    };
    info!(
        "delta {job_id}: {} added, {} removed, {} modified",
        stats.added_count, stats.removed_count, stats.modified_count
    );

    DeltaPack {
        job_id: job_id.to_string(),
        added,
        removed,
        modified,
        summary_by_section,
        stats,
    }
}

/// Load the rows of one version: a .docx is extracted, anything else is read
/// as a structure snapshot.
pub fn load_rows(path: &Path) -> Result<Vec<DeltaRow>> {
    let structure = match extension_of(path).as_str() {
        "docx" => extract_structure(path)?,
        "xlsx" => return Err(Error::UnsupportedFormat(".xlsx".to_string())),
        _ => read_structure(path)?,
    };
    Ok(flatten_rows(&structure))
}

/// Compare two versions given as .docx files or structure snapshots.
pub fn delta_from_files(job_id: &str, v1: &Path, v2: &Path, config: &DeltaConfig) -> Result<DeltaPack> {
    let v1_rows = load_rows(v1)?;
    let v2_rows = load_rows(v2)?;
    Ok(build_delta(job_id, &v1_rows, &v2_rows, config))
}
