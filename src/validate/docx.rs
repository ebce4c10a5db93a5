//! Word document fidelity checks
//!
//! Compares paragraphs (count, style, run fonts), tables (count, dimensions,
//! merge spans, first-cell borders) and per-section header/footer presence.

use std::path::Path;

use log::warn;

use crate::config::ValidationConfig;
use crate::document::{BlockAddress, Paragraph, Run, Table, TableCell, WordDocument, load_document};
use crate::error::{Error, Result};
use crate::ooxml::FileKind;

use super::Validator;
use super::issue::{Category, Issue, ValidationResult, read_failure};

pub struct DocumentValidator {
    config: ValidationConfig,
}

impl DocumentValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Run every enabled comparison between two loaded documents.
    pub fn compare(&self, original: &WordDocument, translated: &WordDocument, result: &mut ValidationResult) {
        if self.config.docx_check_fonts || self.config.docx_check_styles {
            self.compare_paragraphs(original, translated, result);
        }
        if self.config.docx_check_tables {
            self.compare_tables(original, translated, result);
        }
        if self.config.docx_check_headers_footers {
            compare_headers_footers(original, translated, result);
        }
    }

    fn compare_paragraphs(&self, original: &WordDocument, translated: &WordDocument, result: &mut ValidationResult) {
        let orig_paras = non_empty_paragraphs(original);
        let trans_paras = non_empty_paragraphs(translated);

        let (o, t) = (orig_paras.len(), trans_paras.len());
        result.record((o != t).then(|| {
            Issue::warning(Category::Paragraph, "document", "paragraph_count")
                .expected(format!("{o} paragraphs"))
                .actual(format!("{t} paragraphs"))
                .hint(format!("Original has {o} paragraphs, translated has {t}"))
        }));

        for ((block_index, orig), (_, trans)) in orig_paras.iter().zip(&trans_paras) {
            let location = BlockAddress::Paragraph {
                block_index: *block_index,
            }
            .to_string();

            if self.config.docx_check_styles {
                result.record((orig.style_name != trans.style_name).then(|| {
                    Issue::warning(Category::Style, location.as_str(), "paragraph")
                        .expected(format!("style=\"{}\"", orig.style_name))
                        .actual(format!("style=\"{}\"", trans.style_name))
                        .hint(format!(
                            "Apply style \"{}\" to paragraph {block_index}",
                            orig.style_name
                        ))
                }));
            }

            if self.config.docx_check_fonts {
                for (j, (orig_run, trans_run)) in orig.runs.iter().zip(&trans.runs).enumerate() {
                    let run_location = format!("{location}:run{}", j + 1);
                    self.compare_run(&run_location, j + 1, *block_index, orig_run, trans_run, result);
                }
            }
        }
    }

    fn compare_run(
        &self,
        location: &str,
        run_number: usize,
        paragraph: usize,
        orig: &Run,
        trans: &Run,
        result: &mut ValidationResult,
    ) {
        let (o, t) = (&orig.properties, &trans.properties);

        if let (Some(orig_font), Some(trans_font)) = (&o.font_name, &t.font_name) {
            result.record((orig_font != trans_font).then(|| {
                Issue::warning(Category::Font, location, "run")
                    .expected(format!("font=\"{orig_font}\""))
                    .actual(format!("font=\"{trans_font}\""))
                    .hint(format!(
                        "Set font to {orig_font} for run {run_number} in paragraph {paragraph}"
                    ))
            }));
        }

        if let (Some(orig_size), Some(trans_size)) = (o.font_size, t.font_size) {
            let delta = self.config.docx_font_size_delta;
            result.record(((orig_size - trans_size).abs() > delta).then(|| {
                Issue::info(Category::Font, location, "run")
                    .expected(format!("size={orig_size}pt"))
                    .actual(format!("size={trans_size}pt"))
                    .hint(format!("Adjust font size to {orig_size}pt (within {delta}pt tolerance)"))
            }));
        }

        let flags = [
            ("bold", o.bold, t.bold),
            ("italic", o.italic, t.italic),
            ("underline", o.underline, t.underline),
        ];
        let mut compared = false;
        let mut expected = Vec::new();
        let mut actual = Vec::new();
        for (name, orig_flag, trans_flag) in flags {
            let (Some(orig_flag), Some(trans_flag)) = (orig_flag, trans_flag) else {
                continue;
            };
            compared = true;
            if orig_flag != trans_flag {
                expected.push(format!("{name}={orig_flag}"));
                actual.push(format!("{name}={trans_flag}"));
            }
        }
        if compared {
            result.record((!expected.is_empty()).then(|| {
                Issue::info(Category::Font, location, "run")
                    .expected(expected.join(" "))
                    .actual(actual.join(" "))
                    .hint(format!(
                        "Restore {} on run {run_number} in paragraph {paragraph}",
                        expected.join(", ")
                    ))
            }));
        }
    }

    fn compare_tables(&self, original: &WordDocument, translated: &WordDocument, result: &mut ValidationResult) {
        let orig_tables: Vec<&Table> = original.tables().collect();
        let trans_tables: Vec<&Table> = translated.tables().collect();

        let (o, t) = (orig_tables.len(), trans_tables.len());
        result.record((o != t).then(|| {
            Issue::critical(Category::Table, "document", "table_count")
                .expected(format!("{o} tables"))
                .actual(format!("{t} tables"))
                .hint(format!("Original has {o} tables, translated has {t}"))
        }));

        for (orig, trans) in orig_tables.iter().zip(&trans_tables) {
            let location = format!("table:{}", orig.ordinal);
            let orig_shape = (orig.row_count(), orig.column_count());
            let trans_shape = (trans.row_count(), trans.column_count());
            result.record((orig_shape != trans_shape).then(|| {
                Issue::critical(Category::Table, location.as_str(), "table_dimensions")
                    .expected(format!("{}x{}", orig_shape.0, orig_shape.1))
                    .actual(format!("{}x{}", trans_shape.0, trans_shape.1))
                    .hint(format!(
                        "Restore table {} to {} rows x {} columns",
                        orig.ordinal, orig_shape.0, orig_shape.1
                    ))
            }));

            if let Err(e) = compare_table_cells(&location, orig, trans, result) {
                warn!("{location}: {e}");
                result.add_issue(
                    Issue::warning(Category::Table, location.as_str(), "table_structure")
                        .expected("valid table structure")
                        .actual(format!("comparison error: {e}"))
                        .hint("Manual review of table structure recommended"),
                );
            }
        }
    }
}

/// Body paragraphs with visible text, keyed by block index.
fn non_empty_paragraphs(doc: &WordDocument) -> Vec<(usize, &Paragraph)> {
    doc.indexed_paragraphs()
        .filter(|(_, paragraph)| !paragraph.text().trim().is_empty())
        .collect()
}

/// Merge spans per grid position and border presence on the first cell.
fn compare_table_cells(
    location: &str,
    orig: &Table,
    trans: &Table,
    result: &mut ValidationResult,
) -> Result<()> {
    let orig_spans = orig.grid.span_counts();
    let trans_spans = trans.grid.span_counts();

    for (r, (orig_row, trans_row)) in orig.grid.rows.iter().zip(&trans.grid.rows).enumerate() {
        for (c, (orig_slot, trans_slot)) in orig_row.iter().zip(trans_row).enumerate() {
            let cell_location = format!("{location}:r{}:c{}", r + 1, c + 1);
            let orig_span = orig_slot.and_then(|p| orig_spans.get(&p).copied()).unwrap_or(0);
            let trans_span = trans_slot.and_then(|p| trans_spans.get(&p).copied()).unwrap_or(0);
            result.record((orig_span != trans_span).then(|| {
                Issue::critical(Category::TableBorders, cell_location.as_str(), "merged_cell")
                    .expected(format!("merge span={orig_span}"))
                    .actual(format!("merge span={trans_span}"))
                    .hint(format!(
                        "Check merge status for cell {cell_location} (original spans {orig_span} cells)"
                    ))
            }));
        }
    }

    if orig.row_count() == 0 || trans.row_count() == 0 {
        return Ok(());
    }
    fn first_cell(table: &Table) -> Result<&TableCell> {
        table.cell_at(0, 0).ok_or_else(|| Error::Comparison {
            check: "table_structure",
            reason: format!("table {} has no cell at r1:c1", table.ordinal),
        })
    }
    let orig_borders = first_cell(orig)?.has_borders;
    let trans_borders = first_cell(trans)?.has_borders;
    let describe = |present: bool| if present { "borders present" } else { "no borders" };
    let cell_location = format!("{location}:r1:c1");
    result.record((orig_borders != trans_borders).then(|| {
        Issue::warning(Category::TableBorders, cell_location.as_str(), "cell_borders")
            .expected(describe(orig_borders))
            .actual(describe(trans_borders))
            .hint(format!("Restore table borders to match original for {cell_location}"))
    }));

    Ok(())
}

fn compare_headers_footers(original: &WordDocument, translated: &WordDocument, result: &mut ValidationResult) {
    let (o, t) = (original.sections.len(), translated.sections.len());
    result.record((o != t).then(|| {
        Issue::info(Category::HeaderFooter, "document", "section_count")
            .expected(format!("{o} sections"))
            .actual(format!("{t} sections"))
            .hint("Section count differs between documents")
    }));

    for (i, (orig, trans)) in original.sections.iter().zip(&translated.sections).enumerate() {
        let location = format!("section:{}", i + 1);
        for (part, orig_present, trans_present) in [
            ("header", orig.has_header, trans.has_header),
            ("footer", orig.has_footer, trans.has_footer),
        ] {
            let describe = |present: bool| {
                if present {
                    format!("{part} present")
                } else {
                    format!("no {part}")
                }
            };
            result.record((orig_present != trans_present).then(|| {
                Issue::warning(Category::HeaderFooter, location.as_str(), part)
                    .expected(describe(orig_present))
                    .actual(describe(trans_present))
                    .hint(format!("Restore {part} in section {} to match original", i + 1))
            }));
        }
    }
}

impl Validator for DocumentValidator {
    fn kind(&self) -> FileKind {
        FileKind::Document
    }

    fn validate(&self, original: &Path, translated: &Path) -> ValidationResult {
        let mut result = ValidationResult::new(translated, self.kind().format_type());
        match load_document(original).and_then(|orig| Ok((orig, load_document(translated)?))) {
            Ok((orig, trans)) => self.compare(&orig, &trans, &mut result),
            Err(e) => {
                warn!("cannot compare {}: {e}", translated.display());
                result.add_issue(read_failure(self.kind(), &e));
            }
        }
        result.finish(&self.config);
        result
    }
}
