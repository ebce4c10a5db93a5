//! Document loading
//!
//! This module contains `load_document()`, which reads `word/document.xml`
//! and `word/styles.xml` from a .docx package and builds the
//! [`WordDocument`] model used by extraction and validation.

use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::ooxml::package::DOCUMENT_PART;
use crate::ooxml::{FileKind, Package, XmlElement, open_package};

use super::address::document_body;
use super::models::*;
use super::parsing::formatting::{extract_run_formatting, extract_run_text, paragraph_runs};
use super::parsing::styles::StyleCatalog;
use super::parsing::table::build_grid;

const STYLES_PART: &str = "word/styles.xml";

/// Load a .docx file into a [`WordDocument`].
///
/// Fails with [`Error::MissingFile`] when the path does not exist and with
/// [`Error::Parse`] when the file is not a readable Word package.
pub fn load_document(file_path: &Path) -> Result<WordDocument> {
    let package = open_package(file_path, FileKind::Document)?;
    parse_package(&package, file_path).map_err(|e| Error::parse(file_path, e))
}

pub(crate) fn parse_package(package: &Package, file_path: &Path) -> Result<WordDocument> {
    let document = package.required_xml_part(DOCUMENT_PART)?;
    let styles = package.xml_part(STYLES_PART)?;
    let catalog = StyleCatalog::from_styles(styles.as_ref().map(|styles| &styles.root));
    let body = document_body(&document.root)?;

    let mut elements = Vec::new();
    let mut sections = Vec::new();
    let mut table_ordinal = 0;

    for (offset, child) in body.elements().enumerate() {
        let content = match child.name.as_str() {
            "w:p" => {
                if let Some(sect_pr) = child.find_path(&["w:pPr", "w:sectPr"]) {
                    sections.push(section_properties(sect_pr));
                }
                BodyContent::Paragraph(load_paragraph(child, &catalog))
            }
            "w:tbl" => {
                table_ordinal += 1;
                BodyContent::Table(load_table(child, table_ordinal, &catalog))
            }
            "w:sectPr" => {
                sections.push(section_properties(child));
                BodyContent::Other(child.name.clone())
            }
            other => BodyContent::Other(other.to_string()),
        };
        elements.push(BodyElement {
            block_index: offset + 1,
            content,
        });
    }

    debug!(
        "loaded {}: {} body elements, {} tables, {} sections",
        file_path.display(),
        elements.len(),
        table_ordinal,
        sections.len()
    );

    Ok(WordDocument {
        file_path: file_path.to_path_buf(),
        body: elements,
        sections,
    })
}

fn load_paragraph(element: &XmlElement, catalog: &StyleCatalog) -> Paragraph {
    let runs = paragraph_runs(element)
        .into_iter()
        .map(|run| Run {
            text: extract_run_text(run),
            properties: extract_run_formatting(run),
        })
        .collect();

    Paragraph {
        style_name: catalog.paragraph_style(element),
        runs,
    }
}

fn load_table(element: &XmlElement, ordinal: usize, catalog: &StyleCatalog) -> Table {
    let rows = element
        .children_named("w:tr")
        .map(|tr| {
            tr.children_named("w:tc")
                .map(|tc| TableCell {
                    paragraphs: tc
                        .children_named("w:p")
                        .map(|p| load_paragraph(p, catalog))
                        .collect(),
                    has_borders: tc.find_path(&["w:tcPr", "w:tcBorders"]).is_some(),
                })
                .collect()
        })
        .collect();

    Table {
        ordinal,
        rows,
        grid: build_grid(element),
    }
}

fn section_properties(sect_pr: &XmlElement) -> SectionProperties {
    SectionProperties {
        has_header: sect_pr.child("w:headerReference").is_some(),
        has_footer: sect_pr.child("w:footerReference").is_some(),
    }
}
