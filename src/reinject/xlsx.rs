//! Reinjection into spreadsheets
//!
//! Only text cells are rewritten. Their style index is kept, so fonts,
//! fills, borders, merges and dimensions are untouched by construction.
//! The opt-in `beautify` mode is the one exception: translated cells move to
//! a wrap-text copy of their format and their rows grow to a minimum height.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ooxml::xml::is_xml_char;
use crate::ooxml::{FileKind, XmlDocument, XmlElement, XmlNode, open_package};
use crate::sheet::{STYLES_PART, cell_ref, parse_cell_ref, sheet_parts};

use super::ensure_distinct;

/// One translated spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetEntry {
    pub sheet: String,
    pub cell: String,
    pub text: String,
    /// Source workbook name the entry was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetReinjectionReport {
    pub ok: bool,
    pub source: String,
    pub output: String,
    pub applied_count: usize,
    pub skipped_formulas: usize,
}

/// Row height (points) given to rows holding beautified cells
const BEAUTIFY_ROW_HEIGHT: f64 = 20.0;

#[derive(Debug, Clone, Default)]
pub struct SheetOptions {
    /// Wrap translated text and give its rows at least 20pt of height
    pub beautify: bool,
}

enum CellWrite {
    Applied,
    Formula,
    NotText,
    Missing,
    Invalid(char),
}

/// Wrap-text variants of cell formats, appended to `cellXfs` on demand.
struct WrapFormats {
    styles: XmlDocument,
    variants: HashMap<usize, usize>,
}

impl WrapFormats {
    /// Index of a format equal to `index` but wrapping text.
    fn variant(&mut self, index: usize) -> Option<usize> {
        if let Some(&variant) = self.variants.get(&index) {
            return Some(variant);
        }

        let xfs = self.styles.root.child_mut("cellXfs")?;
        let mut xf = xfs
            .children_named("xf")
            .nth(index)
            .cloned()
            .unwrap_or_else(|| XmlElement::new("xf"));
        let wraps = xf
            .child_attr("alignment", "wrapText")
            .is_some_and(|wrap| matches!(wrap, "1" | "true"));
        let variant = if wraps {
            index
        } else {
            match xf.child_mut("alignment") {
                Some(alignment) => alignment.set_attr("wrapText", "1"),
                // `alignment` is the first child an `xf` may have
                None => xf
                    .children
                    .insert(0, XmlNode::Element(XmlElement::new("alignment").with_attr("wrapText", "1"))),
            }
            xf.set_attr("applyAlignment", "1");
            let variant = xfs.children_named("xf").count();
            xfs.push(xf);
            xfs.set_attr("count", (variant + 1).to_string());
            variant
        };

        self.variants.insert(index, variant);
        Some(variant)
    }
}

/// Copy `source` to `output`, replacing the text of the listed cells.
pub fn apply_sheet_translation_map(
    source: &Path,
    output: &Path,
    entries: &[SheetEntry],
) -> Result<SheetReinjectionReport> {
    apply_sheet_translation_map_with(source, output, entries, &SheetOptions::default())
}

pub fn apply_sheet_translation_map_with(
    source: &Path,
    output: &Path,
    entries: &[SheetEntry],
    options: &SheetOptions,
) -> Result<SheetReinjectionReport> {
    let mut package = open_package(source, FileKind::Grid)?;
    ensure_distinct(source, output)?;

    let mut wrap_formats = if options.beautify {
        match package.xml_part(STYLES_PART).map_err(|e| Error::parse(source, e))? {
            Some(styles) => Some(WrapFormats {
                styles,
                variants: HashMap::new(),
            }),
            None => {
                warn!("{} has no stylesheet, text wrapping skipped", source.display());
                None
            }
        }
    } else {
        None
    };

    let source_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut by_sheet: HashMap<&str, Vec<&SheetEntry>> = HashMap::new();
    for entry in entries {
        if entry.file.as_deref().is_some_and(|file| file != source_name) {
            debug!("skipping entry for {}: belongs to another workbook", entry.cell);
            continue;
        }
        by_sheet.entry(entry.sheet.as_str()).or_default().push(entry);
    }

    let mut applied = 0;
    let mut skipped_formulas = 0;
    let parts = sheet_parts(&package).map_err(|e| Error::parse(source, e))?;
    for part in parts {
        let Some(sheet_entries) = by_sheet.remove(part.name.as_str()) else {
            continue;
        };
        let Some(mut worksheet) = package.xml_part(&part.part).map_err(|e| Error::parse(source, e))? else {
            warn!("sheet {} points at missing part {}", part.name, part.part);
            continue;
        };

        for entry in sheet_entries {
            let Some((row, col)) = parse_cell_ref(entry.cell.trim()) else {
                warn!("{}: invalid cell reference {:?}", part.name, entry.cell);
                continue;
            };
            let reference = cell_ref(row, col);
            match write_cell(&mut worksheet.root, &reference, &entry.text) {
                CellWrite::Applied => {
                    applied += 1;
                    if options.beautify {
                        beautify_cell(&mut worksheet.root, &reference, row, wrap_formats.as_mut());
                    }
                }
                CellWrite::Formula => skipped_formulas += 1,
                CellWrite::NotText => debug!("{}!{}: not a text cell", part.name, entry.cell),
                CellWrite::Missing => debug!("{}!{}: no such cell", part.name, entry.cell),
                CellWrite::Invalid(bad) => warn!(
                    "{}!{}: character U+{:04X} cannot be stored in XML",
                    part.name, entry.cell, bad as u32
                ),
            }
        }
        package.set_xml_part(&part.part, &worksheet);
    }

    if let Some(wrap_formats) = wrap_formats.filter(|formats| !formats.variants.is_empty()) {
        package.set_xml_part(STYLES_PART, &wrap_formats.styles);
    }

    for sheet in by_sheet.keys() {
        warn!("no worksheet named {sheet} in {}", source.display());
    }

    package.save(output)?;
    info!(
        "applied {applied} cells ({skipped_formulas} formulas skipped) to {}",
        output.display()
    );

    Ok(SheetReinjectionReport {
        ok: true,
        source: source.display().to_string(),
        output: output.display().to_string(),
        applied_count: applied,
        skipped_formulas,
    })
}

fn find_cell_mut<'a>(root: &'a mut XmlElement, reference: &str) -> Option<&'a mut XmlElement> {
    root.child_mut("sheetData")?
        .elements_mut()
        .filter(|row| row.is("row"))
        .flat_map(|row| row.elements_mut())
        .find(|c| {
            c.is("c")
                && c.attr("r")
                    .is_some_and(|r| r.replace('$', "").eq_ignore_ascii_case(reference))
        })
}

fn write_cell(root: &mut XmlElement, reference: &str, text: &str) -> CellWrite {
    let Some(cell) = find_cell_mut(root, reference) else {
        return CellWrite::Missing;
    };
    if cell.child("f").is_some() {
        return CellWrite::Formula;
    }
    if !matches!(cell.attr("t"), Some("s" | "inlineStr" | "str")) {
        return CellWrite::NotText;
    }
    if let Some(bad) = text.chars().find(|c| !is_xml_char(*c)) {
        return CellWrite::Invalid(bad);
    }

    cell.children.clear();
    cell.set_attr("t", "inlineStr");
    let t = XmlElement::new("t")
        .with_attr("xml:space", "preserve")
        .with_text(text);
    cell.push(XmlElement::new("is").with_child(t));
    CellWrite::Applied
}

/// Point a written cell at a wrapping format and raise its row height.
fn beautify_cell(root: &mut XmlElement, reference: &str, row: u32, formats: Option<&mut WrapFormats>) {
    if let (Some(formats), Some(cell)) = (formats, find_cell_mut(root, reference)) {
        let index = cell.attr("s").and_then(|s| s.parse().ok()).unwrap_or(0);
        if let Some(variant) = formats.variant(index) {
            cell.set_attr("s", variant.to_string());
        }
    }

    let row_element = root.child_mut("sheetData").and_then(|data| {
        data.elements_mut()
            .find(|element| element.is("row") && element.attr("r").and_then(|r| r.parse().ok()) == Some(row))
    });
    let Some(row_element) = row_element else {
        return;
    };
    let height = row_element
        .attr("ht")
        .and_then(|ht| ht.parse::<f64>().ok())
        .unwrap_or(0.0);
    if height < BEAUTIFY_ROW_HEIGHT {
        row_element.set_attr("ht", BEAUTIFY_ROW_HEIGHT.to_string());
        row_element.set_attr("customHeight", "1");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::XmlDocument;

    fn sheet() -> XmlElement {
        XmlDocument::parse(
            r#"<worksheet><sheetData>
                <row r="1"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1"><v>123</v></c></row>
                <row r="2"><c r="A2"><f>SUM(1,2)</f><v>3</v></c><c r="B2" t="inlineStr"><is><t>x</t></is></c></row>
            </sheetData></worksheet>"#,
        )
        .unwrap()
        .root
    }

    #[test]
    fn test_text_cell_becomes_inline_string() {
        let mut root = sheet();
        assert!(matches!(write_cell(&mut root, "A1", "Bonjour"), CellWrite::Applied));
        let cell = find_cell_mut(&mut root, "A1").unwrap();
        assert_eq!(cell.attr("t"), Some("inlineStr"));
        assert_eq!(cell.attr("s"), Some("1"));
        assert_eq!(cell.find_path(&["is", "t"]).unwrap().text_content(), "Bonjour");
        assert!(cell.child("v").is_none());
    }

    #[test]
    fn test_formula_numeric_and_missing_cells_are_kept() {
        let mut root = sheet();
        assert!(matches!(write_cell(&mut root, "A2", "no"), CellWrite::Formula));
        assert!(matches!(write_cell(&mut root, "B1", "999"), CellWrite::NotText));
        assert!(matches!(write_cell(&mut root, "Z9", "?"), CellWrite::Missing));
        assert!(matches!(write_cell(&mut root, "B2", "y"), CellWrite::Applied));

        let numeric = find_cell_mut(&mut root, "B1").unwrap();
        assert_eq!(numeric.child("v").unwrap().text_content(), "123");
    }

    #[test]
    fn test_control_characters_are_refused() {
        let mut root = sheet();
        assert!(matches!(write_cell(&mut root, "A1", "bad\u{7}"), CellWrite::Invalid('\u{7}')));
        let cell = find_cell_mut(&mut root, "A1").unwrap();
        assert_eq!(cell.attr("t"), Some("s"));
        assert_eq!(cell.child("v").unwrap().text_content(), "0");
    }

    #[test]
    fn test_wrap_variants_are_shared_per_format() {
        let styles = XmlDocument::parse(
            r#"<styleSheet><cellXfs count="2"><xf fontId="0"/><xf fontId="1"><alignment horizontal="center"/></xf></cellXfs></styleSheet>"#,
        )
        .unwrap();
        let mut formats = WrapFormats {
            styles,
            variants: HashMap::new(),
        };

        assert_eq!(formats.variant(1), Some(2));
        assert_eq!(formats.variant(1), Some(2));
        assert_eq!(formats.variant(0), Some(3));

        let xfs = formats.styles.root.child("cellXfs").unwrap();
        assert_eq!(xfs.attr("count"), Some("4"));
        let wrapped = xfs.children_named("xf").nth(2).unwrap();
        assert_eq!(wrapped.attr("fontId"), Some("1"));
        assert_eq!(wrapped.child_attr("alignment", "horizontal"), Some("center"));
        assert_eq!(wrapped.child_attr("alignment", "wrapText"), Some("1"));
    }

    #[test]
    fn test_beautified_row_only_grows() {
        let mut root = XmlDocument::parse(
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c></row><row r="2" ht="35"><c r="A2" t="s"><v>0</v></c></row></sheetData></worksheet>"#,
        )
        .unwrap()
        .root;
        beautify_cell(&mut root, "A1", 1, None);
        beautify_cell(&mut root, "A2", 2, None);

        let rows: Vec<&XmlElement> = root.child("sheetData").unwrap().children_named("row").collect();
        assert_eq!(rows[0].attr("ht"), Some("20"));
        assert_eq!(rows[0].attr("customHeight"), Some("1"));
        assert_eq!(rows[1].attr("ht"), Some("35"));
    }
}
