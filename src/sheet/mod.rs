//! Spreadsheet (.xlsx) loading
//!
//! Reads the workbook's sheet list, shared strings, stylesheet and each
//! worksheet's cells, merged regions and dimensions into a [`Workbook`].

pub mod reference;
pub mod styles;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::ooxml::package::WORKBOOK_PART;
use crate::ooxml::{FileKind, Package, XmlElement, open_package};

pub use reference::{MAX_COLUMN, cell_ref, column_letter, parse_cell_ref};
pub use styles::{CellBorders, CellFont, CellStyle, Stylesheet};

const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
pub(crate) const STYLES_PART: &str = "xl/styles.xml";

#[derive(Debug, Clone)]
pub struct Workbook {
    pub file_path: PathBuf,
    pub sheets: Vec<Worksheet>,
}

#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    pub name: String,
    /// Cells keyed by (row, column), 1-based
    pub cells: BTreeMap<(u32, u32), Cell>,
    /// Merged ranges as written, e.g. `C1:D1`
    pub merged: BTreeSet<String>,
    /// Explicit widths keyed by column letter
    pub column_widths: BTreeMap<String, f64>,
    /// Explicit heights keyed by row number
    pub row_heights: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub value: Option<String>,
    pub has_formula: bool,
    pub style: CellStyle,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.value.as_deref().is_none_or(str::is_empty)
    }
}

impl Worksheet {
    /// Highest row and column holding a cell; at least 1×1.
    pub fn used_range(&self) -> (u32, u32) {
        let max_row = self.cells.keys().map(|(row, _)| *row).max().unwrap_or(1);
        let max_col = self.cells.keys().map(|(_, col)| *col).max().unwrap_or(1);
        (max_row.max(1), max_col.max(1))
    }

    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }
}

/// Sheet name and the package part holding it, in workbook order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetPart {
    pub name: String,
    pub part: String,
}

/// Resolve the worksheet parts listed in `xl/workbook.xml`.
pub(crate) fn sheet_parts(package: &Package) -> Result<Vec<SheetPart>> {
    let workbook = package.required_xml_part(WORKBOOK_PART)?;
    let targets: HashMap<String, String> = match package.xml_part(WORKBOOK_RELS_PART)? {
        Some(rels) => rels
            .root
            .children_named("Relationship")
            .filter_map(|rel| Some((rel.attr("Id")?.to_string(), rel.attr("Target")?.to_string())))
            .collect(),
        None => HashMap::new(),
    };

    let mut parts = Vec::new();
    let Some(sheets) = workbook.root.child("sheets") else {
        return Ok(parts);
    };
    for (position, sheet) in sheets.children_named("sheet").enumerate() {
        let name = sheet.attr("name").unwrap_or_default().to_string();
        let part = sheet
            .attr("r:id")
            .and_then(|id| targets.get(id))
            .map(|target| resolve_target(target))
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", position + 1));
        parts.push(SheetPart { name, part });
    }
    Ok(parts)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

/// Text of every `si` entry of the shared string table.
pub(crate) fn shared_strings(package: &Package) -> Result<Vec<String>> {
    let Some(table) = package.xml_part(SHARED_STRINGS_PART)? else {
        return Ok(Vec::new());
    };
    Ok(table.root.children_named("si").map(string_item_text).collect())
}

/// Text of an `si` / `is` element, ignoring phonetic runs.
fn string_item_text(item: &XmlElement) -> String {
    let mut text = String::new();
    for child in item.elements() {
        match child.name.as_str() {
            "t" => text.push_str(&child.text_content()),
            "r" => {
                if let Some(t) = child.child("t") {
                    text.push_str(&t.text_content());
                }
            }
            _ => {}
        }
    }
    text
}

/// Load a .xlsx workbook.
pub fn load_workbook(file_path: &Path) -> Result<Workbook> {
    let package = open_package(file_path, FileKind::Grid)?;
    parse_workbook(&package, file_path).map_err(|e| Error::parse(file_path, e))
}

fn parse_workbook(package: &Package, file_path: &Path) -> Result<Workbook> {
    let strings = shared_strings(package)?;
    let styles = package.xml_part(STYLES_PART)?;
    let stylesheet = Stylesheet::from_xml(styles.as_ref().map(|styles| &styles.root));

    let mut sheets = Vec::new();
    for SheetPart { name, part } in sheet_parts(package)? {
        let worksheet = match package.xml_part(&part)? {
            Some(xml) => parse_worksheet(name, &xml.root, &strings, &stylesheet),
            None => {
                debug!("sheet {name} points at missing part {part}");
                Worksheet {
                    name,
                    ..Worksheet::default()
                }
            }
        };
        sheets.push(worksheet);
    }

    debug!("loaded {} with {} sheets", file_path.display(), sheets.len());
    Ok(Workbook {
        file_path: file_path.to_path_buf(),
        sheets,
    })
}

fn parse_worksheet(
    name: String,
    root: &XmlElement,
    strings: &[String],
    stylesheet: &Stylesheet,
) -> Worksheet {
    let mut sheet = Worksheet {
        name,
        ..Worksheet::default()
    };

    if let Some(data) = root.child("sheetData") {
        for row in data.children_named("row") {
            let row_number = row.attr("r").and_then(|r| r.parse::<u32>().ok());
            if let (Some(number), Some(height)) =
                (row_number, row.attr("ht").and_then(|h| h.parse::<f64>().ok()))
            {
                sheet.row_heights.insert(number, height);
            }

            for c in row.children_named("c") {
                let Some(position) = c.attr("r").and_then(parse_cell_ref) else {
                    continue;
                };
                let style_index = c.attr("s").and_then(|s| s.parse().ok()).unwrap_or(0);
                sheet.cells.insert(
                    position,
                    Cell {
                        value: cell_value(c, strings),
                        has_formula: c.child("f").is_some(),
                        style: stylesheet.cell_style(style_index),
                    },
                );
            }
        }
    }

    if let Some(merges) = root.child("mergeCells") {
        sheet.merged = merges
            .children_named("mergeCell")
            .filter_map(|merge| merge.attr("ref"))
            .map(str::to_string)
            .collect();
    }

    if let Some(cols) = root.child("cols") {
        for col in cols.children_named("col") {
            let bound = |key: &str| col.attr(key).and_then(|v| v.parse::<u32>().ok());
            let (Some(min), Some(width)) = (bound("min"), col.attr("width").and_then(|w| w.parse::<f64>().ok()))
            else {
                continue;
            };
            let min = min.clamp(1, MAX_COLUMN);
            let max = bound("max").unwrap_or(min).min(MAX_COLUMN);
            for index in min..=max {
                sheet.column_widths.insert(column_letter(index), width);
            }
        }
    }

    sheet
}

fn cell_value(c: &XmlElement, strings: &[String]) -> Option<String> {
    match c.attr("t") {
        Some("inlineStr") => c.child("is").map(string_item_text),
        Some("s") => c
            .child("v")
            .and_then(|v| v.text_content().trim().parse::<usize>().ok())
            .and_then(|index| strings.get(index).cloned()),
        _ => c.child("v").map(|v| v.text_content()),
    }
}
