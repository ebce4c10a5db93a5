//! Spreadsheet fidelity checks
//!
//! Sheet names, used ranges, merged regions, per-cell font/fill/border/
//! alignment and column/row dimensions. Formula cells are never compared.

use std::collections::BTreeSet;
use std::path::Path;

use log::warn;

use crate::config::ValidationConfig;
use crate::ooxml::FileKind;
use crate::sheet::{Cell, CellStyle, Workbook, Worksheet, cell_ref, load_workbook};

use super::Validator;
use super::issue::{Category, Issue, ValidationResult, read_failure};

/// Font size difference (points) tolerated between two cells
const CELL_FONT_SIZE_DELTA: f64 = 0.5;

pub struct GridValidator {
    config: ValidationConfig,
}

fn sheet_list(names: &BTreeSet<&str>) -> String {
    format!("sheets: [{}]", names.iter().copied().collect::<Vec<_>>().join(", "))
}

impl GridValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Run every enabled comparison between two loaded workbooks.
    pub fn compare(&self, original: &Workbook, translated: &Workbook, result: &mut ValidationResult) {
        compare_sheet_names(original, translated, result);

        for orig_sheet in &original.sheets {
            if let Some(trans_sheet) = translated.sheet(&orig_sheet.name) {
                self.compare_sheet(orig_sheet, trans_sheet, result);
            }
        }
    }

    fn compare_sheet(&self, orig: &Worksheet, trans: &Worksheet, result: &mut ValidationResult) {
        let name = &orig.name;
        let (orig_rows, orig_cols) = orig.used_range();
        let (trans_rows, trans_cols) = trans.used_range();

        result.record(((orig_rows, orig_cols) != (trans_rows, trans_cols)).then(|| {
            Issue::warning(Category::Dimensions, format!("{name}!dimensions"), "used_range")
                .expected(format!("{orig_rows} rows x {orig_cols} cols"))
                .actual(format!("{trans_rows} rows x {trans_cols} cols"))
                .hint(format!(
                    "Sheet used range differs: expected {orig_rows}x{orig_cols}, got {trans_rows}x{trans_cols}"
                ))
        }));

        if self.config.xlsx_check_merged {
            compare_merged_regions(orig, trans, result);
        }

        // Only positions populated on either side can differ
        let blank = Cell::default();
        let positions: BTreeSet<(u32, u32)> = orig.cells.keys().chain(trans.cells.keys()).copied().collect();
        for (row, col) in positions {
            let orig_cell = orig.cell(row, col).unwrap_or(&blank);
            let trans_cell = trans.cell(row, col).unwrap_or(&blank);
            if orig_cell.is_empty() && trans_cell.is_empty() {
                continue;
            }
            if orig_cell.has_formula {
                continue;
            }
            let location = format!("{name}!{}", cell_ref(row, col));
            self.compare_cell(&location, &orig_cell.style, &trans_cell.style, result);
        }

        if self.config.xlsx_check_dimensions {
            self.compare_dimensions(orig, trans, result);
        }
    }

    fn compare_cell(&self, location: &str, orig: &CellStyle, trans: &CellStyle, result: &mut ValidationResult) {
        if self.config.xlsx_check_fonts {
            let (o, t) = (&orig.font, &trans.font);
            let mut differences = Vec::new();
            if let (Some(orig_name), Some(trans_name)) = (&o.name, &t.name) {
                if orig_name != trans_name {
                    differences.push(format!("name: {orig_name} -> {trans_name}"));
                }
            }
            if let (Some(orig_size), Some(trans_size)) = (o.size, t.size) {
                if (orig_size - trans_size).abs() > CELL_FONT_SIZE_DELTA {
                    differences.push(format!("size: {orig_size}pt -> {trans_size}pt"));
                }
            }
            if o.bold != t.bold {
                differences.push(format!("bold: {} -> {}", o.bold, t.bold));
            }
            if o.italic != t.italic {
                differences.push(format!("italic: {} -> {}", o.italic, t.italic));
            }
            result.record((!differences.is_empty()).then(|| {
                Issue::info(Category::CellFont, location, "cell")
                    .expected(format!("font: {o}"))
                    .actual(format!("font: {t}"))
                    .hint(format!("Cell {location}: {}", differences.join("; ")))
            }));
        }

        if self.config.xlsx_check_fills {
            let differs = orig.fill != trans.fill && orig.fill != "none" && trans.fill != "none";
            result.record(differs.then(|| {
                Issue::info(Category::CellFill, location, "cell")
                    .expected(format!("fill: {}", orig.fill))
                    .actual(format!("fill: {}", trans.fill))
                    .hint(format!("Restore fill color to {} for cell {location}", orig.fill))
            }));
        }

        if self.config.xlsx_check_borders {
            let differences: Vec<String> = orig
                .borders
                .sides()
                .into_iter()
                .zip(trans.borders.sides())
                .filter_map(|((side, orig_side), (_, trans_side))| {
                    let orig_side = orig_side.unwrap_or("none");
                    let trans_side = trans_side.unwrap_or("none");
                    (orig_side != trans_side && orig_side != "none")
                        .then(|| format!("{side}: {orig_side} -> {trans_side}"))
                })
                .collect();
            result.record((!differences.is_empty()).then(|| {
                let listed = differences.join("; ");
                Issue::info(Category::CellBorder, location, "cell")
                    .expected("borders match")
                    .actual(format!("border differences: {listed}"))
                    .hint(format!("Restore borders for cell {location}: {listed}"))
            }));
        }

        if self.config.xlsx_check_alignment {
            let differs = orig.alignment != trans.alignment && orig.alignment != "default";
            result.record(differs.then(|| {
                Issue::info(Category::CellAlignment, location, "cell")
                    .expected(format!("alignment: {}", orig.alignment))
                    .actual(format!("alignment: {}", trans.alignment))
                    .hint(format!(
                        "Restore alignment to {} for cell {location}",
                        orig.alignment
                    ))
            }));
        }
    }

    fn compare_dimensions(&self, orig: &Worksheet, trans: &Worksheet, result: &mut ValidationResult) {
        let delta = self.config.xlsx_dimension_delta;
        let exceeds = |o: f64, t: f64| (o - t).abs() / o.max(0.1) > delta;
        let name = &orig.name;

        for (letter, &orig_width) in &orig.column_widths {
            let Some(&trans_width) = trans.column_widths.get(letter) else {
                continue;
            };
            result.record(exceeds(orig_width, trans_width).then(|| {
                Issue::info(Category::Dimensions, format!("{name}!{letter}"), "column_width")
                    .expected(format!("width: {orig_width:.2}"))
                    .actual(format!("width: {trans_width:.2}"))
                    .hint(format!(
                        "Column {letter} width differs (expected {orig_width:.2}, got {trans_width:.2})"
                    ))
            }));
        }

        for (row, &orig_height) in &orig.row_heights {
            let Some(&trans_height) = trans.row_heights.get(row) else {
                continue;
            };
            result.record(exceeds(orig_height, trans_height).then(|| {
                Issue::info(Category::Dimensions, format!("{name}!{row}"), "row_height")
                    .expected(format!("height: {orig_height:.2}"))
                    .actual(format!("height: {trans_height:.2}"))
                    .hint(format!(
                        "Row {row} height differs (expected {orig_height:.2}, got {trans_height:.2})"
                    ))
            }));
        }
    }
}

fn compare_sheet_names(original: &Workbook, translated: &Workbook, result: &mut ValidationResult) {
    let orig_names: BTreeSet<&str> = original.sheet_names().into_iter().collect();
    let trans_names: BTreeSet<&str> = translated.sheet_names().into_iter().collect();
    if orig_names == trans_names {
        result.add_pass();
        return;
    }

    let missing: Vec<&str> = orig_names.difference(&trans_names).copied().collect();
    let extra: Vec<&str> = trans_names.difference(&orig_names).copied().collect();
    if !missing.is_empty() {
        result.add_issue(
            Issue::critical(Category::CellFont, "workbook", "worksheet_names")
                .expected(sheet_list(&orig_names))
                .actual(sheet_list(&trans_names))
                .hint(format!("Missing worksheets: {}", missing.join(", "))),
        );
    }
    if !extra.is_empty() {
        result.add_issue(
            Issue::info(Category::CellFont, "workbook", "worksheet_names")
                .expected(sheet_list(&orig_names))
                .actual(format!("{} (extra: {})", sheet_list(&trans_names), extra.join(", ")))
                .hint(format!("Extra worksheets found: {}", extra.join(", "))),
        );
    }
}

fn compare_merged_regions(orig: &Worksheet, trans: &Worksheet, result: &mut ValidationResult) {
    let name = &orig.name;
    if orig.merged == trans.merged {
        result.add_pass();
        return;
    }

    for range in orig.merged.difference(&trans.merged) {
        result.add_issue(
            Issue::critical(Category::MergedRegions, format!("{name}!{range}"), "merged_cells")
                .expected(format!("merged: {range}"))
                .actual("not merged")
                .hint(format!("Restore merged region {range} in sheet {name}")),
        );
    }
    for range in trans.merged.difference(&orig.merged) {
        result.add_issue(
            Issue::warning(Category::MergedRegions, format!("{name}!{range}"), "merged_cells")
                .expected("not merged")
                .actual(format!("merged: {range}"))
                .hint(format!("Unexpected merged region {range} in translated sheet")),
        );
    }
}

impl Validator for GridValidator {
    fn kind(&self) -> FileKind {
        FileKind::Grid
    }

    fn validate(&self, original: &Path, translated: &Path) -> ValidationResult {
        let mut result = ValidationResult::new(translated, self.kind().format_type());
        match load_workbook(original).and_then(|orig| Ok((orig, load_workbook(translated)?))) {
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

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::sheet::CellFont;
    use crate::validate::issue::Severity;

    fn text_cell(value: &str, style: CellStyle) -> Cell {
        Cell {
            value: Some(value.to_string()),
            has_formula: false,
            style,
        }
    }

    fn workbook(sheets: Vec<Worksheet>) -> Workbook {
        Workbook {
            file_path: PathBuf::from("book.xlsx"),
            sheets,
        }
    }

    fn sheet(name: &str) -> Worksheet {
        Worksheet {
            name: name.to_string(),
            ..Worksheet::default()
        }
    }

    fn run(orig: Workbook, trans: Workbook) -> ValidationResult {
        let validator = GridValidator::new(ValidationConfig::default());
        let mut result = ValidationResult::new(Path::new("book.xlsx"), "xlsx");
        validator.compare(&orig, &trans, &mut result);
        result.finish(&ValidationConfig::default());
        result
    }

    #[test]
    fn test_missing_and_extra_sheets() {
        let result = run(
            workbook(vec![sheet("Data"), sheet("Notes")]),
            workbook(vec![sheet("Data"), sheet("Extra")]),
        );
        let names: Vec<&Issue> = result
            .issues
            .iter()
            .filter(|issue| issue.element_type == "worksheet_names")
            .collect();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].severity, Severity::Critical);
        assert_eq!(names[0].expected, "sheets: [Data, Notes]");
        assert_eq!(names[0].fix_hint, "Missing worksheets: Notes");
        assert_eq!(names[1].severity, Severity::Info);
    }

    #[test]
    fn test_merged_region_differences() {
        let mut orig = sheet("S");
        orig.merged.insert("A1:B1".to_string());
        let mut trans = sheet("S");
        trans.merged.insert("C3:D4".to_string());

        let result = run(workbook(vec![orig]), workbook(vec![trans]));
        let merged: Vec<&Issue> = result
            .issues
            .iter()
            .filter(|issue| issue.category == Category::MergedRegions)
            .collect();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].location, "S!A1:B1");
        assert_eq!(merged[0].severity, Severity::Critical);
        assert_eq!(merged[1].fix_hint, "Unexpected merged region C3:D4 in translated sheet");
        assert!(!result.valid);
    }

    #[test]
    fn test_formula_cells_are_skipped() {
        let bold = CellStyle {
            font: CellFont {
                bold: true,
                ..CellFont::default()
            },
            ..CellStyle::default()
        };
        let mut orig = sheet("S");
        orig.cells.insert(
            (1, 1),
            Cell {
                value: Some("3".to_string()),
                has_formula: true,
                style: bold,
            },
        );
        let mut trans = sheet("S");
        trans.cells.insert((1, 1), text_cell("3", CellStyle::default()));

        let result = run(workbook(vec![orig]), workbook(vec![trans]));
        assert!(result.issues.iter().all(|issue| issue.location != "S!A1"));
    }

    #[test]
    fn test_cell_font_fill_and_border_issues() {
        let mut orig_style = CellStyle::default();
        orig_style.font.name = Some("Arial".to_string());
        orig_style.fill = "#FFFF0000".to_string();
        orig_style.borders.left = Some("thin".to_string());
        let mut trans_style = CellStyle::default();
        trans_style.font.name = Some("Calibri".to_string());
        trans_style.fill = "#FF00FF00".to_string();

        let mut orig = sheet("S");
        orig.cells.insert((1, 1), text_cell("Hello", orig_style));
        let mut trans = sheet("S");
        trans.cells.insert((1, 1), text_cell("مرحبا", trans_style));

        let result = run(workbook(vec![orig]), workbook(vec![trans]));
        let at_a1: Vec<Category> = result
            .issues
            .iter()
            .filter(|issue| issue.location == "S!A1")
            .map(|issue| issue.category)
            .collect();
        assert_eq!(at_a1, [Category::CellFont, Category::CellFill, Category::CellBorder]);

        let border = result
            .issues
            .iter()
            .find(|issue| issue.category == Category::CellBorder)
            .unwrap();
        assert_eq!(border.actual, "border differences: left: thin -> none");
        assert_eq!(result.failed, 0);
        assert!(result.valid);
    }

    #[test]
    fn test_sparse_sheet_compares_populated_cells_only() {
        let mut orig = sheet("S");
        orig.cells.insert((1, 1), text_cell("top", CellStyle::default()));
        orig.cells.insert((1_048_576, 16_384), text_cell("corner", CellStyle::default()));
        let mut trans = sheet("S");
        trans.cells.insert((1, 1), text_cell("haut", CellStyle::default()));
        let mut bold = CellStyle::default();
        bold.font.bold = true;
        trans.cells.insert((1_048_576, 16_384), text_cell("coin", bold));

        let result = run(workbook(vec![orig]), workbook(vec![trans]));
        let locations: Vec<&str> = result.issues.iter().map(|issue| issue.location.as_str()).collect();
        assert_eq!(locations, ["S!XFD1048576"]);
    }

    #[test]
    fn test_dimension_tolerance() {
        let mut orig = sheet("S");
        orig.column_widths.insert("A".to_string(), 20.0);
        orig.column_widths.insert("B".to_string(), 10.0);
        orig.row_heights.insert(1, 15.0);
        let mut trans = sheet("S");
        trans.column_widths.insert("A".to_string(), 21.0);
        trans.column_widths.insert("B".to_string(), 14.0);
        trans.row_heights.insert(1, 30.0);

        let result = run(workbook(vec![orig]), workbook(vec![trans]));
        let dims: Vec<(&str, &str)> = result
            .issues
            .iter()
            .filter(|issue| issue.category == Category::Dimensions)
            .map(|issue| (issue.location.as_str(), issue.element_type.as_str()))
            .collect();
        assert_eq!(dims, [("S!B", "column_width"), ("S!1", "row_height")]);
    }
}
