//! Fixture builders shared by the integration tests
//!
//! Word fixtures that need exact XML (merges, borders, section references)
//! are zipped from raw parts; simple text documents come from docx-rs.
//! Spreadsheets are always assembled from raw SpreadsheetML.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const S_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

pub fn write_package(path: &Path, parts: &[(&str, String)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn styles_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W_NS}">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>
</w:styles>"#
    )
}

/// A .docx whose `w:body` holds `body` verbatim.
pub fn docx(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{body}</w:body></w:document>"#
    );
    write_package(
        &path,
        &[
            ("[Content_Types].xml", content_types("word/document.xml", "wordprocessingml.document.main")),
            ("word/document.xml", document),
            ("word/styles.xml", styles_xml()),
        ],
    );
    path
}

fn content_types(main_part: &str, main_type: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/{main_part}" ContentType="application/vnd.openxmlformats-officedocument.{main_type}+xml"/>
</Types>"#
    )
}

/// `<w:p>` with an optional style and one run per `(text, run_properties)`.
pub fn para(style: Option<&str>, runs: &[(&str, &str)]) -> String {
    let ppr = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    let runs: String = runs
        .iter()
        .map(|(text, rpr)| {
            let rpr = if rpr.is_empty() {
                String::new()
            } else {
                format!("<w:rPr>{rpr}</w:rPr>")
            };
            format!(r#"<w:r>{rpr}<w:t xml:space="preserve">{text}</w:t></w:r>"#)
        })
        .collect();
    format!("<w:p>{ppr}{runs}</w:p>")
}

pub fn text_para(text: &str) -> String {
    para(None, &[(text, "")])
}

/// A plain table of `rows x cols` cells holding `r<r>c<c>`.
pub fn table(rows: usize, cols: usize) -> String {
    let grid: String = (0..cols).map(|_| r#"<w:gridCol w:w="2000"/>"#).collect();
    let body: String = (1..=rows)
        .map(|r| {
            let cells: String = (1..=cols)
                .map(|c| format!("<w:tc>{}</w:tc>", text_para(&format!("r{r}c{c}"))))
                .collect();
            format!("<w:tr>{cells}</w:tr>")
        })
        .collect();
    format!("<w:tbl><w:tblGrid>{grid}</w:tblGrid>{body}</w:tbl>")
}

pub fn sect_pr(header: bool, footer: bool) -> String {
    let mut refs = String::new();
    if header {
        refs.push_str(r#"<w:headerReference w:type="default" r:id="rId8"/>"#);
    }
    if footer {
        refs.push_str(r#"<w:footerReference w:type="default" r:id="rId9"/>"#);
    }
    format!("<w:sectPr>{refs}</w:sectPr>")
}

/// A text-only .docx generated with docx-rs, one paragraph per line.
pub fn docx_rs_document(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    use docx_rs::{Docx, Paragraph, Run};

    let path = dir.join(name);
    let docx = lines.iter().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)))
    });
    let file = File::create(&path).unwrap();
    docx.build().pack(file).unwrap();
    path
}

/// One worksheet of a raw workbook.
pub struct SheetSpec<'a> {
    pub name: &'a str,
    /// Inner XML of `<worksheet>` after the namespace declaration
    pub xml: String,
}

/// A .xlsx with the given worksheets, shared strings and `styles.xml` body.
pub fn xlsx(dir: &Path, name: &str, sheets: &[SheetSpec], shared: &[&str], styles: &str) -> PathBuf {
    let path = dir.join(name);

    let sheet_list: String = sheets
        .iter()
        .enumerate()
        .map(|(i, sheet)| format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, sheet.name, i + 1, i + 1))
        .collect();
    let rels: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{i}" Type="{R_NS}/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            )
        })
        .collect();
    let strings: String = shared.iter().map(|s| format!("<si><t>{s}</t></si>")).collect();

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types("xl/workbook.xml", "spreadsheetml.sheet.main")),
        (
            "xl/workbook.xml".to_string(),
            format!(r#"<workbook xmlns="{S_NS}" xmlns:r="{R_NS}"><sheets>{sheet_list}</sheets></workbook>"#),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            format!(
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            ),
        ),
        (
            "xl/sharedStrings.xml".to_string(),
            format!(r#"<sst xmlns="{S_NS}" count="{0}" uniqueCount="{0}">{strings}</sst>"#, shared.len()),
        ),
        (
            "xl/styles.xml".to_string(),
            format!(r#"<styleSheet xmlns="{S_NS}">{styles}</styleSheet>"#),
        ),
    ];
    for (i, sheet) in sheets.iter().enumerate() {
        parts.push((
            format!("xl/worksheets/sheet{}.xml", i + 1),
            format!(r#"<worksheet xmlns="{S_NS}">{}</worksheet>"#, sheet.xml),
        ));
    }

    let borrowed: Vec<(&str, String)> = parts.iter().map(|(n, c)| (n.as_str(), c.clone())).collect();
    write_package(&path, &borrowed);
    path
}

/// Two fonts (Calibri 11, Arial 14 bold), a solid yellow fill and a thin
/// border; cell formats 0 (plain), 1 (Arial bold, fill, border, centered).
pub const STYLES: &str = r#"
<fonts count="2">
  <font><sz val="11"/><name val="Calibri"/></font>
  <font><b/><sz val="14"/><name val="Arial"/></font>
</fonts>
<fills count="3">
  <fill><patternFill patternType="none"/></fill>
  <fill><patternFill patternType="gray125"/></fill>
  <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/></patternFill></fill>
</fills>
<borders count="2">
  <border><left/><right/><top/><bottom/></border>
  <border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/></border>
</borders>
<cellXfs count="2">
  <xf fontId="0" fillId="0" borderId="0"/>
  <xf fontId="1" fillId="2" borderId="1" applyAlignment="1"><alignment horizontal="center"/></xf>
</cellXfs>"#;

/// Read one part of a package as text.
pub fn read_part(path: &Path, name: &str) -> String {
    use std::io::Read;

    let file = File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

/// Names of every entry of a package, in archive order.
pub fn part_names(path: &Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
