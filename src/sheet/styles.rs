//! Spreadsheet stylesheet (`xl/styles.xml`)
//!
//! Only the parts the validator compares are kept: fonts, fills, borders
//! and the alignment of each cell format.

use std::fmt;

use crate::ooxml::XmlElement;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFont {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
}

impl fmt::Display for CellFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.as_deref().unwrap_or("default"))?;
        match self.size {
            Some(size) => write!(f, " {size}pt")?,
            None => write!(f, " ?pt")?,
        }
        if self.bold {
            write!(f, " bold")?;
        }
        if self.italic {
            write!(f, " italic")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellBorders {
    pub left: Option<String>,
    pub right: Option<String>,
    pub top: Option<String>,
    pub bottom: Option<String>,
}

impl CellBorders {
    pub fn sides(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("left", self.left.as_deref()),
            ("right", self.right.as_deref()),
            ("top", self.top.as_deref()),
            ("bottom", self.bottom.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub font: CellFont,
    /// `none`, `#AARRGGBB` or `pattern`
    pub fill: String,
    pub borders: CellBorders,
    /// `default` or e.g. `h=center v=top wrap`
    pub alignment: String,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font: CellFont::default(),
            fill: "none".to_string(),
            borders: CellBorders::default(),
            alignment: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    fonts: Vec<CellFont>,
    fills: Vec<String>,
    borders: Vec<CellBorders>,
    formats: Vec<CellFormat>,
}

#[derive(Debug, Clone, Default)]
struct CellFormat {
    font: usize,
    fill: usize,
    border: usize,
    alignment: String,
}

impl Stylesheet {
    pub(crate) fn from_xml(root: Option<&XmlElement>) -> Self {
        let Some(root) = root else {
            return Stylesheet::default();
        };

        let fonts = root
            .child("fonts")
            .map(|fonts| fonts.children_named("font").map(parse_font).collect())
            .unwrap_or_default();
        let fills = root
            .child("fills")
            .map(|fills| fills.children_named("fill").map(parse_fill).collect())
            .unwrap_or_default();
        let borders = root
            .child("borders")
            .map(|borders| borders.children_named("border").map(parse_border).collect())
            .unwrap_or_default();
        let formats = root
            .child("cellXfs")
            .map(|xfs| xfs.children_named("xf").map(parse_format).collect())
            .unwrap_or_default();

        Stylesheet {
            fonts,
            fills,
            borders,
            formats,
        }
    }

    /// Resolved style of a cell format index (`s` attribute, default 0).
    pub fn cell_style(&self, index: usize) -> CellStyle {
        let format = self.formats.get(index).cloned().unwrap_or_default();
        CellStyle {
            font: self.fonts.get(format.font).cloned().unwrap_or_default(),
            fill: self
                .fills
                .get(format.fill)
                .cloned()
                .unwrap_or_else(|| "none".to_string()),
            borders: self.borders.get(format.border).cloned().unwrap_or_default(),
            alignment: if format.alignment.is_empty() {
                "default".to_string()
            } else {
                format.alignment
            },
        }
    }
}

fn val(element: &XmlElement, child: &str) -> Option<String> {
    element.child_attr(child, "val").map(str::to_string)
}

fn flag(element: &XmlElement, child: &str) -> bool {
    element
        .child(child)
        .map(|e| !matches!(e.attr("val"), Some("0" | "false")))
        .unwrap_or(false)
}

fn parse_font(font: &XmlElement) -> CellFont {
    CellFont {
        name: val(font, "name"),
        size: val(font, "sz").and_then(|size| size.parse().ok()),
        bold: flag(font, "b"),
        italic: flag(font, "i"),
    }
}

fn parse_fill(fill: &XmlElement) -> String {
    let Some(pattern) = fill.child("patternFill") else {
        return "pattern".to_string();
    };
    match pattern.attr("patternType") {
        None | Some("none") => "none".to_string(),
        Some(_) => match pattern.child_attr("fgColor", "rgb") {
            Some(rgb) => format!("#{rgb}"),
            None => "pattern".to_string(),
        },
    }
}

fn parse_border(border: &XmlElement) -> CellBorders {
    let side = |name: &str| {
        border
            .child(name)
            .and_then(|side| side.attr("style"))
            .map(str::to_string)
    };
    CellBorders {
        left: side("left"),
        right: side("right"),
        top: side("top"),
        bottom: side("bottom"),
    }
}

fn parse_format(xf: &XmlElement) -> CellFormat {
    let index = |key: &str| {
        xf.attr(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    };

    let mut alignment = Vec::new();
    if let Some(align) = xf.child("alignment") {
        if let Some(horizontal) = align.attr("horizontal") {
            alignment.push(format!("h={horizontal}"));
        }
        if let Some(vertical) = align.attr("vertical") {
            alignment.push(format!("v={vertical}"));
        }
        if matches!(align.attr("wrapText"), Some("1" | "true")) {
            alignment.push("wrap".to_string());
        }
    }

    CellFormat {
        font: index("fontId"),
        fill: index("fillId"),
        border: index("borderId"),
        alignment: alignment.join(" "),
    }
}
