//! Text extraction and formatting utilities
//!
//! This module handles extraction of text and formatting information
//! from `w:p` and `w:r` elements.

use crate::ooxml::XmlElement;

use super::super::models::*;

/// Paragraph-level containers whose runs are not part of the visible text.
const SKIPPED_CONTAINERS: &[&str] = &[
    "w:pPr",
    "w:del",
    "w:moveFrom",
    "mc:AlternateContent",
];

/// Collect the runs of a paragraph in document order.
///
/// Runs nested in hyperlinks, insertions, smart tags and content controls
/// count; deleted or moved-away runs do not.
pub(crate) fn paragraph_runs(paragraph: &XmlElement) -> Vec<&XmlElement> {
    let mut runs = Vec::new();
    collect_runs(paragraph, &mut runs);
    runs
}

fn collect_runs<'a>(element: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in element.elements() {
        if child.is("w:r") {
            out.push(child);
        } else if !SKIPPED_CONTAINERS.contains(&child.name.as_str()) {
            collect_runs(child, out);
        }
    }
}

/// Mutable counterpart of [`paragraph_runs`]; yields the same runs in the same order.
pub(crate) fn paragraph_runs_mut(paragraph: &mut XmlElement) -> Vec<&mut XmlElement> {
    let mut runs = Vec::new();
    collect_runs_mut(paragraph, &mut runs);
    runs
}

fn collect_runs_mut<'a>(element: &'a mut XmlElement, out: &mut Vec<&'a mut XmlElement>) {
    for child in element.elements_mut() {
        if child.is("w:r") {
            out.push(child);
        } else if !SKIPPED_CONTAINERS.contains(&child.name.as_str()) {
            collect_runs_mut(child, out);
        }
    }
}

/// Extract plain text from a run, handling tabs, breaks and hyphens
pub(crate) fn extract_run_text(run: &XmlElement) -> String {
    let mut text = String::new();

    for child in run.elements() {
        match child.name.as_str() {
            "w:t" => text.push_str(&child.text_content()),
            "w:tab" | "w:ptab" => text.push('\t'),
            "w:br" if is_line_break(child) => text.push('\n'),
            "w:cr" => text.push('\n'),
            "w:noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }

    text
}

/// A `w:br` that wraps text; page and column breaks carry no text.
fn is_line_break(br: &XmlElement) -> bool {
    matches!(br.attr("w:type"), None | Some("textWrapping"))
}

/// Whether an element contributes text through [`extract_run_text`].
pub(crate) fn is_text_child(element: &XmlElement) -> bool {
    match element.name.as_str() {
        "w:t" | "w:tab" | "w:ptab" | "w:cr" | "w:noBreakHyphen" => true,
        "w:br" => is_line_break(element),
        _ => false,
    }
}

/// Extract formatting information from a run
pub(crate) fn extract_run_formatting(run: &XmlElement) -> RunProperties {
    let Some(props) = run.child("w:rPr") else {
        return RunProperties::default();
    };

    let font_name = props.child("w:rFonts").and_then(|fonts| {
        fonts
            .attr("w:ascii")
            .or_else(|| fonts.attr("w:hAnsi"))
            .map(str::to_string)
    });

    // w:sz is in half-points
    let font_size = props
        .child_attr("w:sz", "w:val")
        .and_then(|val| val.parse::<f32>().ok())
        .map(|half_points| half_points / 2.0);

    let underline = props
        .child("w:u")
        .map(|u| !matches!(u.attr("w:val"), Some("none")));

    RunProperties {
        font_name,
        font_size,
        bold: toggle(props.child("w:b")),
        italic: toggle(props.child("w:i")),
        underline,
    }
}

/// Three-state OOXML toggle: absent, explicitly off, or on.
fn toggle(element: Option<&XmlElement>) -> Option<bool> {
    element.map(|e| !matches!(e.attr("w:val"), Some("0" | "false" | "off")))
}

/// Extract the text of a paragraph
pub(crate) fn extract_paragraph_text(paragraph: &XmlElement) -> String {
    paragraph_runs(paragraph)
        .into_iter()
        .map(extract_run_text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::XmlDocument;

    fn element(xml: &str) -> XmlElement {
        XmlDocument::parse(xml).unwrap().root
    }

    #[test]
    fn test_run_text_handles_tabs_and_breaks() {
        let run = element(
            "<w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t>\
             <w:br w:type=\"page\"/><w:noBreakHyphen/></w:r>",
        );
        assert_eq!(extract_run_text(&run), "a\tb\nc-");
    }

    #[test]
    fn test_only_wrapping_breaks_are_text() {
        let run = element(
            "<w:r><w:br/><w:br w:type=\"textWrapping\"/><w:br w:type=\"page\"/>\
             <w:br w:type=\"column\"/><w:fldChar/></w:r>",
        );
        let flags: Vec<bool> = run.elements().map(is_text_child).collect();
        assert_eq!(flags, [true, true, false, false, false]);
    }

    #[test]
    fn test_paragraph_text_skips_deleted_runs() {
        let p = element(
            "<w:p><w:pPr><w:rPr/></w:pPr>\
             <w:r><w:t>Kept </w:t></w:r>\
             <w:del><w:r><w:delText>gone</w:delText></w:r></w:del>\
             <w:ins><w:r><w:t>inserted </w:t></w:r></w:ins>\
             <w:hyperlink><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>",
        );
        assert_eq!(paragraph_runs(&p).len(), 3);
        assert_eq!(extract_paragraph_text(&p), "Kept inserted link");
    }

    #[test]
    fn test_run_formatting() {
        let run = element(
            "<w:r><w:rPr><w:rFonts w:ascii=\"Arial\"/><w:b/><w:i w:val=\"0\"/>\
             <w:sz w:val=\"24\"/><w:u w:val=\"single\"/></w:rPr><w:t>x</w:t></w:r>",
        );
        let props = extract_run_formatting(&run);
        assert_eq!(props.font_name.as_deref(), Some("Arial"));
        assert_eq!(props.font_size, Some(12.0));
        assert_eq!(props.bold, Some(true));
        assert_eq!(props.italic, Some(false));
        assert_eq!(props.underline, Some(true));
    }

    #[test]
    fn test_unformatted_run_inherits_everything() {
        let run = element("<w:r><w:t>x</w:t></w:r>");
        assert_eq!(extract_run_formatting(&run), RunProperties::default());
    }
}
