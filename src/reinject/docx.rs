//! Reinjection into Word documents

use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::document::address::{BlockLocation, address_blocks, document_body_mut, resolve_mut};
use crate::document::BlockAddress;
use crate::document::parsing::formatting::{
    extract_run_text, is_text_child, paragraph_runs, paragraph_runs_mut,
};
use crate::error::{Error, Result};
use crate::ooxml::package::DOCUMENT_PART;
use crate::ooxml::xml::is_xml_char;
use crate::ooxml::{FileKind, XmlElement, XmlNode, open_package};

use super::split::{cell_lines, split_segments};
use super::{TranslationMap, ensure_distinct};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinjectionReport {
    pub ok: bool,
    pub template: String,
    pub output: String,
    pub applied_count: usize,
}

/// Copy `template` to `output`, replacing the text of every mapped block.
pub fn apply_translation_map(template: &Path, output: &Path, map: &TranslationMap) -> Result<ReinjectionReport> {
    let mut package = open_package(template, FileKind::Document)?;
    ensure_distinct(template, output)?;

    let mut document = package
        .required_xml_part(DOCUMENT_PART)
        .map_err(|e| Error::parse(template, e))?;
    let body = document_body_mut(&mut document.root).map_err(|e| Error::parse(template, e))?;

    for id in map.ids().filter(|id| id.parse::<BlockAddress>().is_err()) {
        warn!("{id}: not a block id, skipping");
    }

    let mut applied = 0;
    for block in address_blocks(body) {
        let id = block.address.to_string();
        let Some(text) = map.get(&id) else {
            continue;
        };
        let Some(element) = resolve_mut(body, block.location) else {
            warn!("{id}: block vanished while rewriting");
            continue;
        };
        match block.location {
            BlockLocation::Paragraph { .. } => replace_paragraph_text(element, text, &id),
            BlockLocation::Cell { .. } => replace_cell_text(element, text, &id),
        }
        applied += 1;
    }

    package.set_xml_part(DOCUMENT_PART, &document);
    package.save(output)?;
    info!(
        "applied {applied} of {} translations to {}",
        map.len(),
        output.display()
    );

    Ok(ReinjectionReport {
        ok: true,
        template: template.display().to_string(),
        output: output.display().to_string(),
        applied_count: applied,
    })
}

/// Spread `text` over the paragraph's runs in proportion to their old lengths.
fn replace_paragraph_text(paragraph: &mut XmlElement, text: &str, id: &str) {
    let lengths: Vec<usize> = paragraph_runs(paragraph)
        .into_iter()
        .map(|run| extract_run_text(run).chars().count())
        .collect();

    if lengths.is_empty() {
        debug!("{id}: paragraph has no runs, appending one");
        let mut run = XmlElement::new("w:r");
        run.children.extend(text_nodes(text));
        paragraph.push(run);
        return;
    }

    let segments = split_segments(text, &lengths);
    for (index, (run, segment)) in paragraph_runs_mut(paragraph).into_iter().zip(segments).enumerate() {
        let location = format!("{id}:run{}", index + 1);
        if let Err(e) = write_run_text(run, &segment, &location) {
            warn!("{e}");
        }
    }
}

fn replace_cell_text(cell: &mut XmlElement, text: &str, id: &str) {
    let paragraph_count = cell.children_named("w:p").count();
    if paragraph_count == 0 {
        debug!("{id}: cell has no paragraphs, adding one");
        let mut run = XmlElement::new("w:r");
        run.children.extend(text_nodes(text));
        cell.push(XmlElement::new("w:p").with_child(run));
        return;
    }

    let lines = cell_lines(text, paragraph_count);
    let paragraphs = cell.elements_mut().filter(|element| element.is("w:p"));
    for (paragraph, line) in paragraphs.zip(lines) {
        replace_paragraph_text(paragraph, &line, id);
    }
}

/// Replace the text-bearing children of a run, keeping `w:rPr` and every
/// other child in place.
fn write_run_text(run: &mut XmlElement, segment: &str, location: &str) -> Result<()> {
    if let Some(bad) = segment.chars().find(|c| !is_xml_char(*c)) {
        return Err(Error::ReinjectionWrite {
            location: location.to_string(),
            reason: format!("character U+{:04X} cannot be stored in XML", bad as u32),
        });
    }

    let is_text_node = |node: &XmlNode| matches!(node, XmlNode::Element(element) if is_text_child(element));
    let insert_at = run
        .children
        .iter()
        .position(is_text_node)
        .unwrap_or_else(|| run.position_after("w:rPr"));

    // Nothing before `insert_at` is text, so the index survives the removal
    run.children.retain(|node| !is_text_node(node));
    let nodes = text_nodes(segment);
    run.children.splice(insert_at..insert_at, nodes);
    Ok(())
}

/// `w:t` / `w:tab` / `w:br` nodes spelling out `text`.
fn text_nodes(text: &str) -> Vec<XmlNode> {
    let mut nodes = Vec::new();
    let mut pending = String::new();

    let flush = |pending: &mut String, nodes: &mut Vec<XmlNode>| {
        if !pending.is_empty() {
            let t = XmlElement::new("w:t")
                .with_attr("xml:space", "preserve")
                .with_text(std::mem::take(pending));
            nodes.push(XmlNode::Element(t));
        }
    };

    for c in text.chars() {
        match c {
            '\t' => {
                flush(&mut pending, &mut nodes);
                nodes.push(XmlNode::Element(XmlElement::new("w:tab")));
            }
            '\n' => {
                flush(&mut pending, &mut nodes);
                nodes.push(XmlNode::Element(XmlElement::new("w:br")));
            }
            '\r' => {}
            _ => pending.push(c),
        }
    }
    flush(&mut pending, &mut nodes);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parsing::formatting::extract_paragraph_text;
    use crate::ooxml::XmlDocument;

    fn element(xml: &str) -> XmlElement {
        XmlDocument::parse(xml).unwrap().root
    }

    #[test]
    fn test_paragraph_runs_keep_formatting() {
        let mut paragraph = element(
            "<w:p><w:pPr><w:pStyle w:val=\"Title\"/></w:pPr>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>Hello</w:t></w:r>\
             <w:r><w:rPr><w:i/></w:rPr><w:t xml:space=\"preserve\"> world</w:t></w:r></w:p>",
        );
        replace_paragraph_text(&mut paragraph, "Bonjour le monde", "p:1");

        assert_eq!(extract_paragraph_text(&paragraph), "Bonjour le monde");
        let runs = paragraph_runs(&paragraph);
        // 16 chars over lengths 5 and 6
        assert_eq!(extract_run_text(runs[0]), "Bonjour");
        assert!(runs[0].find_path(&["w:rPr", "w:b"]).is_some());
        assert!(runs[1].find_path(&["w:rPr", "w:i"]).is_some());
        assert!(paragraph.find_path(&["w:pPr", "w:pStyle"]).is_some());
    }

    #[test]
    fn test_tabs_and_breaks_become_elements() {
        let mut run = element("<w:r><w:rPr/><w:t>x</w:t><w:drawing/></w:r>");
        write_run_text(&mut run, "a\tb\nc", "p:1:run1").unwrap();
        let names: Vec<&str> = run.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["w:rPr", "w:t", "w:tab", "w:t", "w:br", "w:t", "w:drawing"]);
        assert_eq!(extract_run_text(&run), "a\tb\nc");
    }

    #[test]
    fn test_page_breaks_and_objects_survive() {
        let mut paragraph = element(
            "<w:p><w:r><w:br w:type=\"page\"/></w:r>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>Hello</w:t><w:br w:type=\"column\"/></w:r>\
             <w:r><w:fldChar w:fldCharType=\"begin\"/></w:r>\
             <w:r><w:drawing/><w:t>x</w:t></w:r>\
             <w:r><w:footnoteReference w:id=\"1\"/></w:r></w:p>",
        );
        replace_paragraph_text(&mut paragraph, "Bonjour", "p:1");

        assert_eq!(extract_paragraph_text(&paragraph), "Bonjour");
        let names = |run: &XmlElement| run.elements().map(|e| e.name.clone()).collect::<Vec<_>>();
        let runs = paragraph_runs(&paragraph);
        assert_eq!(names(runs[0]), ["w:br"]);
        assert_eq!(runs[0].elements().next().unwrap().attr("w:type"), Some("page"));
        assert_eq!(names(runs[1]), ["w:rPr", "w:t", "w:br"]);
        assert_eq!(runs[1].child("w:br").unwrap().attr("w:type"), Some("column"));
        assert_eq!(names(runs[2]), ["w:fldChar"]);
        assert_eq!(names(runs[3])[0], "w:drawing");
        assert_eq!(names(runs[4]), ["w:footnoteReference"]);
    }

    #[test]
    fn test_invalid_character_leaves_run_untouched() {
        let mut run = element("<w:r><w:t>keep</w:t></w:r>");
        let result = write_run_text(&mut run, "bad\u{1}", "p:2:run1");
        assert!(matches!(result, Err(Error::ReinjectionWrite { .. })));
        assert_eq!(extract_run_text(&run), "keep");
    }

    #[test]
    fn test_paragraph_without_runs_gets_one() {
        let mut paragraph = element("<w:p><w:pPr/></w:p>");
        replace_paragraph_text(&mut paragraph, "new", "p:3");
        assert_eq!(extract_paragraph_text(&paragraph), "new");
    }

    #[test]
    fn test_cell_lines_map_to_paragraphs() {
        let mut cell = element(
            "<w:tc><w:tcPr/><w:p><w:r><w:t>one</w:t></w:r></w:p>\
             <w:p><w:r><w:t>two</w:t></w:r></w:p></w:tc>",
        );
        replace_cell_text(&mut cell, "uno\ndos\ntres", "t1:r1:c1");
        let texts: Vec<String> = cell.children_named("w:p").map(extract_paragraph_text).collect();
        assert_eq!(texts, ["uno", "dos tres"]);

        let mut empty = element("<w:tc><w:tcPr/></w:tc>");
        replace_cell_text(&mut empty, "filled", "t1:r1:c2");
        let texts: Vec<String> = empty.children_named("w:p").map(extract_paragraph_text).collect();
        assert_eq!(texts, ["filled"]);
    }
}
