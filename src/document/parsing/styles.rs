//! Paragraph style resolution from `word/styles.xml`

use std::collections::HashMap;

use crate::ooxml::XmlElement;

const FALLBACK_STYLE: &str = "Normal";

/// Style id to display name lookup.
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleCatalog {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleCatalog {
    pub(crate) fn from_styles(styles: Option<&XmlElement>) -> Self {
        let mut catalog = StyleCatalog::default();
        let Some(styles) = styles else {
            return catalog;
        };

        for style in styles.children_named("w:style") {
            let Some(id) = style.attr("w:styleId") else {
                continue;
            };
            let name = style
                .child_attr("w:name", "w:val")
                .map(display_name)
                .unwrap_or_else(|| id.to_string());

            let is_paragraph = style.attr("w:type") == Some("paragraph");
            let is_default = matches!(style.attr("w:default"), Some("1" | "true" | "on"));
            if is_paragraph && is_default && catalog.default_paragraph.is_none() {
                catalog.default_paragraph = Some(name.clone());
            }
            catalog.names.insert(id.to_string(), name);
        }
        catalog
    }

    /// Display name of a paragraph's style.
    pub(crate) fn paragraph_style(&self, paragraph: &XmlElement) -> String {
        match paragraph.find_path(&["w:pPr", "w:pStyle"]).and_then(|s| s.attr("w:val")) {
            Some(id) => self
                .names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            None => self
                .default_paragraph
                .clone()
                .unwrap_or_else(|| FALLBACK_STYLE.to_string()),
        }
    }
}

/// Word stores built-in style names in lowercase ("heading 1"); present them
/// the way the UI does.
fn display_name(name: &str) -> String {
    let lower = name.to_lowercase();
    if let Some(level) = lower.strip_prefix("heading ") {
        if level.chars().all(|c| c.is_ascii_digit()) {
            return format!("Heading {level}");
        }
    }
    match lower.as_str() {
        "normal" => "Normal".to_string(),
        "title" => "Title".to_string(),
        "subtitle" => "Subtitle".to_string(),
        "caption" => "Caption".to_string(),
        "header" => "Header".to_string(),
        "footer" => "Footer".to_string(),
        "toc heading" => "TOC Heading".to_string(),
        "list paragraph" => "List Paragraph".to_string(),
        "body text" => "Body Text".to_string(),
        _ => name.to_string(),
    }
}
