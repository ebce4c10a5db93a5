//! Section tree builder
//!
//! Infers the numbered outline of a document from its ordered text lines,
//! links every section to its parent, and cuts each section's text into
//! overlapping chunks that never cross a section boundary.

mod chunk;
mod heading;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::SectionConfig;
use crate::document::{extract_structure, write_json};
use crate::error::{Error, Result};

use chunk::chunk_lines;
use heading::{detect_heading, find_body_start, is_noise_line};

pub const POLICY_STRUCT_VERSION: &str = "policy_struct.v1";

/// A numbered heading node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    /// Number of the enclosing section, empty at top level
    pub parent_id: String,
    pub level: u8,
    pub number: String,
    pub title: String,
    /// First body line of the section (its heading), 0-based
    pub start_line: usize,
    /// One past the section's last body line
    pub end_line: usize,
    pub section_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_index: usize,
    pub text: String,
    pub section_id: String,
    pub section_number: String,
    pub section_title: String,
    pub section_path: String,
    pub section_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStructure {
    pub policy_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_sha256: Option<String>,
    pub is_policy_like: bool,
    pub section_heading_count: usize,
    pub max_level: u8,
    pub line_count: usize,
    pub sections: Vec<Section>,
    pub chunks: Vec<Chunk>,
}

/// Build the section tree and chunks from a document's ordered lines.
pub fn build_sections(lines: &[String], config: &SectionConfig) -> PolicyStructure {
    let cleaned: Vec<String> = lines
        .iter()
        .filter(|line| !is_noise_line(line, &config.noise_titles))
        .cloned()
        .collect();
    let start = find_body_start(&cleaned, config.lookahead_lines);
    let body = &cleaned[start.min(cleaned.len())..];
    debug!(
        "{} lines, {} after cleanup, body starts at {start}",
        lines.len(),
        cleaned.len()
    );

    let sections = detect_sections(body);
    let max_level = sections.iter().map(|s| s.level).max().unwrap_or(0);
    let is_policy_like = sections.len() >= config.min_headings && max_level >= config.min_depth;

    let mut chunks = Vec::new();
    for section in &sections {
        let section_lines = &body[section.start_line..section.end_line];
        for text in chunk_lines(section_lines, config.max_chars, config.overlap_chars) {
            chunks.push(Chunk {
                chunk_index: chunks.len(),
                text,
                section_id: section.section_id.clone(),
                section_number: section.number.clone(),
                section_title: section.title.clone(),
                section_path: section.section_path.clone(),
                section_level: section.level,
            });
        }
    }

    PolicyStructure {
        policy_version: POLICY_STRUCT_VERSION.to_string(),
        doc_path: None,
        doc_sha256: None,
        is_policy_like,
        section_heading_count: sections.len(),
        max_level,
        line_count: body.len(),
        sections,
        chunks,
    }
}

fn detect_sections(body: &[String]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    for (index, line) in body.iter().enumerate() {
        let previous = if index > 0 { body[index - 1].as_str() } else { "" };
        let next = body.get(index + 1).map(String::as_str).unwrap_or("");
        let Some(heading) = detect_heading(line, previous, next) else {
            continue;
        };
        let parent_id = heading
            .number
            .rsplit_once('.')
            .map(|(parent, _)| parent.to_string())
            .unwrap_or_default();
        sections.push(Section {
            section_id: heading.number.clone(),
            parent_id,
            level: heading.level,
            number: heading.number,
            title: heading.title,
            start_line: index,
            end_line: index + 1,
            section_path: String::new(),
        });
    }

    // Each section runs until the next heading
    let starts: Vec<usize> = sections.iter().map(|s| s.start_line).collect();
    for (i, section) in sections.iter_mut().enumerate() {
        section.end_line = starts.get(i + 1).copied().unwrap_or(body.len());
    }

    let paths: Vec<String> = {
        // Later headings win when a number repeats
        let by_id: HashMap<&str, &Section> = sections
            .iter()
            .map(|section| (section.section_id.as_str(), section))
            .collect();
        sections
            .iter()
            .map(|section| breadcrumb(section, &by_id))
            .collect()
    };
    for (section, path) in sections.iter_mut().zip(paths) {
        section.section_path = path;
    }

    sections
}

fn label(section: &Section) -> String {
    format!("{} {}", section.number, section.title).trim().to_string()
}

fn breadcrumb(section: &Section, by_id: &HashMap<&str, &Section>) -> String {
    if section.parent_id.is_empty() {
        return label(section);
    }

    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = section.section_id.as_str();
    while !current.is_empty() {
        if !seen.insert(current) {
            warn!("section {} has a cyclic ancestry", section.section_id);
            break;
        }
        let Some(node) = by_id.get(current) else {
            break;
        };
        chain.push(label(node));
        current = node.parent_id.as_str();
    }

    if chain.is_empty() {
        return label(section);
    }
    chain.reverse();
    chain.join(" > ")
}

/// Extract the section structure of a .docx file.
pub fn extract_policy_structure(path: &Path, config: &SectionConfig) -> Result<PolicyStructure> {
    let structure = extract_structure(path)?;
    let mut policy = build_sections(&structure.lines(), config);

    let bytes = fs::read(path).map_err(|e| Error::parse(path, e.into()))?;
    policy.doc_path = Some(structure.source_file.clone());
    policy.doc_sha256 = Some(format!("{:x}", Sha256::digest(&bytes)));

    info!(
        "{}: {} sections, {} chunks, policy-like: {}",
        structure.file_name,
        policy.section_heading_count,
        policy.chunks.len(),
        policy.is_policy_like
    );
    Ok(policy)
}

/// Sidecar location for a document: `<doc>.policy_struct.v1.json`.
pub fn sidecar_path_for(doc_path: &Path) -> PathBuf {
    let mut name = doc_path.as_os_str().to_owned();
    name.push(format!(".{POLICY_STRUCT_VERSION}.json"));
    PathBuf::from(name)
}

/// Extract the structure and store it next to the document.
pub fn write_sidecar(doc_path: &Path, config: &SectionConfig) -> Result<(PolicyStructure, PathBuf)> {
    let policy = extract_policy_structure(doc_path, config)?;
    let sidecar = sidecar_path_for(doc_path);
    write_json(&sidecar, &policy)?;
    Ok((policy, sidecar))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parent_links_and_breadcrumbs() {
        let result = build_sections(
            &lines(&["1 Intro", "1.1. Purpose", "2 Governance", "2.1. Oversight"]),
            &SectionConfig::default(),
        );
        let numbers: Vec<&str> = result.sections.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, ["1", "1.1", "2", "2.1"]);
        assert_eq!(result.sections[1].parent_id, "1");
        assert_eq!(result.sections[3].parent_id, "2");
        assert_eq!(result.sections[3].section_path, "2 Governance > 2.1 Oversight");
        assert_eq!(result.max_level, 2);
        assert!(!result.is_policy_like);
    }

    #[test]
    fn test_ranges_are_contiguous() {
        let result = build_sections(
            &lines(&["1 Intro", "text a", "1.1. Purpose", "text b", "text c", "2 End"]),
            &SectionConfig::default(),
        );
        let ranges: Vec<(usize, usize)> = result
            .sections
            .iter()
            .map(|s| (s.start_line, s.end_line))
            .collect();
        assert_eq!(ranges, [(0, 2), (2, 5), (5, 6)]);
        assert_eq!(result.line_count, 6);
        assert_eq!(result.chunks[1].text, "1.1. Purpose text b text c");
    }

    #[test]
    fn test_missing_parent_falls_back_to_own_label() {
        let result = build_sections(&lines(&["3.2. Orphan", "body"]), &SectionConfig::default());
        assert_eq!(result.sections[0].parent_id, "3");
        assert_eq!(result.sections[0].section_path, "3.2 Orphan");
    }

    #[test]
    fn test_sidecar_name() {
        assert_eq!(
            sidecar_path_for(Path::new("/data/policy.docx")),
            PathBuf::from("/data/policy.docx.policy_struct.v1.json")
        );
    }
}
