//! Heading detection and line cleanup
//!
//! Numbered headings are recognized purely from text: `N.N.N. Title`,
//! `N.N. Title`, `N Title`, and, between two recognized headings, `N. Title`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::normalize_text;

static PAGE_FOOTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d+\s*\|\s*P\s*a\s*g\s*e$").unwrap());
static TOC_LEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{6,}\s*\d+$").unwrap());
static LEVEL_ONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s+(.+)$").unwrap());
static LEVEL_TWO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+\.\d+\.)\s+(.+)$").unwrap());
static LEVEL_THREE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.\d+\.\d+\.)\s+(.+)$").unwrap());
static DOTTED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").unwrap());
static ANY_SUBSECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.").unwrap());
static CAPITALIZED_TOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s+[A-Z]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeadingInfo {
    pub level: u8,
    pub number: String,
    pub title: String,
}

/// Page footers, table-of-contents leaders, denylisted titles and blank lines.
pub(crate) fn is_noise_line(line: &str, noise_titles: &[String]) -> bool {
    let text = normalize_text(line);
    if text.is_empty() {
        return true;
    }
    let lowered = text.to_lowercase();
    if noise_titles
        .iter()
        .any(|title| title.to_lowercase() == lowered)
    {
        return true;
    }
    PAGE_FOOTER.is_match(&text) || TOC_LEADER.is_match(&text)
}

fn is_section_heading(line: &str) -> bool {
    LEVEL_ONE.is_match(line) || LEVEL_TWO.is_match(line) || LEVEL_THREE.is_match(line)
}

/// Index of the first top-level heading followed by a second-level heading
/// within `lookahead` lines; 0 when there is none.
pub(crate) fn find_body_start(lines: &[String], lookahead: usize) -> usize {
    for (index, line) in lines.iter().enumerate() {
        if !LEVEL_ONE.is_match(line) || !CAPITALIZED_TOP.is_match(line) {
            continue;
        }
        let mut window = lines.iter().skip(index + 1).take(lookahead);
        if window.any(|item| ANY_SUBSECTION.is_match(item)) {
            return index;
        }
    }
    0
}

fn capture(regex: &Regex, line: &str, level: u8) -> Option<HeadingInfo> {
    let caps = regex.captures(line)?;
    let number = caps[1].trim_matches('.').to_string();
    let title = normalize_text(&caps[2]);
    if number.is_empty() || title.is_empty() {
        return None;
    }
    Some(HeadingInfo {
        level,
        number,
        title,
    })
}

/// Detect a heading on `line`, using its neighbours to disambiguate `N. Title`.
pub(crate) fn detect_heading(line: &str, previous: &str, next: &str) -> Option<HeadingInfo> {
    if let Some(heading) = capture(&LEVEL_THREE, line, 3) {
        return Some(heading);
    }
    if let Some(heading) = capture(&LEVEL_TWO, line, 2) {
        return Some(heading);
    }
    if let Some(heading) = capture(&LEVEL_ONE, line, 1) {
        return Some(heading);
    }

    // A dotted list item only counts between two headings
    let heading = capture(&DOTTED_ITEM, line, 1)?;
    if is_section_heading(previous) && is_section_heading(next) {
        Some(heading)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_heading_precedence() {
        let h3 = detect_heading("2.4.1. Limits", "", "").unwrap();
        assert_eq!((h3.level, h3.number.as_str(), h3.title.as_str()), (3, "2.4.1", "Limits"));

        let h2 = detect_heading("2.4. Counterparties", "", "").unwrap();
        assert_eq!((h2.level, h2.number.as_str()), (2, "2.4"));

        let h1 = detect_heading("2 Governance", "", "").unwrap();
        assert_eq!((h1.level, h1.number.as_str()), (1, "2"));

        assert_eq!(detect_heading("Plain text", "", ""), None);
    }

    #[test]
    fn test_dotted_item_needs_heading_neighbours() {
        assert_eq!(detect_heading("3. Liquidity", "Some text", "2.1. Next"), None);
        let promoted = detect_heading("3. Liquidity", "2.1. Prior", "3.1. Next").unwrap();
        assert_eq!((promoted.level, promoted.number.as_str()), (1, "3"));
    }

    #[test]
    fn test_noise_lines() {
        let deny = vec!["Table of Contents".to_string()];
        assert!(is_noise_line("12 | Page", &deny));
        assert!(is_noise_line("1 Introduction ........ 4", &deny));
        assert!(is_noise_line("TABLE OF CONTENTS", &deny));
        assert!(is_noise_line("   ", &deny));
        assert!(!is_noise_line("1 Introduction", &deny));
    }

    #[test]
    fn test_body_start_skips_cover_list() {
        let doc = lines(&[
            "1 Prepared by treasury",
            "2 Approved by board",
            "Cover text",
            "1 Introduction",
            "1.1. Purpose",
        ]);
        // The cover items are top-level candidates too, but "1.1." falls in
        // their window; a one-line window isolates the real start.
        assert_eq!(find_body_start(&doc, 30), 0);
        assert_eq!(find_body_start(&doc, 1), 3);
        assert_eq!(find_body_start(&lines(&["no headings"]), 30), 0);
    }
}
