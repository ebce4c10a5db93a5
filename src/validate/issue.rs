//! Validation issues and the per-file result accumulator

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use crate::config::ValidationConfig;
use crate::error::Error;
use crate::ooxml::FileKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "error")]
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Font,
    Style,
    Table,
    TableBorders,
    Paragraph,
    HeaderFooter,
    CellFont,
    CellBorder,
    CellFill,
    CellAlignment,
    MergedRegions,
    Dimensions,
    ValidationError,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Font => "font",
            Category::Style => "style",
            Category::Table => "table",
            Category::TableBorders => "table_borders",
            Category::Paragraph => "paragraph",
            Category::HeaderFooter => "header_footer",
            Category::CellFont => "cell_font",
            Category::CellBorder => "cell_border",
            Category::CellFill => "cell_fill",
            Category::CellAlignment => "cell_alignment",
            Category::MergedRegions => "merged_regions",
            Category::Dimensions => "dimensions",
            Category::ValidationError => "validation_error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One formatting difference between an original and its translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: Category,
    pub location: String,
    pub element_type: String,
    pub expected: String,
    pub actual: String,
    #[serde(default)]
    pub fix_hint: String,
}

impl Issue {
    pub fn new(
        severity: Severity,
        category: Category,
        location: impl Into<String>,
        element_type: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            location: location.into(),
            element_type: element_type.into(),
            expected: String::new(),
            actual: String::new(),
            fix_hint: String::new(),
        }
    }

    pub fn critical(category: Category, location: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self::new(Severity::Critical, category, location, element_type)
    }

    pub fn warning(category: Category, location: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, location, element_type)
    }

    pub fn info(category: Category, location: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, location, element_type)
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = expected.into();
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = actual.into();
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = hint.into();
        self
    }
}

/// Outcome of comparing one file pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub file_name: String,
    pub file_path: String,
    pub format_type: String,
    pub valid: bool,
    pub total_checks: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
    #[serde(serialize_with = "round_score")]
    pub score: f64,
    pub issues: Vec<Issue>,
}

fn round_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((score * 1000.0).round() / 1000.0)
}

impl ValidationResult {
    /// An empty result for the translated file `path`.
    pub fn new(path: &Path, format_type: impl Into<String>) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_path: path.display().to_string(),
            format_type: format_type.into(),
            valid: true,
            total_checks: 0,
            passed: 0,
            warnings: 0,
            failed: 0,
            score: 1.0,
            issues: Vec::new(),
        }
    }

    pub fn add_issue(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Critical => self.failed += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
        self.total_checks += 1;
        self.issues.push(issue);
    }

    pub fn add_pass(&mut self) {
        self.passed += 1;
        self.total_checks += 1;
    }

    /// Record `issue` when present, otherwise a pass.
    pub fn record(&mut self, issue: Option<Issue>) {
        match issue {
            Some(issue) => self.add_issue(issue),
            None => self.add_pass(),
        }
    }

    /// Compute the fidelity score and validity from the tallies.
    pub fn finish(&mut self, config: &ValidationConfig) {
        let deductions =
            self.failed as f64 * config.critical_weight + self.warnings as f64 * config.warning_weight;
        self.score = (1.0 - deductions).max(0.0);
        self.valid = self.score >= config.pass_threshold && self.failed == 0;
    }

    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.severity == severity)
    }
}

/// The single critical issue reported when a file cannot be opened.
pub(crate) fn read_failure(kind: FileKind, error: &Error) -> Issue {
    let (element, description) = match kind {
        FileKind::Document => ("document", "DOCX document"),
        FileKind::Grid => ("workbook", "XLSX workbook"),
    };
    Issue::critical(Category::ValidationError, "file", element)
        .expected(format!("valid {} file", kind.format_type().to_uppercase()))
        .actual(format!("read error: {error}"))
        .hint(format!("Ensure translated file is a valid {description}"))
}
