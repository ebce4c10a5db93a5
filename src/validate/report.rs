//! Validation reports
//!
//! Markdown for human (or model) review, a compact summary for quality gates,
//! and the flat list of fix hints fed back into an automated fix pass.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::issue::{Issue, Severity, ValidationResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
    /// Mean score over all files, rounded to three decimals
    pub score: f64,
    pub by_category: BTreeMap<String, CategoryCounts>,
    pub files_valid: usize,
    pub total_files: usize,
}

pub struct ReportOptions {
    pub include_hints: bool,
    pub max_issues_per_category: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_hints: true,
            max_issues_per_category: 20,
        }
    }
}

struct Totals {
    checks: usize,
    passed: usize,
    warnings: usize,
    failed: usize,
    score: f64,
}

fn totals(results: &[ValidationResult]) -> Totals {
    let score_sum: f64 = results.iter().map(|r| r.score).sum();
    Totals {
        checks: results.iter().map(|r| r.total_checks).sum(),
        passed: results.iter().map(|r| r.passed).sum(),
        warnings: results.iter().map(|r| r.warnings).sum(),
        failed: results.iter().map(|r| r.failed).sum(),
        score: score_sum / results.len().max(1) as f64,
    }
}

fn percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Hints worth acting on: critical and warning issues that carry one.
fn actionable(issue: &Issue) -> bool {
    !issue.fix_hint.is_empty() && matches!(issue.severity, Severity::Critical | Severity::Warning)
}

pub fn markdown(results: &[ValidationResult], options: &ReportOptions) -> Result<String> {
    let mut output = String::new();
    let totals = totals(results);

    writeln!(output, "# Detail Validation Report")?;
    writeln!(output)?;
    writeln!(output, "## Summary")?;
    writeln!(output, "**Total Checks:** {}", totals.checks)?;
    writeln!(output, "**Passed:** {}", totals.passed)?;
    writeln!(output, "**Warnings:** {}", totals.warnings)?;
    writeln!(output, "**Failed:** {}", totals.failed)?;
    writeln!(output, "**Overall Score:** {}", percent(totals.score))?;
    writeln!(output)?;

    let any_issues = results.iter().any(|r| !r.issues.is_empty());
    if any_issues {
        writeln!(output, "## Issues Found")?;
        for result in results.iter().filter(|r| !r.issues.is_empty()) {
            write_file_issues(&mut output, result, options)?;
        }
    }

    writeln!(output)?;
    writeln!(output, "## Summary by Category")?;
    writeln!(output)?;
    let mut by_category: BTreeMap<&str, [usize; 3]> = BTreeMap::new();
    for issue in results.iter().flat_map(|r| &r.issues) {
        let counts = by_category.entry(issue.category.as_str()).or_default();
        match issue.severity {
            Severity::Critical => counts[0] += 1,
            Severity::Warning => counts[1] += 1,
            Severity::Info => counts[2] += 1,
        }
    }
    if !by_category.is_empty() {
        writeln!(output, "| Category | Failed | Warnings | Info |")?;
        writeln!(output, "|----------|--------|----------|------|")?;
        for (category, [failed, warnings, info]) in &by_category {
            writeln!(output, "| {category} | {failed} | {warnings} | {info} |")?;
        }
    }

    if options.include_hints && any_issues {
        writeln!(output)?;
        writeln!(output, "## Recommendations for LLM Fix")?;
        writeln!(output)?;
        let hints = results.iter().flat_map(|r| &r.issues).filter(|i| actionable(i));
        for (number, issue) in hints.enumerate() {
            writeln!(output, "{}. {}", number + 1, issue.fix_hint)?;
        }
    }

    Ok(output.trim_end().to_string())
}

fn write_file_issues(output: &mut String, result: &ValidationResult, options: &ReportOptions) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "### {}", result.file_name)?;
    writeln!(
        output,
        "**Score:** {} | **Issues:** {} ({} failed, {} warnings)",
        percent(result.score),
        result.total_checks,
        result.failed,
        result.warnings
    )?;
    writeln!(output)?;

    let groups = [
        (Severity::Critical, "Errors"),
        (Severity::Warning, "Warnings"),
        (Severity::Info, "Info"),
    ];
    for (severity, heading) in groups {
        // Info entries are only useful alongside their hints
        if severity == Severity::Info && !options.include_hints {
            continue;
        }
        let mut issues = result.issues_with(severity).peekable();
        if issues.peek().is_none() {
            continue;
        }
        writeln!(output, "#### {heading}")?;
        for issue in issues.take(options.max_issues_per_category) {
            write_issue(output, issue, options.include_hints)?;
        }
        writeln!(output)?;
    }
    Ok(())
}

fn write_issue(output: &mut String, issue: &Issue, include_hints: bool) -> Result<()> {
    let marker = match issue.severity {
        Severity::Warning => "⚠️ ",
        _ => "",
    };
    writeln!(
        output,
        "- {marker}**[{}]** {}",
        issue.category.as_str().to_uppercase(),
        issue.location
    )?;
    writeln!(output, "  - **Problem:** {}", issue.element_type)?;
    writeln!(output, "  - **Expected:** `{}`", issue.expected)?;
    writeln!(output, "  - **Actual:** `{}`", issue.actual)?;
    if include_hints && !issue.fix_hint.is_empty() {
        writeln!(output, "  - **Fix:** {}", issue.fix_hint)?;
    }
    Ok(())
}

/// Totals for quality-gate integration.
pub fn summary(results: &[ValidationResult]) -> ValidationSummary {
    let totals = totals(results);
    let mut by_category: BTreeMap<String, CategoryCounts> = BTreeMap::new();
    for issue in results.iter().flat_map(|r| &r.issues) {
        let counts = by_category.entry(issue.category.to_string()).or_default();
        if issue.severity == Severity::Critical {
            counts.failed += 1;
        } else {
            counts.passed += 1;
        }
    }

    ValidationSummary {
        total_checks: totals.checks,
        passed: totals.passed,
        warnings: totals.warnings,
        failed: totals.failed,
        score: (totals.score * 1000.0).round() / 1000.0,
        by_category,
        files_valid: results.iter().filter(|r| r.valid).count(),
        total_files: results.len(),
    }
}

/// `<file>: <hint>` for every critical or warning issue with a hint.
pub fn fix_hints(results: &[ValidationResult]) -> Vec<String> {
    results
        .iter()
        .flat_map(|result| {
            result
                .issues
                .iter()
                .filter(|issue| actionable(issue))
                .map(move |issue| format!("{}: {}", result.file_name, issue.fix_hint))
        })
        .collect()
}
