//! Fidelity validator
//!
//! Compares an original document with its translation feature by feature
//! and scores how well the formatting survived. The file kind is chosen once
//! per pair and dispatched to the matching [`Validator`].

pub mod docx;
pub mod issue;
pub mod report;
pub mod xlsx;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::ValidationConfig;
use crate::error::{Error, Result};
use crate::ooxml::{FileKind, extension_of};

pub use docx::DocumentValidator;
pub use issue::{Category, Issue, Severity, ValidationResult};
pub use report::{ReportOptions, ValidationSummary, fix_hints, markdown, summary};
pub use xlsx::GridValidator;

/// One comparison engine per file kind.
pub trait Validator {
    fn kind(&self) -> FileKind;

    /// Compare a pair of files; read failures become a single critical issue.
    fn validate(&self, original: &Path, translated: &Path) -> ValidationResult;
}

fn validator_for(kind: FileKind, config: &ValidationConfig) -> Option<Box<dyn Validator>> {
    match kind {
        FileKind::Document if config.enable_docx => Some(Box::new(DocumentValidator::new(config.clone()))),
        FileKind::Grid if config.enable_xlsx => Some(Box::new(GridValidator::new(config.clone()))),
        _ => None,
    }
}

/// Validate one original/translated pair.
pub fn validate_file_pair(original: &Path, translated: &Path, config: &ValidationConfig) -> Result<ValidationResult> {
    for path in [original, translated] {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
    }

    let orig_ext = extension_of(original);
    let trans_ext = extension_of(translated);
    if orig_ext != trans_ext {
        return Err(Error::FormatMismatch {
            original: format!(".{orig_ext}"),
            translated: format!(".{trans_ext}"),
        });
    }

    let kind = FileKind::from_path(original)?;
    let validator =
        validator_for(kind, config).ok_or_else(|| Error::UnsupportedFormat(format!(".{orig_ext}")))?;

    let result = validator.validate(original, translated);
    info!(
        "{}: score {:.3}, {} failed, {} warnings",
        result.file_name, result.score, result.failed, result.warnings
    );
    Ok(result)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Validate every original that has a translated counterpart.
///
/// Translations are matched by file name first, then by file stem. Originals
/// without a counterpart are left out of the result.
pub fn validate_pairs(
    originals: &[PathBuf],
    translations: &[PathBuf],
    config: &ValidationConfig,
) -> Vec<(String, ValidationResult)> {
    let by_name: HashMap<String, &PathBuf> = translations
        .iter()
        .map(|path| (file_name(path), path))
        .collect();

    let mut results = Vec::new();
    for original in originals {
        let name = file_name(original);
        let translated = by_name.get(&name).copied().or_else(|| {
            translations
                .iter()
                .find(|candidate| candidate.file_stem() == original.file_stem())
        });
        let Some(translated) = translated else {
            warn!("no translation found for {name}");
            continue;
        };

        let result = validate_file_pair(original, translated, config).unwrap_or_else(|e| {
            warn!("validation of {name} failed: {e}");
            let mut failed = ValidationResult::new(translated, extension_of(original));
            failed.file_name = name.clone();
            failed.add_issue(
                Issue::critical(Category::ValidationError, "file", "validation")
                    .expected("successful validation")
                    .actual(format!("error: {e}"))
                    .hint(format!("Validation failed for {name}: {e}")),
            );
            failed.finish(config);
            failed
        });
        results.push((name, result));
    }
    results
}
