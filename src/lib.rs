//! docfid: structure extraction and formatting fidelity for office documents
//!
//! This library reads Word (.docx) and spreadsheet (.xlsx) packages, extracts
//! an addressable structure snapshot, builds a numbered section tree, diffs
//! document versions, scores how well a translation preserved the original
//! formatting, and writes translated text back into a copy of the source.

pub mod config;
pub mod delta;
pub mod document;
pub mod error;
pub mod ooxml;
pub mod reinject;
pub mod sections;
pub mod sheet;
pub mod validate;

// Re-export commonly used types
pub use config::Config;
pub use delta::{DeltaPack, build_delta, delta_from_files};
pub use document::{StructureDocument, extract_structure, extract_units};
pub use error::{Error, Result};
pub use ooxml::FileKind;
pub use reinject::{TranslationMap, apply_sheet_translation_map, apply_translation_map};
pub use sections::{PolicyStructure, build_sections, extract_policy_structure};
pub use validate::{ValidationResult, validate_file_pair, validate_pairs};
