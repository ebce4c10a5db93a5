//! Document parsing and data structures module
//!
//! This module loads Microsoft Word (.docx) documents into an addressable
//! model and extracts structure snapshots, content blocks and translation
//! units from them.

pub(crate) mod address;
pub(crate) mod cleanup;
pub mod extract;
pub mod io;
pub mod loader;
pub mod models;
pub(crate) mod parsing;

// Re-export all models and the main entry points
pub use cleanup::{has_arabic, language_hint, normalize_text};
pub use extract::{
    build_structure, content_hash, extract_structure, extract_structure_with, extract_units,
    units_from_structure,
};
pub use io::{read_structure, write_json};
pub use loader::load_document;
pub use models::*;
pub use parsing::table::{CellPosition, TableGrid};
