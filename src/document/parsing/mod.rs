//! Document parsing utilities
//!
//! This module contains specialized parsing functions for different
//! document elements: runs and their formatting, styles, and table grids.

pub(crate) mod formatting;
pub(crate) mod styles;
pub mod table;
