use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Configuration for docfid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub sections: SectionConfig,
    pub delta: DeltaConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Characters of paragraph text inspected for the language hint
    pub language_sample_chars: usize,
    /// Translation units longer than this are truncated (0 disables)
    pub max_chars_per_unit: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            language_sample_chars: 2500,
            max_chars_per_unit: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
    /// Lines scanned after a candidate first heading for a second-level heading
    pub lookahead_lines: usize,
    pub min_headings: usize,
    pub min_depth: u8,
    /// Exact (case-insensitive) boilerplate lines dropped before detection
    pub noise_titles: Vec<String>,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap_chars: 120,
            lookahead_lines: 30,
            min_headings: 8,
            min_depth: 2,
            noise_titles: vec![
                "treasury operations policy".to_string(),
                "table of contents".to_string(),
                "list of tables".to_string(),
                "list of figures".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaConfig {
    /// Added and modified items each contribute at most this many summary entries
    pub summary_limit: usize,
    pub label_chars: usize,
    pub change_chars: usize,
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            summary_limit: 12,
            label_chars: 80,
            change_chars: 140,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enable_docx: bool,
    pub enable_xlsx: bool,

    // Document checks
    pub docx_check_fonts: bool,
    pub docx_check_styles: bool,
    pub docx_check_tables: bool,
    pub docx_check_headers_footers: bool,
    /// Font size tolerance in points
    pub docx_font_size_delta: f32,

    // Spreadsheet checks
    pub xlsx_check_fonts: bool,
    pub xlsx_check_borders: bool,
    pub xlsx_check_fills: bool,
    pub xlsx_check_alignment: bool,
    pub xlsx_check_merged: bool,
    pub xlsx_check_dimensions: bool,
    /// Relative tolerance for column widths and row heights
    pub xlsx_dimension_delta: f64,

    // Scoring
    pub critical_weight: f64,
    pub warning_weight: f64,
    pub pass_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enable_docx: true,
            enable_xlsx: true,
            docx_check_fonts: true,
            docx_check_styles: true,
            docx_check_tables: true,
            docx_check_headers_footers: true,
            docx_font_size_delta: 0.5,
            xlsx_check_fonts: true,
            xlsx_check_borders: true,
            xlsx_check_fills: true,
            xlsx_check_alignment: true,
            xlsx_check_merged: true,
            xlsx_check_dimensions: true,
            xlsx_dimension_delta: 0.1,
            critical_weight: 0.15,
            warning_weight: 0.05,
            pass_threshold: 0.85,
        }
    }
}

impl ValidationConfig {
    /// Apply `DOCFID_VALIDATE_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |key: &str, current: bool| match lookup(key) {
            Some(value) => !matches!(value.trim().to_lowercase().as_str(), "0" | "false" | "no"),
            None => current,
        };

        self.enable_docx = flag("DOCFID_VALIDATE_DOCX", self.enable_docx);
        self.enable_xlsx = flag("DOCFID_VALIDATE_XLSX", self.enable_xlsx);
        self.docx_check_fonts = flag("DOCFID_VALIDATE_FONTS", self.docx_check_fonts);
        self.docx_check_styles = flag("DOCFID_VALIDATE_STYLES", self.docx_check_styles);
        self.docx_check_tables = flag("DOCFID_VALIDATE_TABLES", self.docx_check_tables);
        self.xlsx_check_fonts = flag("DOCFID_VALIDATE_CELL_FONTS", self.xlsx_check_fonts);
        self.xlsx_check_borders = flag("DOCFID_VALIDATE_BORDERS", self.xlsx_check_borders);
        self.xlsx_check_fills = flag("DOCFID_VALIDATE_FILLS", self.xlsx_check_fills);
        self.xlsx_check_merged = flag("DOCFID_VALIDATE_MERGED_CELLS", self.xlsx_check_merged);

        if let Some(delta) = lookup("DOCFID_VALIDATE_FONT_DELTA").and_then(|v| v.trim().parse().ok()) {
            self.docx_font_size_delta = delta;
        }
        if let Some(delta) =
            lookup("DOCFID_VALIDATE_DIMENSION_DELTA").and_then(|v| v.trim().parse().ok())
        {
            self.xlsx_dimension_delta = delta;
        }
    }
}

impl Config {
    /// Load configuration from the config directory, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::get_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            _ => Ok(Config::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config directory
    pub fn save(&self) -> Result<Option<PathBuf>> {
        let Some(config_path) = Self::get_config_path() else {
            return Ok(None);
        };

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(Some(config_path))
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docfid").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<Option<PathBuf>> {
        Config::default().save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [sections]
            max_chars = 400

            [validation]
            critical_weight = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.sections.max_chars, 400);
        assert_eq!(config.sections.overlap_chars, 120);
        assert_eq!(config.validation.critical_weight, 0.2);
        assert_eq!(config.validation.warning_weight, 0.05);
        assert_eq!(config.delta.summary_limit, 12);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DOCFID_VALIDATE_FONTS", "no"),
            ("DOCFID_VALIDATE_BORDERS", "1"),
            ("DOCFID_VALIDATE_FONT_DELTA", "1.5"),
            ("DOCFID_VALIDATE_DIMENSION_DELTA", "garbage"),
        ]
        .into_iter()
        .collect();

        let mut config = ValidationConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert!(!config.docx_check_fonts);
        assert!(config.xlsx_check_borders);
        assert_eq!(config.docx_font_size_delta, 1.5);
        assert_eq!(config.xlsx_dimension_delta, 0.1);
        assert!(config.enable_docx);
    }
}
