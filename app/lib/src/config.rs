//! Converter configuration.
//!
//! All fields have defaults, so a configuration file only needs to name the
//! settings it changes. Files are read as TOML or JSON depending on their
//! extension.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConvertError, Result};

/// Layout of JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonOrient {
    /// `[{"col": value, ...}, ...]`
    #[default]
    Records,
    /// `{"col": {"0": value, ...}, ...}`
    Columns,
}

/// XML writer settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
    /// Name of the document element.
    pub root_name: String,
    /// Name of the element wrapping each row.
    pub row_name: String,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            root_name: "data".to_string(),
            row_name: "row".to_string(),
        }
    }
}

/// JSON writer settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
    /// Output layout.
    pub orient: JsonOrient,
    /// Pretty-print the output.
    pub pretty: bool,
}

/// Settings shared by every codec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Prepend a zero-based row index column to CSV, XML and Markdown output.
    pub write_index: bool,
    /// XML writer settings.
    pub xml: XmlConfig,
    /// JSON writer settings.
    pub json: JsonConfig,
}

impl ConverterConfig {
    /// Load configuration from a `.toml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Self::from_toml(&content),
            "json" => Self::from_json(&content),
            other => Err(ConvertError::Config(format!(
                "unsupported configuration format '{}' (expected toml or json)",
                other
            ))),
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConvertError::Config(e.to_string()))
    }

    /// Parse configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ConvertError::Config(e.to_string()))
    }
}
