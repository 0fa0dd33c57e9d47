//! File formats and extension handling.

use std::fmt;
use std::path::Path;

/// A tabular file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    /// Comma-separated values.
    Csv,
    /// Extensible Markup Language.
    Xml,
    /// JavaScript Object Notation.
    Json,
    /// Markdown pipe table.
    Markdown,
}

impl Format {
    /// All known formats.
    pub const ALL: [Format; 4] = [Format::Csv, Format::Xml, Format::Json, Format::Markdown];

    /// Parse a format from a file extension, ignoring case and a leading `.`.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match normalize_extension(extension).as_str() {
            "csv" => Some(Format::Csv),
            "xml" => Some(Format::Xml),
            "json" => Some(Format::Json),
            "md" | "markdown" => Some(Format::Markdown),
            _ => None,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Markdown => "md",
        }
    }

    /// Human-readable description, as shown in file pickers.
    pub fn description(&self) -> &'static str {
        match self {
            Format::Csv => "CSV (Comma Separated Value)",
            Format::Xml => "XML (Extensible Markup Language)",
            Format::Json => "JSON (JavaScript Object Notation)",
            Format::Markdown => "Markdown",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Lower-case an extension and strip leading dots.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Normalized extension of `path`, or an empty string when it has none.
pub fn path_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(normalize_extension)
        .unwrap_or_default()
}

/// File name of `path` without its extension.
pub fn path_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
