//! Error types for tabular conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting tabular files.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No conversion rule is registered for the requested pair.
    #[error("Unsupported conversion from '{from}' to '{to}'")]
    UnsupportedConversion {
        /// Input extension, lower-cased.
        from: String,
        /// Output extension, lower-cased.
        to: String,
    },

    /// The input path does not resolve to a readable file.
    #[error("{} file not found: {}", .format.to_uppercase(), .path.display())]
    FileNotFound {
        /// Input extension, lower-cased.
        format: String,
        /// Path that could not be opened.
        path: PathBuf,
    },

    /// The input path or its extension is blank.
    #[error("Input is empty, cannot read nothing")]
    EmptyInput,

    /// No decoder is registered for the input format.
    #[error("Cannot read '{extension}' files")]
    UnreadableFormat {
        /// Input extension, lower-cased.
        extension: String,
    },

    /// CSV parsing failed.
    #[error("CSV parse error at line {line}: {message}")]
    CsvParseError {
        /// Line number (1-based) where the error occurred.
        line: u64,
        /// Error message.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    /// XML parsing or writing failed.
    #[error("XML error at position {position}: {message}")]
    XmlError {
        /// Byte offset in the document.
        position: usize,
        /// Error message.
        message: String,
    },

    /// The document parsed but does not describe a table.
    #[error("Invalid table structure: {0}")]
    InvalidStructure(String),

    /// A configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A conversion is already running on the worker.
    #[error("A conversion is already in progress")]
    Busy,

    /// The worker thread panicked before reporting a result.
    #[error("Conversion worker panicked")]
    WorkerPanicked,

    /// I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<csv::Error> for ConvertError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(io) => ConvertError::IoError(io),
            kind => ConvertError::CsvParseError {
                line,
                message: csv_kind_message(&kind),
            },
        }
    }
}

fn csv_kind_message(kind: &csv::ErrorKind) -> String {
    match kind {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {} fields, found {}", expected_len, len),
        csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {}", err),
        other => format!("{:?}", other),
    }
}

impl ConvertError {
    /// Returns true for errors caused by the request itself rather than
    /// by file contents or the environment.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            ConvertError::UnsupportedConversion { .. }
                | ConvertError::EmptyInput
                | ConvertError::UnreadableFormat { .. }
                | ConvertError::FileNotFound { .. }
        )
    }
}
