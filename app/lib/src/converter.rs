//! The format converter.
//!
//! [`Converter`] infers input and output formats from file extensions, picks
//! the matching [`ConversionRule`](crate::registry::ConversionRule), decodes
//! the input into a table and writes it back out in the target format.
//! Every outcome, success or failure, is appended to an [`OutputSink`] once.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::ConverterConfig;
use crate::convert::{self, TabularData};
use crate::error::{ConvertError, Result};
use crate::format::{self, Format};
use crate::registry::RuleSet;
use crate::sink::OutputSink;

/// Summary of a completed conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Input file.
    pub input: PathBuf,
    /// Output file.
    pub output: PathBuf,
    /// Source format.
    pub from: Format,
    /// Target format.
    pub to: Format,
    /// Rows converted.
    pub rows: usize,
    /// Columns converted.
    pub columns: usize,
    /// Size of the written file.
    pub bytes_written: usize,
}

impl ConversionReport {
    /// The user-facing success message.
    pub fn message(&self) -> String {
        format!(
            "Successfully converted {} {} to {} {}",
            format::path_stem(&self.input),
            self.from.extension().to_uppercase(),
            format::path_stem(&self.output),
            self.to.extension().to_uppercase(),
        )
    }
}

/// Converts tabular files between formats.
#[derive(Debug, Clone)]
pub struct Converter {
    rules: RuleSet,
    config: ConverterConfig,
}

impl Converter {
    /// Create a converter with the standard rules and default configuration.
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// Create a converter with the standard rules and the given configuration.
    pub fn with_config(config: ConverterConfig) -> Self {
        Self::with_rules(RuleSet::standard(), config)
    }

    /// Create a converter from an explicit rule set.
    pub fn with_rules(rules: RuleSet, config: ConverterConfig) -> Self {
        Self { rules, config }
    }

    /// Every supported (source, target) pair.
    pub fn supported_conversions(&self) -> Vec<(Format, Format)> {
        self.rules.pairs().collect()
    }

    /// Convert `input` into `output`, reporting the outcome to `sink`.
    ///
    /// No file is written unless the whole conversion succeeds.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        sink: &mut dyn OutputSink,
    ) -> Result<ConversionReport> {
        let result = self.run_conversion(input, output);
        match &result {
            Ok(report) => {
                let message = report.message();
                log::info!(">>> {}", message);
                sink.append(&message);
            }
            Err(e) => {
                log::debug!("conversion of {} failed: {}", input.display(), e);
                sink.append(&format!(">>> {}", e));
            }
        }
        result
    }

    fn run_conversion(&self, input: &Path, output: &Path) -> Result<ConversionReport> {
        let input_ext = format::path_extension(input);
        if input.as_os_str().is_empty() || input_ext.is_empty() {
            return Err(ConvertError::EmptyInput);
        }
        let output_ext = format::path_extension(output);

        let pair = Format::from_extension(&input_ext).zip(Format::from_extension(&output_ext));
        let (from, to, rule) = pair
            .and_then(|(from, to)| self.rules.lookup(from, to).map(|rule| (from, to, rule)))
            .ok_or(ConvertError::UnsupportedConversion {
                from: input_ext.clone(),
                to: output_ext,
            })?;

        log::debug!(
            "converting {} ({}) -> {} ({})",
            input.display(),
            from,
            output.display(),
            to
        );

        let content = read_input(input, &input_ext)?;
        let data = (rule.decode)(&content)?;
        log::debug!("decoded {} rows x {} columns", data.row_count, data.column_count());

        let rendered = (rule.encode)(&data, &self.config)?;
        write_atomically(output, rendered.as_bytes())?;

        Ok(ConversionReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            from,
            to,
            rows: data.row_count,
            columns: data.column_count(),
            bytes_written: rendered.len(),
        })
    }

    /// Decode `input` and append it to `sink` as a rendered table.
    pub fn preview(&self, input: &Path, sink: &mut dyn OutputSink) -> Result<TabularData> {
        let result = self.load(input);
        match &result {
            Ok(data) => {
                let table = convert::write_markdown(data, &self.config)?;
                sink.append(table.trim_end());
                sink.append(&format!(
                    "[{} rows x {} columns]",
                    data.row_count,
                    data.column_count()
                ));
            }
            Err(e) => {
                log::debug!("preview of {} failed: {}", input.display(), e);
                sink.append(&format!(">>> {}", e));
            }
        }
        result
    }

    /// Decode `input` with the reader registered for its extension.
    pub fn load(&self, input: &Path) -> Result<TabularData> {
        let extension = format::path_extension(input);
        if input.as_os_str().is_empty() || extension.is_empty() {
            return Err(ConvertError::EmptyInput);
        }
        let decode = Format::from_extension(&extension)
            .and_then(|format| self.rules.decoder_for(format))
            .ok_or_else(|| ConvertError::UnreadableFormat {
                extension: extension.clone(),
            })?;

        let content = read_input(input, &extension)?;
        decode(&content)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

fn read_input(path: &Path, extension: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ConvertError::FileNotFound {
            format: extension.to_string(),
            path: path.to_path_buf(),
        },
        // Directories fail here on some platforms with an unspecific kind.
        _ if path.is_dir() => ConvertError::FileNotFound {
            format: extension.to_string(),
            path: path.to_path_buf(),
        },
        _ => ConvertError::IoError(e),
    })
}

/// Write `bytes` to a temporary file next to `path`, then move it into place.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(path).map_err(|e| ConvertError::IoError(e.error))?;
    Ok(())
}
