//! # tabconv
//!
//! Conversion of tabular data files between CSV, XML, JSON and Markdown.
//!
//! Formats are inferred from file extensions. Each supported (source, target)
//! pair is a [`ConversionRule`] in a [`RuleSet`]; the [`Converter`] looks the
//! pair up, decodes the input into [`TabularData`] and encodes it to the
//! output file, reporting the outcome to an [`OutputSink`].
//!
//! ```no_run
//! use std::path::Path;
//! use tabconv::{Converter, MemorySink};
//!
//! let mut sink = MemorySink::new();
//! Converter::new().convert(Path::new("data.csv"), Path::new("data.xml"), &mut sink)?;
//! # Ok::<(), tabconv::ConvertError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod convert;
pub mod converter;
pub mod error;
pub mod format;
pub mod registry;
pub mod sink;
pub mod worker;

pub use config::{ConverterConfig, JsonConfig, JsonOrient, XmlConfig};
pub use convert::{Column, ColumnType, TabularData, Value};
pub use converter::{ConversionReport, Converter};
pub use error::{ConvertError, Result};
pub use format::Format;
pub use registry::{ConversionRule, DecodeFn, EncodeFn, RuleSet};
pub use sink::{ChannelSink, MemorySink, OutputSink, WriterSink};
pub use worker::{ConversionTicket, ConversionWorker};
