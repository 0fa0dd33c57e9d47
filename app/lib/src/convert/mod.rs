//! Data conversion types and codecs.
//!
//! This module contains types for representing tabular data in a format-agnostic
//! way, and the readers and writers that move it in and out of CSV, XML, JSON
//! and Markdown.

pub mod csv;
pub mod json;
pub mod markdown;
pub mod xml;
mod tabular;

pub use self::csv::{parse_csv, write_csv};
pub use self::json::{parse_json, write_json};
pub use self::markdown::write_markdown;
pub use self::xml::{parse_xml, write_xml};
pub use tabular::{Column, ColumnType, TabularData, Value};
