//! CSV reading and writing.

use std::collections::HashSet;

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};

use super::tabular::{free_name, unique_names, TabularData, Value};

/// Parse CSV text with a header row into tabular data.
///
/// Empty fields become `Null`; other fields are type-inferred. Blank header
/// names become `Unnamed: <index>` and repeated names get `.1`, `.2`, ...
/// suffixes. Input with no header row at all is an empty table.
pub fn parse_csv(input: &str) -> Result<TabularData> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(TabularData::new());
    }
    let names = dedupe_headers(headers.iter());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Value::infer).collect());
    }

    Ok(TabularData::from_rows(names, rows))
}

fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let named = headers.enumerate().map(|(i, raw)| {
        if raw.trim().is_empty() {
            format!("Unnamed: {}", i)
        } else {
            raw.to_string()
        }
    });
    unique_names(named, '.')
}

/// Write tabular data as CSV text with a header row.
///
/// A table without columns is written as an empty document.
pub fn write_csv(data: &TabularData, config: &ConverterConfig) -> Result<String> {
    data.require_columns()?;
    if data.is_empty() && !config.write_index {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header: Vec<String> = Vec::with_capacity(data.column_count() + 1);
    if config.write_index {
        let taken: HashSet<String> = data.columns.iter().map(|c| c.name.clone()).collect();
        header.push(free_name("", '.', &taken));
    }
    header.extend(data.columns.iter().map(|c| c.name.clone()));
    writer.write_record(&header)?;

    for (i, row) in data.rows().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(row.len() + 1);
        if config.write_index {
            record.push(i.to_string());
        }
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConvertError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ConvertError::InvalidStructure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ColumnType;

    #[test]
    fn test_parse_simple() {
        let data = parse_csv("id,name\n1,Alice\n2,Bob\n").unwrap();
        assert_eq!(data.row_count, 2);
        assert_eq!(data.column_names(), vec!["id", "name"]);
        assert_eq!(data.columns[0].inferred_type, ColumnType::Integer);
        assert_eq!(data.columns[1].values[1], Value::String("Bob".to_string()));
    }

    #[test]
    fn test_parse_empty_fields_are_null() {
        let data = parse_csv("a,b\n1,\n,x\n").unwrap();
        assert_eq!(data.columns[0].values, vec![Value::Integer(1), Value::Null]);
        assert_eq!(
            data.columns[1].values,
            vec![Value::Null, Value::String("x".to_string())]
        );
    }

    #[test]
    fn test_parse_header_only() {
        let data = parse_csv("a,b\n").unwrap();
        assert_eq!(data.row_count, 0);
        assert_eq!(data.column_count(), 2);
    }

    #[test]
    fn test_parse_empty_input() {
        let data = parse_csv("").unwrap();
        assert!(data.is_empty());
        assert_eq!(data.row_count, 0);
    }

    #[test]
    fn test_parse_ragged_row() {
        let result = parse_csv("a,b\n1,2\n3\n");
        assert!(matches!(result, Err(ConvertError::CsvParseError { line: 3, .. })));
    }

    #[test]
    fn test_dedupe_headers() {
        let names = dedupe_headers(["a", "a", "", "b", "a"].into_iter());
        assert_eq!(names, vec!["a", "a.1", "Unnamed: 2", "b", "a.2"]);
    }

    #[test]
    fn test_write_quotes_when_needed() {
        let data = TabularData::from_rows(
            vec!["id".to_string(), "note".to_string()],
            vec![vec![Value::Integer(1), Value::String("a, \"b\"".to_string())]],
        );
        let out = write_csv(&data, &ConverterConfig::default()).unwrap();
        assert_eq!(out, "id,note\n1,\"a, \"\"b\"\"\"\n");
    }

    #[test]
    fn test_write_with_index() {
        let data = parse_csv("x\n7\n8\n").unwrap();
        let config = ConverterConfig {
            write_index: true,
            ..Default::default()
        };
        assert_eq!(write_csv(&data, &config).unwrap(), ",x\n0,7\n1,8\n");
    }

    #[test]
    fn test_write_index_header_avoids_blank_column() {
        let data = TabularData::from_rows(vec![String::new()], vec![vec![Value::Integer(5)]]);
        let config = ConverterConfig {
            write_index: true,
            ..Default::default()
        };
        assert_eq!(write_csv(&data, &config).unwrap(), ".1,\n0,5\n");
    }

    #[test]
    fn test_write_empty_table_reads_back_empty() {
        let out = write_csv(&TabularData::new(), &ConverterConfig::default()).unwrap();
        assert_eq!(out, "");
        assert_eq!(parse_csv(&out).unwrap(), TabularData::new());
    }

    #[test]
    fn test_write_rejects_rows_without_columns() {
        let data = TabularData::from_rows(Vec::new(), vec![Vec::new(), Vec::new()]);
        let result = write_csv(&data, &ConverterConfig::default());
        assert!(matches!(result, Err(ConvertError::InvalidStructure(_))));
    }

    #[test]
    fn test_write_null_and_float() {
        let data = parse_csv("a,b\n1.0,\n").unwrap();
        let out = write_csv(&data, &ConverterConfig::default()).unwrap();
        assert_eq!(out, "a,b\n1.0,\n");
    }
}
