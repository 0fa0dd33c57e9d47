//! JSON reading and writing.
//!
//! Three layouts are accepted on input:
//!
//! - records: `[{"id": 1, "name": "Alice"}, ...]`
//! - columns: `{"id": {"0": 1}, "name": {"0": "Alice"}}`
//! - column arrays: `{"id": [1], "name": ["Alice"]}`
//!
//! Output is records or columns, chosen by [`JsonOrient`].

use serde_json::{Map, Number, Value as JsonValue};

use crate::config::{ConverterConfig, JsonOrient};
use crate::error::{ConvertError, Result};

use super::tabular::{Column, TabularData, Value};

/// Parse JSON text into tabular data.
pub fn parse_json(input: &str) -> Result<TabularData> {
    let document: JsonValue = serde_json::from_str(input)?;
    match document {
        JsonValue::Array(items) => parse_records(items),
        JsonValue::Object(map) => parse_object(map),
        other => Err(ConvertError::InvalidStructure(format!(
            "expected a JSON array or object at the top level, found {}",
            kind_name(&other)
        ))),
    }
}

fn parse_records(items: Vec<JsonValue>) -> Result<TabularData> {
    let mut names: Vec<String> = Vec::new();
    let mut records: Vec<Map<String, JsonValue>> = Vec::with_capacity(items.len());

    for (i, item) in items.into_iter().enumerate() {
        match item {
            JsonValue::Object(map) => {
                for key in map.keys() {
                    if !names.iter().any(|n| n == key) {
                        names.push(key.clone());
                    }
                }
                records.push(map);
            }
            other => {
                return Err(ConvertError::InvalidStructure(format!(
                    "record {} is {}, expected an object",
                    i,
                    kind_name(&other)
                )))
            }
        }
    }

    let rows = records
        .into_iter()
        .map(|mut record| {
            names
                .iter()
                .map(|name| record.remove(name).map(to_value).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    let data = TabularData::from_rows(names, rows);
    data.require_columns()?;
    Ok(data)
}

fn parse_object(map: Map<String, JsonValue>) -> Result<TabularData> {
    if map.values().all(JsonValue::is_array) {
        let mut data = TabularData::new();
        let row_count = map
            .values()
            .filter_map(JsonValue::as_array)
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        for (name, values) in map {
            let mut values: Vec<Value> = match values {
                JsonValue::Array(items) => items.into_iter().map(to_value).collect(),
                _ => Vec::new(),
            };
            values.resize(row_count, Value::Null);
            data.add_column(Column::new(name, values));
        }
        return Ok(data);
    }

    if !map.values().all(JsonValue::is_object) {
        return Err(ConvertError::InvalidStructure(
            "expected every column to be an object of index -> value or an array".to_string(),
        ));
    }

    // Row labels in first-seen order across all columns.
    let mut index: Vec<String> = Vec::new();
    for column in map.values().filter_map(JsonValue::as_object) {
        for key in column.keys() {
            if !index.iter().any(|k| k == key) {
                index.push(key.clone());
            }
        }
    }

    let mut data = TabularData::new();
    for (name, column) in map {
        let mut cells = match column {
            JsonValue::Object(cells) => cells,
            _ => Map::new(),
        };
        let values = index
            .iter()
            .map(|key| cells.remove(key).map(to_value).unwrap_or(Value::Null))
            .collect();
        data.add_column(Column::new(name, values));
    }
    Ok(data)
}

fn to_value(json: JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::String(s),
        nested => Value::String(nested.to_string()),
    }
}

fn from_value(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(n) => JsonValue::Number((*n).into()),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::String(s) => JsonValue::String(s.clone()),
    }
}

fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Write tabular data as JSON text.
pub fn write_json(data: &TabularData, config: &ConverterConfig) -> Result<String> {
    let document = match config.json.orient {
        JsonOrient::Records => JsonValue::Array(
            data.rows()
                .map(|row| {
                    let record: Map<String, JsonValue> = data
                        .columns
                        .iter()
                        .zip(row)
                        .map(|(column, value)| (column.name.clone(), from_value(value)))
                        .collect();
                    JsonValue::Object(record)
                })
                .collect(),
        ),
        JsonOrient::Columns => JsonValue::Object(
            data.columns
                .iter()
                .map(|column| {
                    let cells: Map<String, JsonValue> = column
                        .values
                        .iter()
                        .enumerate()
                        .map(|(i, value)| (i.to_string(), from_value(value)))
                        .collect();
                    (column.name.clone(), JsonValue::Object(cells))
                })
                .collect(),
        ),
    };

    let text = if config.json.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records() {
        let data = parse_json(r#"[{"id": 1, "name": "Alice"}, {"id": 2, "extra": true}]"#).unwrap();
        assert_eq!(data.row_count, 2);
        assert_eq!(data.column_names(), vec!["id", "name", "extra"]);
        assert_eq!(data.columns[1].values[1], Value::Null);
        assert_eq!(data.columns[2].values[1], Value::Boolean(true));
    }

    #[test]
    fn test_parse_preserves_key_order() {
        let data = parse_json(r#"[{"zeta": 1, "alpha": 2}]"#).unwrap();
        assert_eq!(data.column_names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_columns_orient() {
        let data = parse_json(r#"{"id": {"0": 1, "1": 2}, "name": {"0": "Alice", "1": "Bob"}}"#)
            .unwrap();
        assert_eq!(data.row_count, 2);
        assert_eq!(data.columns[1].values[1], Value::String("Bob".to_string()));
    }

    #[test]
    fn test_parse_column_arrays() {
        let data = parse_json(r#"{"a": [1, 2, 3], "b": ["x"]}"#).unwrap();
        assert_eq!(data.row_count, 3);
        assert_eq!(data.columns[1].values[2], Value::Null);
    }

    #[test]
    fn test_parse_nested_values_as_text() {
        let data = parse_json(r#"[{"tags": ["a", "b"], "n": 1.5}]"#).unwrap();
        assert_eq!(data.columns[0].values[0], Value::String(r#"["a","b"]"#.to_string()));
        assert_eq!(data.columns[1].values[0], Value::Float(1.5));
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(matches!(parse_json("42"), Err(ConvertError::InvalidStructure(_))));
        assert!(matches!(parse_json("[1, 2]"), Err(ConvertError::InvalidStructure(_))));
        assert!(matches!(parse_json("{\"a\": 1}"), Err(ConvertError::InvalidStructure(_))));
    }

    #[test]
    fn test_parse_records_without_fields() {
        assert!(matches!(parse_json("[{}, {}]"), Err(ConvertError::InvalidStructure(_))));
        assert!(parse_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_json("[{"), Err(ConvertError::JsonParseError(_))));
    }

    #[test]
    fn test_write_records() {
        let data = parse_json(r#"[{"id": 1, "name": "Alice", "score": null}]"#).unwrap();
        let out = write_json(&data, &ConverterConfig::default()).unwrap();
        assert_eq!(out, r#"[{"id":1,"name":"Alice","score":null}]"#);
    }

    #[test]
    fn test_write_columns() {
        let data = parse_json(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        let mut config = ConverterConfig::default();
        config.json.orient = JsonOrient::Columns;
        let out = write_json(&data, &config).unwrap();
        assert_eq!(out, r#"{"id":{"0":1,"1":2}}"#);
        assert_eq!(parse_json(&out).unwrap(), data);
    }

    #[test]
    fn test_write_empty_table() {
        let out = write_json(&TabularData::new(), &ConverterConfig::default()).unwrap();
        assert_eq!(out, "[]");
    }
}
