//! XML reading and writing.
//!
//! A table is a document element whose children are rows. Each row's
//! attributes and child elements are its cells:
//!
//! ```xml
//! <data>
//!   <row>
//!     <id>1</id>
//!     <name>Alice</name>
//!   </row>
//! </data>
//! ```

use std::collections::HashSet;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};

use super::tabular::{free_name, unique_names, TabularData, Value};

/// Parse an XML document into tabular data.
///
/// Elements nested below the cell level are ignored; so is text placed
/// directly inside the root or a row element. Cell text is kept verbatim,
/// including surrounding whitespace.
pub fn parse_xml(input: &str) -> Result<TabularData> {
    let mut reader = Reader::from_str(input);

    let mut names: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<(String, Value)>> = Vec::new();
    let mut seen_root = false;

    // depth 1 = root, 2 = row, 3 = cell
    let mut depth = 0usize;
    let mut current_cell: Option<(String, String)> = None;
    // whitespace inside a cell that wraps child elements is layout, not text
    let mut cell_has_children = false;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| xml_error(position, e))?;

        match event {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => seen_root = true,
                    2 => rows.push(row_attributes(&e, position)?),
                    3 => {
                        current_cell = Some((element_name(&e), String::new()));
                        cell_has_children = false;
                    }
                    _ => cell_has_children = true,
                }
            }
            Event::Empty(e) => match depth + 1 {
                1 => seen_root = true,
                2 => rows.push(row_attributes(&e, position)?),
                3 => {
                    if let Some(row) = rows.last_mut() {
                        row.push((element_name(&e), Value::Null));
                    }
                }
                _ => cell_has_children = true,
            },
            Event::Text(e) => {
                if depth == 3 {
                    if let Some((_, text)) = current_cell.as_mut() {
                        let unescaped = e.unescape().map_err(|err| xml_error(position, err))?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Event::CData(e) => {
                if depth == 3 {
                    if let Some((_, text)) = current_cell.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
            }
            Event::End(_) => {
                if depth == 3 {
                    if let (Some((name, text)), Some(row)) = (current_cell.take(), rows.last_mut()) {
                        let value = if cell_has_children && text.trim().is_empty() {
                            Value::Null
                        } else {
                            Value::infer(&text)
                        };
                        row.push((name, value));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ConvertError::XmlError {
            position: reader.buffer_position(),
            message: "document has no root element".to_string(),
        });
    }

    for row in &rows {
        for (name, _) in row {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
    }

    let table_rows = rows
        .into_iter()
        .map(|mut cells| {
            names
                .iter()
                .map(|name| {
                    cells
                        .iter()
                        .position(|(n, _)| n == name)
                        .map(|i| cells.swap_remove(i).1)
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    let data = TabularData::from_rows(names, table_rows);
    data.require_columns()?;
    Ok(data)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn row_attributes(e: &BytesStart<'_>, position: usize) -> Result<Vec<(String, Value)>> {
    let mut cells = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(position, err))?;
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| xml_error(position, err))?;
        cells.push((name, Value::infer(&value)));
    }
    Ok(cells)
}

fn xml_error(position: usize, err: impl std::fmt::Display) -> ConvertError {
    ConvertError::XmlError {
        position,
        message: err.to_string(),
    }
}

/// Write tabular data as an indented XML document.
///
/// Column names are sanitized into element names and suffixed `_1`, `_2`,
/// ... where two of them collide. The optional index element is named
/// `index` unless a column already uses that name.
pub fn write_xml(data: &TabularData, config: &ConverterConfig) -> Result<String> {
    let root_name = sanitize_name(&config.xml.root_name);
    let row_name = sanitize_name(&config.xml.row_name);
    let column_names = unique_names(data.columns.iter().map(|c| sanitize_name(&c.name)), '_');
    let taken: HashSet<String> = column_names.iter().cloned().collect();
    let index_name = free_name("index", '_', &taken);

    let mut output = Vec::new();
    let mut writer = Writer::new_with_indent(&mut output, b' ', 2);
    let w = |r: std::result::Result<(), quick_xml::Error>| r.map_err(|e| xml_error(0, e));

    w(writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None))))?;
    w(writer.write_event(Event::Start(BytesStart::new(root_name.as_str()))))?;

    for (i, row) in data.rows().enumerate() {
        w(writer.write_event(Event::Start(BytesStart::new(row_name.as_str()))))?;

        if config.write_index {
            w(write_cell(&mut writer, &index_name, &Value::Integer(i as i64)))?;
        }
        for (name, value) in column_names.iter().zip(row) {
            w(write_cell(&mut writer, name, value))?;
        }

        w(writer.write_event(Event::End(BytesEnd::new(row_name.as_str()))))?;
    }

    w(writer.write_event(Event::End(BytesEnd::new(root_name.as_str()))))?;

    let mut xml = String::from_utf8(output).map_err(|e| xml_error(0, e))?;
    xml.push('\n');
    Ok(xml)
}

fn write_cell<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
) -> std::result::Result<(), quick_xml::Error> {
    if value.is_null() {
        return writer.write_event(Event::Empty(BytesStart::new(name)));
    }
    let text = value.to_string();
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

/// Turn an arbitrary column name into a valid XML element name.
///
/// Invalid characters become `_`; a name that would start with a digit,
/// `-`, `.` or nothing at all gets a leading `_`.
pub fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let needs_prefix = match out.chars().next() {
        None => true,
        Some(c) => c.is_ascii_digit() || matches!(c, '-' | '.'),
    };
    if needs_prefix || out.to_ascii_lowercase().starts_with("xml") {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<data>
  <row>
    <id>1</id>
    <name>Alice</name>
  </row>
  <row>
    <id>2</id>
    <name/>
  </row>
</data>
"#;

    #[test]
    fn test_parse_rows_and_cells() {
        let data = parse_xml(SAMPLE).unwrap();
        assert_eq!(data.row_count, 2);
        assert_eq!(data.column_names(), vec!["id", "name"]);
        assert_eq!(data.columns[0].values, vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(
            data.columns[1].values,
            vec![Value::String("Alice".to_string()), Value::Null]
        );
    }

    #[test]
    fn test_parse_attributes_as_columns() {
        let data = parse_xml(r#"<people><person id="1" city="Oslo"><name>Ann</name></person><person id="2"/></people>"#)
            .unwrap();
        assert_eq!(data.column_names(), vec!["id", "city", "name"]);
        assert_eq!(data.columns[0].values, vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(data.columns[1].values[1], Value::Null);
    }

    #[test]
    fn test_parse_entities_and_cdata() {
        let data = parse_xml("<d><r><a>x &amp; y</a><b><![CDATA[<raw>]]></b></r></d>").unwrap();
        assert_eq!(data.columns[0].values[0], Value::String("x & y".to_string()));
        assert_eq!(data.columns[1].values[0], Value::String("<raw>".to_string()));
    }

    #[test]
    fn test_parse_empty_root() {
        let data = parse_xml("<data/>").unwrap();
        assert_eq!(data.row_count, 0);
        assert!(data.is_empty());
    }

    #[test]
    fn test_parse_no_root() {
        assert!(matches!(parse_xml(""), Err(ConvertError::XmlError { .. })));
    }

    #[test]
    fn test_parse_mismatched_tags() {
        assert!(matches!(
            parse_xml("<data><row><a>1</b></row></data>"),
            Err(ConvertError::XmlError { .. })
        ));
    }

    #[test]
    fn test_write_document() {
        let data = parse_xml(SAMPLE).unwrap();
        let out = write_xml(&data, &ConverterConfig::default()).unwrap();
        assert_eq!(out, SAMPLE);
    }

    #[test]
    fn test_write_custom_tags_and_index() {
        let data = parse_xml("<d><r><v>1</v></r></d>").unwrap();
        let mut config = ConverterConfig::default();
        config.write_index = true;
        config.xml.root_name = "items".to_string();
        config.xml.row_name = "item".to_string();
        let out = write_xml(&data, &config).unwrap();
        assert!(out.contains("<items>"));
        assert!(out.contains("<item>\n    <index>0</index>\n    <v>1</v>\n  </item>"));
    }

    #[test]
    fn test_write_escapes_text() {
        let data = TabularData::from_rows(
            vec!["note".to_string()],
            vec![vec![Value::String("a < b & c".to_string())]],
        );
        let out = write_xml(&data, &ConverterConfig::default()).unwrap();
        assert!(out.contains("<note>a &lt; b &amp; c</note>"));
        assert_eq!(parse_xml(&out).unwrap(), data);
    }

    #[test]
    fn test_cell_whitespace_is_kept() {
        let data = TabularData::from_rows(
            vec!["v".to_string()],
            vec![vec![Value::String("  x  ".to_string())]],
        );
        let out = write_xml(&data, &ConverterConfig::default()).unwrap();
        assert!(out.contains("<v>  x  </v>"));
        assert_eq!(parse_xml(&out).unwrap(), data);
    }

    #[test]
    fn test_parse_cell_with_children_is_null() {
        let data = parse_xml("<d>\n  <r>\n    <a>\n      <b>1</b>\n    </a>\n  </r>\n</d>").unwrap();
        assert_eq!(data.column_names(), vec!["a"]);
        assert_eq!(data.columns[0].values, vec![Value::Null]);
    }

    #[test]
    fn test_parse_rows_without_cells() {
        assert!(matches!(
            parse_xml("<data><row/><row/></data>"),
            Err(ConvertError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_write_colliding_names_stay_distinct() {
        let data = TabularData::from_rows(
            vec!["a b".to_string(), "a_b".to_string()],
            vec![vec![Value::Integer(1), Value::Integer(2)]],
        );
        let out = write_xml(&data, &ConverterConfig::default()).unwrap();
        assert!(out.contains("<a_b>1</a_b>"));
        assert!(out.contains("<a_b_1>2</a_b_1>"));

        let back = parse_xml(&out).unwrap();
        assert_eq!(back.column_count(), 2);
        assert_eq!(back.columns[0].values, vec![Value::Integer(1)]);
        assert_eq!(back.columns[1].values, vec![Value::Integer(2)]);
    }

    #[test]
    fn test_write_index_avoids_existing_column() {
        let data = TabularData::from_rows(
            vec!["index".to_string(), "v".to_string()],
            vec![vec![Value::Integer(5), Value::Integer(6)]],
        );
        let config = ConverterConfig {
            write_index: true,
            ..Default::default()
        };
        let out = write_xml(&data, &config).unwrap();
        assert!(out.contains("<index_1>0</index_1>\n    <index>5</index>\n    <v>6</v>"));

        let back = parse_xml(&out).unwrap();
        assert_eq!(back.column_names(), vec!["index_1", "index", "v"]);
        assert_eq!(back.column("index").unwrap().values, vec![Value::Integer(5)]);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("name"), "name");
        assert_eq!(sanitize_name("first name"), "first_name");
        assert_eq!(sanitize_name("1st"), "_1st");
        assert_eq!(sanitize_name(""), "_");
        assert_eq!(sanitize_name("Unnamed: 0"), "Unnamed__0");
        assert_eq!(sanitize_name("xmlns"), "_xmlns");
    }
}
