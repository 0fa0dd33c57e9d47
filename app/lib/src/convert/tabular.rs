//! Format-agnostic tabular data.
//!
//! Every codec decodes into [`TabularData`] and encodes out of it, so it is
//! the common intermediate form between all supported file formats.

use std::collections::HashSet;
use std::fmt;

use crate::error::{ConvertError, Result};

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value (empty CSV field, JSON null, empty XML element).
    Null,
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// Anything else.
    String(String),
}

impl Value {
    /// Infer a typed value from its textual form.
    ///
    /// Empty text is `Null`; integers, floats and `true`/`false` (any case)
    /// are recognised; everything else stays a string.
    pub fn infer(text: &str) -> Self {
        if text.is_empty() {
            return Value::Null;
        }
        let trimmed = text.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::Integer(n);
        }
        if looks_numeric(trimmed) {
            if let Ok(f) = trimmed.parse::<f64>() {
                return Value::Float(f);
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Boolean(false);
        }
        Value::String(text.to_string())
    }

    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for integers and floats.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

// `str::parse::<f64>` also accepts "inf", "NaN" and "infinity"; only
// digit-bearing text is treated as a number.
fn looks_numeric(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
        }
    }
}

/// Inferred type of a column, derived from its non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Every non-null value is an integer.
    Integer,
    /// Non-null values are integers or floats, at least one float.
    Float,
    /// Every non-null value is a boolean.
    Boolean,
    /// Strings or a mix of kinds.
    String,
    /// The column holds only nulls.
    Empty,
}

impl ColumnType {
    /// Returns true for `Integer` and `Float`.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    fn infer(values: &[Value]) -> Self {
        let mut current = ColumnType::Empty;
        for value in values {
            let kind = match value {
                Value::Null => continue,
                Value::Integer(_) => ColumnType::Integer,
                Value::Float(_) => ColumnType::Float,
                Value::Boolean(_) => ColumnType::Boolean,
                Value::String(_) => return ColumnType::String,
            };
            current = match (current, kind) {
                (ColumnType::Empty, k) => k,
                (a, b) if a == b => a,
                (ColumnType::Integer, ColumnType::Float) | (ColumnType::Float, ColumnType::Integer) => {
                    ColumnType::Float
                }
                _ => return ColumnType::String,
            };
        }
        current
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Cell values, one per row.
    pub values: Vec<Value>,
    /// Type inferred from `values`.
    pub inferred_type: ColumnType,
}

impl Column {
    /// Create a column, inferring its type from the values.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let inferred_type = ColumnType::infer(&values);
        Self {
            name: name.into(),
            values,
            inferred_type,
        }
    }

    /// Number of values in the column.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An in-memory table of named, ordered columns.
///
/// Every column holds exactly `row_count` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularData {
    /// Columns in document order.
    pub columns: Vec<Column>,
    /// Number of rows.
    pub row_count: usize,
}

impl TabularData {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from column names and rows of values.
    ///
    /// Short rows are padded with `Null`; extra cells are dropped.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len();
        let mut buckets: Vec<Vec<Value>> = names
            .iter()
            .map(|_| Vec::with_capacity(row_count))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for bucket in buckets.iter_mut() {
                bucket.push(cells.next().unwrap_or(Value::Null));
            }
        }

        let columns = names
            .into_iter()
            .zip(buckets)
            .map(|(name, values)| Column::new(name, values))
            .collect();

        Self { columns, row_count }
    }

    /// Append a column. The first column fixes the row count; later columns
    /// are padded with `Null` or truncated to match it.
    pub fn add_column(&mut self, mut column: Column) {
        if self.columns.is_empty() {
            self.row_count = column.len();
        } else if column.len() != self.row_count {
            column.values.resize(self.row_count, Value::Null);
            column.inferred_type = ColumnType::infer(&column.values);
        }
        self.columns.push(column);
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Returns true when the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reject tables that have rows but no columns; no format can write
    /// them in a form that reads back with the same shape.
    pub(crate) fn require_columns(&self) -> Result<()> {
        if self.columns.is_empty() && self.row_count > 0 {
            return Err(ConvertError::InvalidStructure(format!(
                "{} rows have no fields",
                self.row_count
            )));
        }
        Ok(())
    }
}

/// First of `base`, `base<sep>1`, `base<sep>2`, ... that is not in `taken`.
pub(crate) fn free_name(base: &str, separator: char, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1usize..)
        .map(|n| format!("{}{}{}", base, separator, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_default()
}

/// Suffix repeated names so every name in the result is distinct.
pub(crate) fn unique_names<I>(names: I, separator: char) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut taken = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let name = free_name(&name, separator, &taken);
            taken.insert(name.clone());
            name
        })
        .collect()
}
