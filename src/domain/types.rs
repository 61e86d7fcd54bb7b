//! Shared domain types.
//!
//! These types are intentionally schema-less: a [`Table`] is whatever columns
//! its source returned, in the order the source listed them. This lets the same
//! type carry API records, CSV downloads, SQL results, merged tables and
//! forecast windows.

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::PipelineError;

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Convert a JSON scalar into a cell.
    ///
    /// Nested arrays/objects are kept as their compact JSON text; records from
    /// the API are flat, so this only matters for unexpected payloads.
    pub fn from_json(value: &serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    /// Infer a cell from CSV text.
    ///
    /// Integers with a leading zero (UPC codes, zip codes) stay text so they
    /// survive a snapshot round trip unchanged.
    pub fn infer(raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Null;
        }
        match raw {
            "true" | "True" => return Value::Bool(true),
            "false" | "False" => return Value::Bool(false),
            _ => {}
        }
        if looks_like_int(raw) {
            if let Ok(v) = raw.parse::<i64>() {
                return Value::Int(v);
            }
        }
        if looks_like_float(raw) {
            if let Ok(v) = raw.parse::<f64>() {
                if v.is_finite() {
                    return Value::Float(v);
                }
            }
        }
        Value::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell (integers widen to `f64`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            // `{:?}` keeps the trailing `.0` so floats re-infer as floats.
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

fn looks_like_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
}

fn looks_like_float(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

/// An ordered, row-major table whose rows share one column set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a single-column float table (forecast outputs, test fixtures).
    pub fn from_column(name: &str, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            columns: vec![name.to_string()],
            rows: values.into_iter().map(|v| vec![Value::Float(v)]).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Like [`Table::column_index`], but reports the missing column as an error.
    pub fn require_column(&self, table: &str, column: &str) -> Result<usize, PipelineError> {
        self.column_index(column).ok_or_else(|| PipelineError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Append a column, filling every existing row with `Null`.
    pub fn add_column(&mut self, name: impl Into<String>) -> usize {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }

    /// Append a positional row; its width must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), PipelineError> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::ShapeMismatch(format!(
                "row has {} values but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a record given as `(field, value)` pairs.
    ///
    /// Unknown fields become new columns (null for earlier rows); fields the
    /// record lacks are null.
    pub fn push_record<K: AsRef<str>>(&mut self, fields: impl IntoIterator<Item = (K, Value)>) {
        let mut row = vec![Value::Null; self.columns.len()];
        for (name, value) in fields {
            let idx = match self.column_index(name.as_ref()) {
                Some(idx) => idx,
                None => {
                    let idx = self.add_column(name.as_ref());
                    row.push(Value::Null);
                    idx
                }
            };
            row[idx] = value;
        }
        self.rows.push(row);
    }

    /// Rename a column. Returns `false` when `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Copy a contiguous range of rows. Out-of-range bounds are clamped.
    pub fn slice(&self, range: Range<usize>) -> Table {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        Table {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Append all rows of `other`, which must have identical columns.
    pub fn extend_from(&mut self, other: &Table) -> Result<(), PipelineError> {
        if self.columns != other.columns {
            return Err(PipelineError::ShapeMismatch(format!(
                "cannot append table with columns {:?} to table with columns {:?}",
                other.columns, self.columns
            )));
        }
        self.rows.extend(other.rows.iter().cloned());
        Ok(())
    }

    /// Reorder rows by a permutation of row indices.
    pub fn reorder(&mut self, order: &[usize]) {
        let rows = std::mem::take(&mut self.rows);
        let mut slots: Vec<Option<Vec<Value>>> = rows.into_iter().map(Some).collect();
        self.rows = order.iter().filter_map(|&i| slots.get_mut(i).and_then(Option::take)).collect();
    }

    /// Read a column as floats. Null or non-numeric cells are errors.
    pub fn numeric_column(&self, table: &str, column: &str) -> Result<Vec<f64>, PipelineError> {
        let idx = self.require_column(table, column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, values)| {
                values[idx].as_f64().ok_or_else(|| PipelineError::NonNumeric {
                    column: column.to_string(),
                    row,
                })
            })
            .collect()
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Value>> {
        &mut self.rows
    }
}

/// REST datasets the `acquire` command knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RestDataset {
    Items,
    Stores,
    Sales,
    /// Sales joined with stores and items.
    Merged,
    All,
}

/// Which baseline forecaster(s) to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelSpec {
    Last,
    Average,
    MovingAverage,
    Trend,
    All,
}

/// Acquisition settings shared by every data source.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Scheme + host of the paginated API (e.g. `https://python.zgulde.net`).
    pub api_base: String,
    pub power_url: String,
    /// Directory holding the CSV snapshots.
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
}

/// A full evaluation run's configuration, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Snapshot name to evaluate (`sales_data`, `power_data`, ...).
    pub dataset: String,
    pub date_column: String,
    pub targets: Vec<String>,
    /// Collapse to one row per day (sum of each target) before splitting.
    pub daily: bool,
    pub train_fraction: f64,
    pub validate_fraction: f64,
    pub model_spec: ModelSpec,
    pub window: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub plot_svg: Option<PathBuf>,
    pub export_eval: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_keeps_leading_zero_identifiers_as_text() {
        assert_eq!(Value::infer("035200264013"), Value::Text("035200264013".to_string()));
        assert_eq!(Value::infer("0"), Value::Int(0));
        assert_eq!(Value::infer("-12"), Value::Int(-12));
        assert_eq!(Value::infer("13.5"), Value::Float(13.5));
        assert_eq!(Value::infer("1e3"), Value::Float(1000.0));
        assert_eq!(Value::infer(""), Value::Null);
        assert_eq!(Value::infer("True"), Value::Bool(true));
        assert_eq!(
            Value::infer("Tue, 01 Jan 2013 00:00:00 GMT"),
            Value::Text("Tue, 01 Jan 2013 00:00:00 GMT".to_string())
        );
    }

    #[test]
    fn float_display_reinfers_as_float() {
        let v = Value::Float(5.0);
        assert_eq!(v.to_string(), "5.0");
        assert_eq!(Value::infer(&v.to_string()), v);
    }

    #[test]
    fn push_record_backfills_new_columns() {
        let mut table = Table::default();
        table.push_record([("a", Value::Int(1))]);
        table.push_record([("b", Value::Int(2)), ("a", Value::Int(3))]);

        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.rows()[0], vec![Value::Int(1), Value::Null]);
        assert_eq!(table.rows()[1], vec![Value::Int(3), Value::Int(2)]);
    }

    #[test]
    fn numeric_column_rejects_text() {
        let mut table = Table::new(vec!["x".to_string()]);
        table.push_row(vec![Value::Int(1)]).unwrap();
        table.push_row(vec![Value::from("n/a")]).unwrap();

        let err = table.numeric_column("t", "x").unwrap_err();
        assert!(matches!(err, PipelineError::NonNumeric { row: 1, .. }));
    }

    #[test]
    fn reorder_applies_permutation() {
        let mut table = Table::from_column("x", [1.0, 2.0, 3.0]);
        table.reorder(&[2, 0, 1]);
        assert_eq!(table.numeric_column("t", "x").unwrap(), vec![3.0, 1.0, 2.0]);
    }
}
