//! Time-axis preparation: timestamp parsing, chronological sort and daily totals.
//!
//! The splitter assumes its input is sorted by time; these helpers are how the
//! pipeline establishes that.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::{Table, Value};
use crate::error::PipelineError;

/// Parse a timestamp cell.
///
/// Accepted forms, in order:
/// - RFC 2822 (`Tue, 01 Jan 2013 00:00:00 GMT`, the API's `sale_date`)
/// - RFC 3339
/// - `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`
/// - `YYYY-MM-DD`
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse every cell of `column` as a timestamp.
pub fn timestamps(table: &Table, table_name: &str, column: &str) -> Result<Vec<NaiveDateTime>, PipelineError> {
    let idx = table.require_column(table_name, column)?;
    table
        .rows()
        .iter()
        .map(|row| {
            let cell = &row[idx];
            cell.as_str()
                .and_then(parse_timestamp)
                .ok_or_else(|| PipelineError::InvalidTimestamp {
                    column: column.to_string(),
                    value: cell.to_string(),
                })
        })
        .collect()
}

/// Stable ascending sort of `table` by the timestamps in `column`.
pub fn sort_by_time(table: &mut Table, table_name: &str, column: &str) -> Result<(), PipelineError> {
    let stamps = timestamps(table, table_name, column)?;
    let mut order: Vec<usize> = (0..stamps.len()).collect();
    order.sort_by_key(|&i| stamps[i]);
    table.reorder(&order);
    Ok(())
}

/// Collapse `table` to one row per calendar day, summing each value column.
///
/// The output has columns `[date_column, value_columns...]`, dates formatted
/// `YYYY-MM-DD`, ascending. Null values count as zero; text is an error.
pub fn daily_totals(
    table: &Table,
    table_name: &str,
    date_column: &str,
    value_columns: &[String],
) -> Result<Table, PipelineError> {
    let stamps = timestamps(table, table_name, date_column)?;
    let value_idx = value_columns
        .iter()
        .map(|c| table.require_column(table_name, c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for (row_idx, (row, stamp)) in table.rows().iter().zip(&stamps).enumerate() {
        let sums = days
            .entry(stamp.date())
            .or_insert_with(|| vec![0.0; value_idx.len()]);
        for (slot, (&col, name)) in value_idx.iter().zip(value_columns).enumerate() {
            match &row[col] {
                Value::Null => {}
                cell => {
                    sums[slot] += cell.as_f64().ok_or_else(|| PipelineError::NonNumeric {
                        column: name.clone(),
                        row: row_idx,
                    })?;
                }
            }
        }
    }

    let mut columns = vec![date_column.to_string()];
    columns.extend(value_columns.iter().cloned());
    let mut out = Table::new(columns);
    for (day, sums) in days {
        let mut row = vec![Value::Text(day.format("%Y-%m-%d").to_string())];
        row.extend(sums.into_iter().map(Value::Float));
        out.push_row(row)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> Table {
        let mut t = Table::new(vec!["sale_date".to_string(), "sale_amount".to_string()]);
        t.push_row(vec![Value::from("Wed, 02 Jan 2013 00:00:00 GMT"), Value::Int(11)]).unwrap();
        t.push_row(vec![Value::from("Tue, 01 Jan 2013 00:00:00 GMT"), Value::Int(13)]).unwrap();
        t.push_row(vec![Value::from("Wed, 02 Jan 2013 00:00:00 GMT"), Value::Float(4.5)]).unwrap();
        t
    }

    #[test]
    fn parses_api_and_iso_formats() {
        let expected = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("Tue, 01 Jan 2013 00:00:00 GMT"), Some(expected));
        assert_eq!(parse_timestamp("2013-01-01"), Some(expected));
        assert_eq!(parse_timestamp("2013-01-01 00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn sort_by_time_is_chronological_and_stable() {
        let mut t = sales();
        sort_by_time(&mut t, "sales", "sale_date").unwrap();
        let amounts: Vec<_> = t.rows().iter().map(|r| r[1].clone()).collect();
        assert_eq!(amounts, vec![Value::Int(13), Value::Int(11), Value::Float(4.5)]);
    }

    #[test]
    fn daily_totals_sums_per_day() {
        let out = daily_totals(&sales(), "sales", "sale_date", &["sale_amount".to_string()]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.get(0, "sale_date"), Some(&Value::from("2013-01-01")));
        assert_eq!(out.numeric_column("daily", "sale_amount").unwrap(), vec![13.0, 15.5]);
    }

    #[test]
    fn unparseable_timestamp_is_an_error() {
        let mut t = sales();
        t.push_row(vec![Value::from("soon"), Value::Int(1)]).unwrap();
        let err = sort_by_time(&mut t, "sales", "sale_date").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTimestamp { ref value, .. } if value == "soon"));
    }
}
