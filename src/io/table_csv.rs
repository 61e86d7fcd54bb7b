//! CSV <-> `Table` conversion.
//!
//! Cells are written with `Value`'s `Display` and read back through
//! `Value::infer`. Snapshots carry an extra leading row-index column with an
//! empty header; pass `index_column = true` to write it or to drop it on read.

use std::io::{Read, Write};

use csv::StringRecord;

use crate::domain::{Table, Value};

/// Parse CSV into a table. The first row is the header.
pub fn read_table<R: Read>(reader: R, index_column: bool) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers = reader.headers()?.clone();

    let skip = usize::from(index_column);
    let mut table = Table::new(headers.iter().skip(skip).map(normalize_header_name).collect());

    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        // Non-flexible readers reject rows whose width differs from the header.
        let row = record.iter().skip(skip).map(Value::infer).collect();
        table.rows_mut().push(row);
    }

    Ok(table)
}

/// Write a table as CSV, optionally prefixed by a row-index column.
pub fn write_table<W: Write>(writer: W, table: &Table, index_column: bool) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    let index_header = index_column.then_some("");
    writer.write_record(index_header.into_iter().chain(table.columns().iter().map(String::as_str)))?;

    let mut fields = Vec::with_capacity(table.columns().len() + 1);
    for (idx, row) in table.rows().iter().enumerate() {
        fields.clear();
        if index_column {
            fields.push(idx.to_string());
        }
        fields.extend(row.iter().map(Value::to_string));
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(())
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}
