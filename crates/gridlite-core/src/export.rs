//! Read-only export of the current rows
//!
//! Exports dump the model's column names and current rows verbatim, without
//! involving the store and without the boolean display heuristic.

use crate::error::Result;
use crate::model::TableModel;
use crate::value::Value;
use serde::Serialize;
use std::io::Write;

/// Write the model's current rows as CSV (header row first)
pub fn export_csv<W: Write>(model: &TableModel, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(model.column_names())?;
    for row in model.rows() {
        csv_writer.write_record(row.iter().map(Value::to_display_string))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// JSON export shape: table name, column names, and current rows
#[derive(Serialize)]
struct JsonExport<'a> {
    table: &'a str,
    columns: Vec<&'a str>,
    rows: Vec<&'a [Value]>,
}

/// Write the model's current rows as pretty-printed JSON
pub fn export_json<W: Write>(model: &TableModel, mut writer: W) -> Result<()> {
    let export = JsonExport {
        table: model.table_name(),
        columns: model.column_names(),
        rows: model.rows().collect(),
    };
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writeln!(writer)?;
    Ok(())
}
