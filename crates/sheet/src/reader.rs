use calamine::{open_workbook_auto, Data, Reader};
use cfrscan_core::{Error, Result};
use std::path::Path;
use tracing::debug;

use crate::table::{Cell, Table};

/// Read one sheet (by zero-based index) of an .xlsx/.xls/.ods workbook.
///
/// The first row of the used range becomes the header row. Where that range
/// starts is kept in `Table::origin` so the sheet can be written back in place.
pub fn read_sheet(path: &Path, sheet_index: usize) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| Error::Spreadsheet(format!("Failed to open {}: {}", path.display(), e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let name = sheet_names.get(sheet_index).cloned().ok_or_else(|| {
        Error::Spreadsheet(format!(
            "{} has {} sheet(s), no sheet at index {}",
            path.display(),
            sheet_names.len(),
            sheet_index
        ))
    })?;

    let range = workbook
        .worksheet_range_at(sheet_index)
        .ok_or_else(|| Error::Spreadsheet(format!("Sheet '{}' not found", name)))?
        .map_err(|e| Error::Spreadsheet(format!("Failed to read sheet '{}': {}", name, e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| Error::Spreadsheet(format!("Sheet '{}' has no header row", name)))?
        .iter()
        .map(|cell| to_cell(cell).to_string().trim().to_string())
        .collect();

    let mut table = Table::new(name, headers);
    table.origin = range.start().unwrap_or((0, 0));
    for row in rows {
        table.push_row(row.iter().map(to_cell).collect());
    }

    debug!(
        sheet = %table.name,
        origin = ?table.origin,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Sheet read"
    );
    Ok(table)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(format!("{}", e)),
    }
}
