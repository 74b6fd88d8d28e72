//! Excel export of a back-filled table.

use cfrscan_core::{Error, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::info;

use crate::table::{Cell, Table};

/// Write `table` as the only sheet of a new workbook at `output_path`.
pub fn write_sheet(table: &Table, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    write_table(sheet, table).map_err(xlsx_err)?;

    workbook.save(output_path).map_err(xlsx_err)?;

    info!(
        path = %output_path.display(),
        rows = table.rows.len(),
        "Spreadsheet written"
    );
    Ok(())
}

fn write_table(sheet: &mut Worksheet, table: &Table) -> std::result::Result<(), XlsxError> {
    if !table.name.is_empty() {
        sheet.set_name(&table.name)?;
    }

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let (header_row, first_col) = table.origin;

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(header_row, column(first_col, col)?, header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(row_idx + 1)
            .ok()
            .and_then(|offset| header_row.checked_add(offset))
            .ok_or(XlsxError::RowColumnLimitError)?;
        for (col_idx, cell) in row.iter().enumerate() {
            let c = column(first_col, col_idx)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) | Cell::Error(s) => {
                    sheet.write_string(r, c, s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                Cell::DateTime(d) => {
                    sheet.write_number_with_format(r, c, *d, &date_format)?;
                }
            }
        }
    }

    Ok(())
}

fn column(first_col: u32, idx: usize) -> std::result::Result<u16, XlsxError> {
    u32::try_from(idx)
        .ok()
        .and_then(|idx| first_col.checked_add(idx))
        .and_then(|c| u16::try_from(c).ok())
        .ok_or(XlsxError::RowColumnLimitError)
}

fn xlsx_err(e: XlsxError) -> Error {
    Error::Spreadsheet(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_sheet;
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::TempDir;

    #[test]
    fn test_written_table_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archivo_actualizado.xlsx");

        let mut table = Table::new(
            "Buques",
            vec!["BUQUE".into(), "CodigoCFR".into(), "ESLORA".into(), "ACTIVO".into()],
        );
        table.push_row(vec![
            Cell::Text("NUEVO PILAR".into()),
            Cell::Text("ESP000024683".into()),
            Cell::Number(12.5),
            Cell::Bool(true),
        ]);
        table.push_row(vec![
            Cell::Text("ARGOS".into()),
            Cell::Text("No se encontró ningún resultado".into()),
            Cell::Empty,
            Cell::Bool(false),
        ]);

        write_sheet(&table, &path).unwrap();
        let back = read_sheet(&path, 0).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_offset_table_is_written_in_place() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("licencias.xlsx");
        let output = dir.path().join("archivo_actualizado.xlsx");

        // data starts at B1: column A is blank
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Buques").unwrap();
        sheet.write_string(0, 1, "BUQUE").unwrap();
        sheet.write_string(0, 2, "CodigoCFR").unwrap();
        sheet.write_string(1, 1, "NUEVO PILAR").unwrap();
        workbook.save(&input).unwrap();

        let table = read_sheet(&input, 0).unwrap();
        assert_eq!(table.origin, (0, 1));
        write_sheet(&table, &output).unwrap();

        let mut written = open_workbook_auto(&output).unwrap();
        let range = written.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.start(), Some((0, 1)));
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("BUQUE".into())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("NUEVO PILAR".into())));

        assert_eq!(read_sheet(&output, 0).unwrap(), table);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("out.xlsx");
        let table = Table::new("Buques", vec!["BUQUE".into()]);
        assert!(matches!(write_sheet(&table, &path), Err(Error::Spreadsheet(_))));
    }
}
