use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::Result;
use crate::model::{CellValue, Table};

/// Name of the single worksheet written by [`write_table`].
pub const COMBINED_SHEET: &str = "Combined";

/// Writes the provided table to the given path as a one-sheet workbook.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(COMBINED_SHEET)?;

    for (col_idx, header) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let sheet_col = col_idx as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Int(value) => {
                    worksheet.write_number(sheet_row, sheet_col, *value as f64)?;
                }
                CellValue::Float(value) => {
                    worksheet.write_number(sheet_row, sheet_col, *value)?;
                }
                CellValue::String(value) => {
                    worksheet.write_string(sheet_row, sheet_col, value)?;
                }
                CellValue::Bool(value) => {
                    worksheet.write_boolean(sheet_row, sheet_col, *value)?;
                }
            }
        }
    }

    if !table.columns().is_empty() {
        let mut excel_table = rust_xlsxwriter::Table::new();
        excel_table.set_autofilter(true);
        let col_end = (table.columns().len() as u16).saturating_sub(1);
        let row_end = table.row_count() as u32;
        worksheet.add_table(0, 0, row_end.max(1), col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}
