use std::collections::HashSet;
use std::io::Cursor;

use calamine::{CellErrorType, DataType, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate};

use crate::error::{Result, ToolError};
use crate::model::{CellValue, Table};

/// Largest float magnitude that still converts to an integer exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;
/// Bound on date serials, in milliseconds, kept well inside chrono's range.
const MAX_SERIAL_MILLIS: f64 = 1.0e15;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Reads the first worksheet of an in-memory `.xlsx` payload into a dense grid
/// addressed by absolute sheet coordinates, so row `n` of the grid is row `n`
/// of the sheet even when the leading rows are blank.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no worksheets".into()))?;
    let range = read_required_sheet(&mut workbook, &name)?;
    Ok(range_to_grid(&range))
}

/// Interprets `grid` the way a header-row spreadsheet reader does: row
/// `header_row` names the columns and the following non-blank rows become the
/// data rows.
pub fn table_with_header(grid: &[Vec<CellValue>], header_row: usize) -> Result<Table> {
    let header = grid.get(header_row).ok_or_else(|| {
        ToolError::InvalidWorkbook(format!(
            "header row {header_row} is past the end of the sheet ({} rows)",
            grid.len()
        ))
    })?;

    let data: Vec<&[CellValue]> = grid[header_row + 1..]
        .iter()
        .map(|row| trim_trailing_empty(row))
        .filter(|row| !row.is_empty())
        .collect();

    let width = data
        .iter()
        .map(|row| row.len())
        .chain(std::iter::once(trim_trailing_empty(header).len()))
        .max()
        .unwrap_or(0);

    let columns = header_names(header, width);
    let rows = data.into_iter().map(<[CellValue]>::to_vec).collect();
    Ok(Table::from_rows(columns, rows))
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn range_to_grid(range: &Range<DataType>) -> Vec<Vec<CellValue>> {
    let Some((row_offset, col_offset)) = range.start() else {
        return Vec::new();
    };

    let mut grid = vec![Vec::new(); row_offset as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset as usize];
        cells.extend(row.iter().map(cell_value));
        grid.push(cells);
    }
    grid
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::Int(value) => CellValue::Int(*value),
        DataType::Float(value) => float_value(*value),
        DataType::String(value) if value.is_empty() => CellValue::Empty,
        DataType::String(value) => CellValue::String(value.clone()),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::DateTime(serial) => excel_serial_text(*serial)
            .map(CellValue::String)
            .unwrap_or(CellValue::Float(*serial)),
        DataType::Error(CellErrorType::NA) => CellValue::Empty,
        other => CellValue::String(other.to_string()),
    }
}

// Spreadsheets store every number as a double; whole values read back as ints.
fn float_value(value: f64) -> CellValue {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        CellValue::Int(value as i64)
    } else {
        CellValue::Float(value)
    }
}

/// Renders a date serial of the 1900 date system as ISO text. Whole days
/// render as a plain date, anything else with the time of day.
pub fn excel_serial_text(serial: f64) -> Option<String> {
    let millis = (serial * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() > MAX_SERIAL_MILLIS {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let moment = epoch.checked_add_signed(Duration::milliseconds(millis as i64))?;
    let text = if serial.fract() == 0.0 {
        moment.date().format("%Y-%m-%d").to_string()
    } else {
        moment.format("%Y-%m-%d %H:%M:%S").to_string()
    };
    Some(text)
}

fn trim_trailing_empty(row: &[CellValue]) -> &[CellValue] {
    let end = row
        .iter()
        .rposition(|cell| !cell.is_empty())
        .map_or(0, |last| last + 1);
    &row[..end]
}

fn header_names(header: &[CellValue], width: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    (0..width)
        .map(|index| {
            let base = match header.get(index) {
                None | Some(CellValue::Empty) => format!("Unnamed: {index}"),
                Some(cell) => cell.to_string(),
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}
