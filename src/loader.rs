use std::collections::HashMap;

use tracing::{debug, error, info, instrument};

use crate::error::{Result, ToolError};
use crate::io::excel_read::{read_first_sheet, table_with_header};
use crate::io::http::Downloader;
use crate::model::{CellValue, Table};

/// Sheet row (zero based) holding the column headers.
pub const HEADER_ROW: usize = 8;
/// Number of descriptive rows between the header and the data records.
pub const DESCRIPTIVE_ROWS: usize = 8;
/// Columns passed through [`CellValue::numeric_or_absent`].
pub const NUMERIC_COLUMNS: [usize; 3] = [1, 2, 3];
/// Name of the column carrying the school year of the file.
pub const SCHOOL_YEAR_COLUMN: &str = "School year";
/// Canonical names for the first four columns of a data file.
pub const CANONICAL_COLUMNS: [&str; 4] = [
    "State",
    "Number LEAs",
    "Number children who received CEIS",
    "Number children who received CEIS and special education services",
];

const SCHOOL_YEAR_CELL: (usize, usize) = (1, 1);
const PREVIEW_ROWS: usize = 5;

/// Downloads and normalizes the spreadsheet at `url`.
///
/// Any failure is logged together with the URL and reported as `None` so the
/// caller can skip the file.
pub fn retrieve_data<D>(downloader: &D, url: &str) -> Option<Table>
where
    D: Downloader + ?Sized,
{
    match load(downloader, url) {
        Ok(table) => Some(table),
        Err(err) => {
            error!(url, error = %err, "Error retrieving data file at {url}");
            None
        }
    }
}

#[instrument(level = "info", skip(downloader))]
fn load<D>(downloader: &D, url: &str) -> Result<Table>
where
    D: Downloader + ?Sized,
{
    let bytes = downloader.fetch(url)?;
    let grid = read_first_sheet(&bytes)?;
    normalize(&grid)
}

/// Applies the fixed data file layout to a sheet grid.
///
/// The school year is taken from the unconverted cell so textual years such as
/// `2019-2020` survive the numeric converter. The canonical column names are
/// computed but the returned table keeps the names found in the file.
pub fn normalize(grid: &[Vec<CellValue>]) -> Result<Table> {
    let mut table = table_with_header(grid, HEADER_ROW)?;
    if table.columns().len() < CANONICAL_COLUMNS.len() {
        return Err(ToolError::InvalidWorkbook(format!(
            "expected at least {} columns, found {}",
            CANONICAL_COLUMNS.len(),
            table.columns().len()
        )));
    }

    let (year_row, year_col) = SCHOOL_YEAR_CELL;
    let school_year = table.cell(year_row, year_col).cloned().ok_or_else(|| {
        ToolError::InvalidWorkbook(format!(
            "no school year cell at row {year_row}, found {} rows",
            table.row_count()
        ))
    })?;

    for index in NUMERIC_COLUMNS {
        table.map_column(index, CellValue::numeric_or_absent);
    }
    let table = table.with_constant_column(SCHOOL_YEAR_COLUMN, school_year);
    info!(columns = ?table.columns(), "data file columns");

    // TODO: confirm whether the canonical names should replace the originals;
    // combined output currently carries the names found in each file.
    let renamed = table.renamed(&canonical_column_mapping(table.columns()));
    debug!(columns = ?renamed.columns(), "canonical column names");
    info!("data file preview\n{}", table.head(PREVIEW_ROWS));

    Ok(table.slice_from(DESCRIPTIVE_ROWS))
}

/// Maps the first four of `columns` onto [`CANONICAL_COLUMNS`].
pub fn canonical_column_mapping(columns: &[String]) -> HashMap<String, String> {
    columns
        .iter()
        .zip(CANONICAL_COLUMNS)
        .map(|(current, canonical)| (current.clone(), canonical.to_string()))
        .collect()
}
