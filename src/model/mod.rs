use std::collections::HashMap;
use std::fmt;

/// Represents a single cell value read from a data file.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Absent value (blank cell or a value discarded by a converter).
    #[default]
    Empty,
    /// Whole number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Plain string.
    String(String),
    /// Boolean.
    Bool(bool),
}

impl CellValue {
    /// Keeps integers and floats unchanged and maps everything else to
    /// [`CellValue::Empty`].
    pub fn numeric_or_absent(self) -> Self {
        match self {
            CellValue::Int(_) | CellValue::Float(_) => self,
            CellValue::Empty | CellValue::String(_) | CellValue::Bool(_) => CellValue::Empty,
        }
    }

    /// Returns `true` for [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, "None"),
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::String(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{}", if *value { "True" } else { "False" }),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

/// Column-labelled table with a dense positional row index.
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Creates an empty table without columns or rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from column names and rows. Short rows are padded with
    /// [`CellValue::Empty`] and long rows are truncated to the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    /// Position of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cell at the given positional row and column.
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    /// All values of the named column in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&CellValue>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Applies `convert` to every cell of the column at `index`.
    pub fn map_column(&mut self, index: usize, convert: impl Fn(CellValue) -> CellValue) {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = convert(std::mem::take(cell));
            }
        }
    }

    /// Sets `name` to `value` on every row, replacing an existing column of the
    /// same name or appending a new one.
    pub fn with_constant_column(mut self, name: &str, value: CellValue) -> Self {
        match self.column_index(name) {
            Some(index) => {
                for row in &mut self.rows {
                    row[index] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
        self
    }

    /// Drops the first `start` rows. The remaining rows are re-indexed from zero.
    pub fn slice_from(mut self, start: usize) -> Self {
        let start = start.min(self.rows.len());
        self.rows.drain(..start);
        self
    }

    /// First `count` rows.
    pub fn head(&self, count: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(count).cloned().collect(),
        }
    }

    /// Returns a copy with columns renamed according to `mapping`. Columns
    /// absent from the mapping keep their names.
    pub fn renamed(&self, mapping: &HashMap<String, String>) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| mapping.get(column).cloned().unwrap_or_else(|| column.clone()))
            .collect();
        Self {
            columns,
            rows: self.rows.clone(),
        }
    }

    /// Appends the rows of `other` below the existing rows.
    ///
    /// The resulting column set is the union of both tables in order of first
    /// appearance; cells for columns a table does not have are
    /// [`CellValue::Empty`]. The row index stays dense.
    pub fn concat(&mut self, other: Table) {
        let mut positions = Vec::with_capacity(other.columns.len());
        for column in &other.columns {
            let position = match self.column_index(column) {
                Some(position) => position,
                None => {
                    self.columns.push(column.clone());
                    for row in &mut self.rows {
                        row.push(CellValue::Empty);
                    }
                    self.columns.len() - 1
                }
            };
            positions.push(position);
        }

        let width = self.columns.len();
        for source in other.rows {
            let mut row = vec![CellValue::Empty; width];
            for (cell, position) in source.into_iter().zip(&positions) {
                row[*position] = cell;
            }
            self.rows.push(row);
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "Empty table")?;
            writeln!(f, "Columns: [{}]", self.columns.join(", "))?;
            return write!(f, "Index: []");
        }

        let index_labels: Vec<String> = (0..self.rows.len()).map(|i| i.to_string()).collect();
        let index_width = index_labels.iter().map(String::len).max().unwrap_or(0);

        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(CellValue::to_string).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(col_idx, header)| {
                rendered
                    .iter()
                    .map(|row| row[col_idx].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (header, &width) in self.columns.iter().zip(&widths) {
            write!(f, "  {header:>width$}")?;
        }
        for (label, row) in index_labels.iter().zip(&rendered) {
            writeln!(f)?;
            write!(f, "{label:<index_width$}")?;
            for (cell, &width) in row.iter().zip(&widths) {
                write!(f, "  {cell:>width$}")?;
            }
        }
        Ok(())
    }
}
