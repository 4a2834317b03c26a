//! Tabular input: an ordered list of rows of text cells.
//!
//! Loading supports CSV files and spreadsheet workbooks (first worksheet).
//! No row is treated as a header; the generator decides which row holds the
//! placeholders. Numeric cells are rendered to text the way a spreadsheet shows
//! them, so `3.0` becomes `"3"`.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use chrono::Timelike;
use tracing::{debug, info};

use crate::error::{Result, StorygenError};
use crate::types::PlaceholderRow;

/// Ordered rows of text cells
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

/// A data row borrowed from a table, with its index in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRow<'a> {
    pub index: usize,
    pub cells: &'a [String],
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a table from string slices (handy for tests and small inputs).
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Load a table, choosing the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        let table = match extension.as_deref() {
            Some("csv") => {
                let file = std::fs::File::open(path)?;
                Self::from_csv_reader(file)
                    .map_err(|e| StorygenError::table(format!("{}: {}", path.display(), e)))?
            }
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => {
                Self::from_workbook(path)?
            }
            Some(ext) => {
                return Err(StorygenError::table(format!(
                    "unsupported table extension: {}",
                    ext
                )));
            }
            None => {
                return Err(StorygenError::table(format!(
                    "{} has no extension",
                    path.display()
                )));
            }
        };

        info!(
            "Loaded table {} ({} rows x {} columns)",
            path.display(),
            table.len(),
            table.width()
        );
        Ok(table)
    }

    /// Parse CSV without headers. Rows may have varying lengths; shape is
    /// checked later against the placeholder row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| StorygenError::table(e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(rows).trimmed())
    }

    pub fn from_csv_str(csv: &str) -> Result<Self> {
        Self::from_csv_reader(csv.as_bytes())
    }

    /// Read the first worksheet of a workbook.
    pub fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| StorygenError::table(format!("open {}: {}", path.display(), e)))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| StorygenError::table(format!("{} has no worksheets", path.display())))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| StorygenError::table(format!("read worksheet {}: {}", sheet_name, e)))?;

        debug!("Reading worksheet {} of {}", sheet_name, path.display());

        // The range starts at the first occupied cell; pad back to A1 so
        // column and row indices match what the user sees in the sheet.
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
        let width = col_offset as usize + range.width();
        let mut rows: Vec<Vec<String>> = vec![vec![String::new(); width]; row_offset as usize];
        rows.extend(range.rows().map(|row| {
            std::iter::repeat_n(String::new(), col_offset as usize)
                .chain(row.iter().map(cell_text))
                .collect()
        }));

        Ok(Self::new(rows).trimmed())
    }

    // Spreadsheets often carry formatted but empty rows at the bottom.
    fn trimmed(mut self) -> Self {
        while self
            .rows
            .last()
            .is_some_and(|row| row.iter().all(|cell| cell.is_empty()))
        {
            self.rows.pop();
        }
        self
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Split into the placeholder row and the remaining data rows.
    ///
    /// Returns `None` for an empty table.
    pub fn split_placeholder_row(
        &self,
        position: PlaceholderRow,
    ) -> Option<(&[String], Vec<DataRow<'_>>)> {
        let placeholder_index = match position {
            PlaceholderRow::First => 0,
            PlaceholderRow::Last => self.rows.len().checked_sub(1)?,
        };
        let placeholders = self.rows.get(placeholder_index)?;

        let data = self
            .rows
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != placeholder_index)
            .map(|(index, cells)| DataRow {
                index,
                cells: cells.as_slice(),
            })
            .collect();

        Some((placeholders.as_slice(), data))
    }
}

/// Textual form of a workbook cell.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => excel_datetime_text(dt).unwrap_or_else(|| dt.to_string()),
        other => other.to_string(),
    }
}

/// Dates as `YYYY-MM-DD` (with ` HH:MM:SS` when there is a time part),
/// durations as `H:MM:SS`.
fn excel_datetime_text(dt: &ExcelDateTime) -> Option<String> {
    if dt.is_duration() {
        let seconds = dt.as_duration()?.num_seconds();
        return Some(format!(
            "{}:{:02}:{:02}",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        ));
    }

    let value = dt.as_datetime()?;
    if value.num_seconds_from_midnight() == 0 {
        Some(value.format("%Y-%m-%d").to_string())
    } else {
        Some(value.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
