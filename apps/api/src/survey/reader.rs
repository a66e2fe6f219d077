//! Reads an uploaded survey file into an untyped table.
//!
//! CSV goes through the `csv` crate; spreadsheets through `calamine` (first
//! worksheet only). Either way the first row is the header row.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use csv::ReaderBuilder;
use tracing::debug;

use crate::survey::SurveyError;

/// A single cell value as read from the upload.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Builds a text cell, mapping blank strings to `Empty`.
    pub fn from_text(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text rendering of the cell; `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// Numeric value of the cell, parsing text when needed.
    ///
    /// Accepts a decimal comma (`"3,5"`) since survey tools in many locales emit it.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) => None,
            Cell::Text(s) => {
                let s = s.trim();
                s.parse::<f64>()
                    .ok()
                    .or_else(|| s.replacen(',', ".", 1).parse::<f64>().ok())
                    .filter(|v| v.is_finite())
            }
        }
    }
}

/// Header row plus data rows. Rows are padded to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        // Fully blank trailing lines are common in spreadsheet exports.
        rows.retain(|row| row.iter().any(|c| !c.is_empty()));
        RawTable { headers, rows }
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.rows[row][column]
    }
}

/// Supported upload encodings, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
}

impl FileKind {
    pub fn from_file_name(file_name: &str) -> Result<FileKind, SurveyError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(FileKind::Spreadsheet),
            _ => Err(SurveyError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Reads an upload into a `RawTable`, picking the decoder from the file name.
pub fn read_table(file_name: &str, bytes: &[u8]) -> Result<RawTable, SurveyError> {
    let table = match FileKind::from_file_name(file_name)? {
        FileKind::Csv => read_csv(bytes)?,
        FileKind::Spreadsheet => read_spreadsheet(bytes)?,
    };
    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SurveyError::Empty);
    }
    debug!(
        "Read survey table {}: {} columns, {} rows",
        file_name,
        table.headers.len(),
        table.rows.len()
    );
    Ok(table)
}

fn read_csv(bytes: &[u8]) -> Result<RawTable, SurveyError> {
    // Excel-exported CSVs often start with a UTF-8 BOM.
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }
    Ok(RawTable::new(headers, rows))
}

fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable, SurveyError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SurveyError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SurveyError::Empty)?
        .map_err(|e| SurveyError::Spreadsheet(e.to_string()))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| spreadsheet_cell(c).as_text().unwrap_or_default())
            .collect(),
        None => return Err(SurveyError::Empty),
    };
    let rows = rows_iter
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();
    Ok(RawTable::new(headers, rows))
}

fn spreadsheet_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        other => match other.as_datetime() {
            Some(dt) => Cell::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::from_text(&other.to_string()),
        },
    }
}
