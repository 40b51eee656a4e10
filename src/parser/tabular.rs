//! Tabular (CSV) input reading

use tracing::debug;

use crate::conversion::config::ConversionConfig;
use crate::error::{InputFormat, ParseError, ParseResult};

/// One cell of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Present(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Present(s) => Some(s),
            Cell::Null => None,
        }
    }
}

/// Rectangular table: named columns and rows of the same width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TabularTable {
    /// Build a table, rejecting rows whose width differs from the header
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> ParseResult<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ParseError::new(
                InputFormat::Tabular,
                format!(
                    "row {} has {} fields but the header has {}",
                    index,
                    row.len(),
                    columns.len()
                ),
            ));
        }
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one column, top to bottom
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[index])
    }
}

/// Parse tabular text with a header row.
///
/// Ragged rows are a parse error; nothing is dropped silently. Cells whose
/// trimmed value is one of the configured null markers become [`Cell::Null`].
pub fn read_tabular(text: &str, config: &ConversionConfig) -> ParseResult<TabularTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .delimiter(config.delimiter.as_byte())
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(csv_error)?.clone();
    if headers.is_empty() {
        return Err(ParseError::new(InputFormat::Tabular, "missing header row"));
    }
    let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let row = record
            .iter()
            .map(|raw| {
                if config.is_null_marker(raw) {
                    Cell::Null
                } else {
                    Cell::Present(raw.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    debug!(
        columns = columns.len(),
        rows = rows.len(),
        "tabular input parsed"
    );
    TabularTable::new(columns, rows)
}

fn csv_error(err: csv::Error) -> ParseError {
    let (offset, line) = match err.position() {
        Some(pos) => (Some(pos.byte() as usize), Some(pos.line() as usize)),
        None => (None, None),
    };
    ParseError::new(InputFormat::Tabular, err.to_string())
        .with_offset(offset)
        .with_line(line)
}
