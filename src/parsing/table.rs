use std::path::Path;

use thiserror::Error;

use crate::parsing::{delimited, xlsx};

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to read table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse delimited table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Sheet '{name}' not found (available: {available})")]
    SheetNotFound { name: String, available: String },

    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    LimitExceeded(String),
}

/// Supported tabular file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl TableFormat {
    /// Detect the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("csv") => Some(Self::Csv),
            Some("tsv") => Some(Self::Tsv),
            Some("xlsx" | "xlsm") => Some(Self::Xlsx),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::from_path(Path::new(filename))
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Tsv => "TSV",
            Self::Xlsx => "Excel workbook",
        }
    }
}

/// A header row plus data rows, as read from a spreadsheet or delimited file.
///
/// Rows may be ragged: a row shorter than the header has missing cells at the
/// end. Cells are kept verbatim; trimming happens at ingestion by the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of columns, as given by the header row
    #[must_use]
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// True if no header row was read
    #[must_use]
    pub fn is_headerless(&self) -> bool {
        self.headers.iter().all(|h| h.trim().is_empty())
    }

    /// Index of the first column whose trimmed header equals `name`
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cells of a column below the header; missing cells are skipped
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index).map(String::as_str))
    }

    /// Cell at `(row, column)`, or the empty string for a missing cell
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }
}

/// Read a table from a file. The format is taken from `format` or, if `None`,
/// from the file extension. `sheet` selects a worksheet for workbooks; the
/// first sheet is used when it is `None`.
///
/// # Errors
///
/// Returns `TableError` if the file cannot be read or parsed, or the format
/// cannot be determined.
pub fn read_table_file(
    path: &Path,
    format: Option<TableFormat>,
    sheet: Option<&str>,
) -> Result<SourceTable, TableError> {
    let format = format
        .or_else(|| TableFormat::from_path(path))
        .ok_or_else(|| TableError::UnsupportedFormat(path.display().to_string()))?;

    tracing::debug!(
        "Reading {} table from {}",
        format.display_name(),
        path.display()
    );

    match format {
        TableFormat::Csv => delimited::parse_delimited_file(path, b','),
        TableFormat::Tsv => delimited::parse_delimited_file(path, b'\t'),
        TableFormat::Xlsx => xlsx::parse_xlsx_file(path, sheet),
    }
}

/// Read a table from in-memory bytes (e.g. an upload).
///
/// # Errors
///
/// Returns `TableError` if the content cannot be parsed in the given format.
pub fn read_table_bytes(
    data: &[u8],
    format: TableFormat,
    sheet: Option<&str>,
) -> Result<SourceTable, TableError> {
    match format {
        TableFormat::Csv => delimited::parse_delimited(data, b','),
        TableFormat::Tsv => delimited::parse_delimited(data, b'\t'),
        TableFormat::Xlsx => xlsx::parse_xlsx_bytes(data, sheet),
    }
}
