use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::result::{BatchMatch, ExactMatch, WhereUsed};
use crate::parsing::batch::SKU_COLUMN;

/// Default file name for exported results
pub const DEFAULT_EXPORT_FILENAME: &str = "matching_pkgs.csv";

/// Column holding matched package names (or the no-match sentinel)
pub const MATCHING_PKG_COLUMN: &str = "Matching PKG";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A rendered result: named columns and string rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// `SKU`, `Matching PKG`: one row per batch input row
    #[must_use]
    pub fn from_batch(results: &[BatchMatch]) -> Self {
        let rows = results
            .iter()
            .map(|r| vec![r.sku.clone(), r.result.display_value().to_string()])
            .collect();
        Self::new(
            vec![SKU_COLUMN.to_string(), MATCHING_PKG_COLUMN.to_string()],
            rows,
        )
    }

    /// `Matching PKG`: one row per package, or the sentinel row
    #[must_use]
    pub fn from_where_used(result: &WhereUsed) -> Self {
        let rows = result.display_values().into_iter().map(|v| vec![v]).collect();
        Self::new(vec![MATCHING_PKG_COLUMN.to_string()], rows)
    }

    /// `Matching PKG`: a single row with the match or the sentinel
    #[must_use]
    pub fn from_exact(result: &ExactMatch) -> Self {
        Self::new(
            vec![MATCHING_PKG_COLUMN.to_string()],
            vec![vec![result.display_value().to_string()]],
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as CSV with a header row
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if CSV encoding fails.
    pub fn to_csv_string(&self) -> Result<String, ReportError> {
        let mut buffer = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buffer);
            writer.write_record(&self.columns)?;
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        Ok(String::from_utf8(buffer)?)
    }

    /// Write as CSV to a file
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the file cannot be created or written.
    pub fn write_csv(&self, path: &Path) -> Result<(), ReportError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        tracing::info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Parse a CSV export back into a table
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Csv` on malformed input.
    pub fn from_csv_str(text: &str) -> Result<Self, ReportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|r| r.map(|record| record.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        Ok(Self::new(columns, rows))
    }

    /// Render as left-aligned text columns
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let format_row = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:<w$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&format_row(&self.columns));
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|&w| "-".repeat(w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_row(row));
            out.push('\n');
        }
        out
    }
}
