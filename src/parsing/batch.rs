use std::path::Path;

use thiserror::Error;

use crate::core::query::BomQuery;
use crate::parsing::table::{read_table_bytes, read_table_file, SourceTable, TableError, TableFormat};

/// Column that identifies each row of a batch query file
pub const SKU_COLUMN: &str = "SKU";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("The uploaded file does not contain an '{0}' column.")]
    MissingRequiredColumn(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// One row of a batch query file: a SKU and the BOM components listed for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    pub sku: String,
    pub query: BomQuery,
}

/// Turn a batch table into queries, one per row.
///
/// Every column other than `SKU` holds component identifiers. Blank cells are
/// dropped. The SKU value is passed through unchanged. Rows with no content at
/// all are skipped.
///
/// # Errors
///
/// Returns `BatchError::MissingRequiredColumn` if the header row has no `SKU`
/// column.
pub fn parse_batch_table(table: &SourceTable) -> Result<Vec<BatchQuery>, BatchError> {
    let sku_index = table
        .column_index(SKU_COLUMN)
        .ok_or_else(|| BatchError::MissingRequiredColumn(SKU_COLUMN.to_string()))?;

    let queries = table
        .rows
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            let sku = row.get(sku_index).cloned().unwrap_or_default();
            let query = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != sku_index)
                .map(|(_, cell)| cell)
                .collect();
            BatchQuery { sku, query }
        })
        .collect();

    Ok(queries)
}

/// Read and parse a batch query file (first worksheet for workbooks).
///
/// # Errors
///
/// Returns `BatchError::Table` if the file cannot be read and
/// `BatchError::MissingRequiredColumn` if it has no `SKU` column.
pub fn read_batch_file(
    path: &Path,
    format: Option<TableFormat>,
) -> Result<Vec<BatchQuery>, BatchError> {
    let table = read_table_file(path, format, None)?;
    parse_batch_table(&table)
}

/// Parse batch query content from an upload.
///
/// # Errors
///
/// See [`read_batch_file`].
pub fn read_batch_bytes(data: &[u8], format: TableFormat) -> Result<Vec<BatchQuery>, BatchError> {
    let table = read_table_bytes(data, format, None)?;
    parse_batch_table(&table)
}
