use std::io::Read;
use std::path::Path;

use crate::parsing::table::{SourceTable, TableError};
use crate::utils::validation::{check_column_limit, check_row_limit};

/// Parse a delimited (CSV/TSV) file. The first record is the header row.
///
/// # Errors
///
/// Returns `TableError::Io` if the file cannot be opened, or other table
/// errors if the content is invalid.
pub fn parse_delimited_file(path: &Path, delimiter: u8) -> Result<SourceTable, TableError> {
    let file = std::fs::File::open(path)?;
    parse_delimited(file, delimiter)
}

/// Parse delimited text. The first record is the header row; later records
/// may be shorter or longer than the header.
///
/// An empty input yields a table with no headers; callers decide whether that
/// is an error.
///
/// # Errors
///
/// Returns `TableError::Csv` on malformed records (e.g. invalid UTF-8) and
/// `TableError::LimitExceeded` if the row or column limits are exceeded.
pub fn parse_delimited<R: Read>(reader: R, delimiter: u8) -> Result<SourceTable, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Ok(SourceTable::default()),
    };

    if let Some(msg) = check_column_limit(headers.len()) {
        return Err(TableError::LimitExceeded(msg));
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;

        if let Some(msg) = check_row_limit(rows.len()) {
            return Err(TableError::LimitExceeded(msg));
        }

        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(SourceTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_ragged_columns() {
        let csv = "PKG1,PKG2\nA,A\nB,B\nC,\n";
        let table = parse_delimited(csv.as_bytes(), b',').unwrap();

        assert_eq!(table.headers, vec!["PKG1", "PKG2"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.cell(2, 0), "C");
        assert_eq!(table.cell(2, 1), "");
    }

    #[test]
    fn test_parse_tsv() {
        let tsv = "SKU\tBOM1\tBOM2\nSKU1\t01-97-1519\t01-97-0451\n";
        let table = parse_delimited(tsv.as_bytes(), b'\t').unwrap();

        assert_eq!(table.headers, vec!["SKU", "BOM1", "BOM2"]);
        assert_eq!(table.cell(0, 2), "01-97-0451");
    }

    #[test]
    fn test_short_rows_are_allowed() {
        let csv = "SKU,BOM1,BOM2,BOM3\nSKU1,A\n";
        let table = parse_delimited(csv.as_bytes(), b',').unwrap();
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.cell(0, 3), "");
    }

    #[test]
    fn test_quoted_cells_keep_delimiters() {
        let csv = "PKG1\n\"A,B\"\n";
        let table = parse_delimited(csv.as_bytes(), b',').unwrap();
        assert_eq!(table.cell(0, 0), "A,B");
    }

    #[test]
    fn test_empty_input_has_no_headers() {
        let table = parse_delimited("".as_bytes(), b',').unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = parse_delimited_file(Path::new("/nonexistent/pkgs.csv"), b',').unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }
}
