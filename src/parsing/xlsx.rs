use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook, open_workbook_from_rs, DataType, Reader, Xlsx};

use crate::parsing::table::{SourceTable, TableError};
use crate::utils::validation::{check_column_limit, check_row_limit};

/// Read a worksheet from an `.xlsx` file on disk.
///
/// # Errors
///
/// Returns `TableError::Workbook` if the workbook cannot be opened and
/// `TableError::SheetNotFound` if the requested sheet does not exist.
pub fn parse_xlsx_file(path: &Path, sheet: Option<&str>) -> Result<SourceTable, TableError> {
    let workbook: Xlsx<_> =
        open_workbook(path).map_err(|e| TableError::Workbook(format!("{e}")))?;
    parse_workbook(workbook, sheet)
}

/// Read a worksheet from in-memory `.xlsx` bytes.
///
/// # Errors
///
/// See [`parse_xlsx_file`].
pub fn parse_xlsx_bytes(data: &[u8], sheet: Option<&str>) -> Result<SourceTable, TableError> {
    let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data))
        .map_err(|e| TableError::Workbook(format!("{e}")))?;
    parse_workbook(workbook, sheet)
}

fn parse_workbook<RS: Read + Seek>(
    mut workbook: Xlsx<RS>,
    sheet: Option<&str>,
) -> Result<SourceTable, TableError> {
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| TableError::SheetNotFound {
                name: name.to_string(),
                available: sheet_names.join(", "),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| TableError::Workbook("No sheets found in workbook".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| TableError::SheetNotFound {
            name: sheet_name.clone(),
            available: sheet_names.join(", "),
        })?
        .map_err(|e| TableError::Workbook(format!("{e}")))?;

    let mut rows_iter = range.rows();

    // First row is headers; an empty sheet has none
    let Some(header_row) = rows_iter.next() else {
        return Ok(SourceTable::default());
    };

    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

    if let Some(msg) = check_column_limit(headers.len()) {
        return Err(TableError::LimitExceeded(msg));
    }

    let mut rows = Vec::new();
    for row in rows_iter {
        if let Some(msg) = check_row_limit(rows.len()) {
            return Err(TableError::LimitExceeded(msg));
        }
        rows.push(row.iter().map(cell_to_string).collect());
    }

    Ok(SourceTable::new(headers, rows))
}

/// Render a cell as the identifier text a user would see in the sheet.
/// Whole-number floats print without a fractional part.
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&DataType::Empty), "");
        assert_eq!(
            cell_to_string(&DataType::String("01-97-1519".to_string())),
            "01-97-1519"
        );
        assert_eq!(cell_to_string(&DataType::Int(42)), "42");
        assert_eq!(cell_to_string(&DataType::Float(1519.0)), "1519");
    }

    const CATALOG_XLSX: &[u8] = include_bytes!("../../tests/data/pkg_catalog.xlsx");
    const SKUS_XLSX: &[u8] = include_bytes!("../../tests/data/skus.xlsx");

    #[test]
    fn test_named_sheet_is_not_first() {
        // Sheets: Other, Sheet1, Empty
        let table = parse_xlsx_bytes(CATALOG_XLSX, Some("Sheet1")).unwrap();
        assert_eq!(table.headers, vec!["PKG1", "PKG2"]);
        assert_eq!(table.column(0).collect::<Vec<_>>(), vec!["A", "B", "C"]);
        // Numeric cell reads back as the identifier, padded ragged cell is blank
        assert_eq!(table.column(1).collect::<Vec<_>>(), vec!["A", "1519", ""]);
    }

    #[test]
    fn test_first_sheet_by_default() {
        let table = parse_xlsx_bytes(CATALOG_XLSX, None).unwrap();
        assert_eq!(table.headers, vec!["X"]);

        let table = parse_xlsx_bytes(SKUS_XLSX, None).unwrap();
        assert_eq!(table.headers, vec!["SKU", "BOM1", "BOM2", "BOM3"]);
        assert_eq!(table.cell(1, 0), "42");
        assert_eq!(table.cell(1, 2), "1519");
    }

    #[test]
    fn test_missing_sheet() {
        let err = parse_xlsx_bytes(CATALOG_XLSX, Some("PKGs")).unwrap_err();
        match err {
            TableError::SheetNotFound { name, available } => {
                assert_eq!(name, "PKGs");
                assert_eq!(available, "Other, Sheet1, Empty");
            }
            other => panic!("expected SheetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_sheet() {
        let table = parse_xlsx_bytes(CATALOG_XLSX, Some("Empty")).unwrap();
        assert_eq!(table, SourceTable::default());
    }

    #[test]
    fn test_not_a_workbook() {
        let err = parse_xlsx_bytes(b"SKU,BOM1\n", None).unwrap_err();
        assert!(matches!(err, TableError::Workbook(_)));
    }
}
