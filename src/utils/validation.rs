//! Centralized validation and helper functions.

use indexmap::IndexSet;

use crate::parsing::table::TableFormat;

/// Maximum number of data rows accepted from a single table (DOS protection)
pub const MAX_TABLE_ROWS: usize = 100_000;

/// Maximum number of columns accepted from a single table (DOS protection)
pub const MAX_TABLE_COLUMNS: usize = 10_000;

/// Security-related constants for input validation
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MIN_FILE_CONTENT_SIZE: usize = 1;

/// XLSX workbooks are zip archives
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Compute a signature hash from a set of component identifiers.
///
/// The signature is computed by:
/// 1. Sorting the identifiers
/// 2. Joining them with the ASCII unit separator (identifiers may contain commas)
/// 3. Computing MD5 of the concatenated string
///
/// Equal sets always produce equal signatures regardless of input order.
/// The empty set maps to the empty string.
#[must_use]
#[allow(clippy::implicit_hasher)] // Default hasher is fine for this use case
pub fn compute_signature(components: &IndexSet<String>) -> String {
    if components.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&str> = components.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let concatenated = sorted.join("\u{1f}");
    let digest = md5::compute(concatenated.as_bytes());
    format!("{digest:x}")
}

/// Check if adding another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_TABLE_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_TABLE_ROWS}"
        ))
    } else {
        None
    }
}

/// Check a table width against [`MAX_TABLE_COLUMNS`].
#[must_use]
pub fn check_column_limit(count: usize) -> Option<String> {
    if count > MAX_TABLE_COLUMNS {
        Some(format!(
            "Too many columns: {count} exceeds maximum of {MAX_TABLE_COLUMNS}"
        ))
    } else {
        None
    }
}

/// Security validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
    #[error("Empty filename provided")]
    EmptyFilename,
    #[error("File content appears malformed or invalid")]
    InvalidFileContent,
    #[error("File format validation failed")]
    FormatValidationFailed,
}

/// Secure filename validation to prevent directory traversal and other attacks
///
/// Validates and sanitizes filenames by:
/// - Checking length limits
/// - Preventing directory traversal (../, ..\\)
/// - Removing potentially dangerous characters
/// - Ensuring filename is not empty after sanitization
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the filename is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` if it contains invalid characters.
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    // Prevent directory traversal attacks
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    // Check for null bytes and other dangerous characters
    if filename.contains('\0') || filename.chars().any(|c| ('\x01'..='\x1F').contains(&c)) {
        return Err(ValidationError::InvalidFilename);
    }

    // Sanitize filename by keeping only safe characters
    let sanitized = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-' || *c == '_' || *c == ' ')
        .collect::<String>();

    if sanitized.trim().is_empty() {
        return Err(ValidationError::InvalidFilename);
    }

    // Prevent hidden files (starting with .) unless it's a known extension
    if sanitized.starts_with('.') && !has_known_extension(&sanitized) {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

/// Check if filename has a known safe extension
fn has_known_extension(filename: &str) -> bool {
    let safe_extensions = [".csv", ".tsv", ".txt", ".xlsx"];

    safe_extensions
        .iter()
        .any(|ext| filename.to_lowercase().ends_with(ext))
}

/// Validate file content using magic numbers
///
/// XLSX uploads must be zip archives; delimited text must be UTF-8 and must
/// not be a zip archive in disguise.
#[must_use]
pub fn validate_file_format(content: &[u8], expected_format: TableFormat) -> bool {
    if content.is_empty() {
        return false;
    }

    match expected_format {
        TableFormat::Xlsx => content.starts_with(ZIP_MAGIC),
        TableFormat::Csv | TableFormat::Tsv => {
            !content.starts_with(ZIP_MAGIC) && std::str::from_utf8(content).is_ok()
        }
    }
}

/// Guess the table format of an upload from its leading bytes
#[must_use]
pub fn sniff_table_format(content: &[u8]) -> TableFormat {
    if content.starts_with(ZIP_MAGIC) {
        TableFormat::Xlsx
    } else {
        TableFormat::Csv
    }
}

/// Validate that file content is not malicious or malformed
///
/// # Errors
///
/// Returns `ValidationError::InvalidFileContent` if the content is too small,
/// contains unexpected binary data for text formats, or fails UTF-8 validation.
pub fn validate_file_content(content: &[u8], expected_text: bool) -> Result<(), ValidationError> {
    if content.len() < MIN_FILE_CONTENT_SIZE {
        return Err(ValidationError::InvalidFileContent);
    }

    if expected_text {
        // Check for excessive non-printable ASCII control characters
        let control_count = content
            .iter()
            .filter(|&&b| b < 9 || (b > 13 && b < 32))
            .count();

        // Allow up to 5% control characters for text files
        if content.len() > 100 && control_count > content.len() / 20 {
            return Err(ValidationError::InvalidFileContent);
        }

        if std::str::from_utf8(content).is_err() {
            return Err(ValidationError::InvalidFileContent);
        }
    }

    Ok(())
}

/// Comprehensive upload validation combining filename and content checks
///
/// # Errors
///
/// Returns a `ValidationError` if filename validation fails, the file format
/// doesn't match the expected format, or content validation fails.
pub fn validate_upload(
    filename: Option<&str>,
    content: &[u8],
    expected_format: TableFormat,
) -> Result<Option<String>, ValidationError> {
    let validated_filename = if let Some(name) = filename {
        Some(validate_filename(name)?)
    } else {
        None
    };

    let is_text_format = matches!(expected_format, TableFormat::Csv | TableFormat::Tsv);
    validate_file_content(content, is_text_format)?;

    if !validate_file_format(content, expected_format) {
        return Err(ValidationError::FormatValidationFailed);
    }

    Ok(validated_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_signature() {
        let components: IndexSet<String> = ["01-97-1519", "01-97-0451"]
            .into_iter()
            .map(String::from)
            .collect();

        let sig = compute_signature(&components);
        assert_eq!(sig.len(), 32);

        // Same input in a different order gives the same output
        let reversed: IndexSet<String> = components.iter().rev().cloned().collect();
        assert_eq!(sig, compute_signature(&reversed));

        // Empty set gives empty string
        assert_eq!(compute_signature(&IndexSet::new()), "");
    }

    #[test]
    fn test_signature_separator_is_not_comma() {
        let joined: IndexSet<String> = ["A,B".to_string()].into_iter().collect();
        let split: IndexSet<String> = ["A".to_string(), "B".to_string()].into_iter().collect();
        assert_ne!(compute_signature(&joined), compute_signature(&split));
    }

    #[test]
    fn test_check_row_limit() {
        assert!(check_row_limit(100).is_none());
        assert!(check_row_limit(MAX_TABLE_ROWS - 1).is_none());
        assert!(check_row_limit(MAX_TABLE_ROWS).is_some());
    }

    #[test]
    fn test_check_column_limit() {
        assert!(check_column_limit(MAX_TABLE_COLUMNS).is_none());
        assert!(check_column_limit(MAX_TABLE_COLUMNS + 1).is_some());
    }

    #[test]
    fn test_validate_filename_safe() {
        assert!(validate_filename("bom.xlsx").is_ok());
        assert!(validate_filename("my-file.csv").is_ok());
        assert!(validate_filename("sku list 2024.tsv").is_ok());
    }

    #[test]
    fn test_validate_filename_dangerous() {
        assert!(validate_filename("../etc/passwd").is_err());
        assert!(validate_filename("..\\windows\\system32").is_err());
        assert!(validate_filename("test\0.csv").is_err());
        assert!(validate_filename("test\x01.csv").is_err());
        assert!(validate_filename(&"a".repeat(300)).is_err());
        assert!(validate_filename("   ").is_err());
        assert!(validate_filename(".hidden").is_err());
    }

    #[test]
    fn test_validate_filename_sanitization() {
        let result = validate_filename("bom@#$%file.xlsx").unwrap();
        assert_eq!(result, "bomfile.xlsx");
    }

    #[test]
    fn test_validate_file_format() {
        assert!(validate_file_format(b"PK\x03\x04rest", TableFormat::Xlsx));
        assert!(!validate_file_format(b"SKU,BOM1\n", TableFormat::Xlsx));
        assert!(validate_file_format(b"SKU,BOM1\n", TableFormat::Csv));
        assert!(!validate_file_format(b"PK\x03\x04rest", TableFormat::Csv));
        assert!(!validate_file_format(b"", TableFormat::Csv));
    }

    #[test]
    fn test_sniff_table_format() {
        assert_eq!(sniff_table_format(b"PK\x03\x04"), TableFormat::Xlsx);
        assert_eq!(sniff_table_format(b"SKU,BOM1"), TableFormat::Csv);
    }

    #[test]
    fn test_validate_file_content_text() {
        assert!(validate_file_content(b"SKU,BOM1\nSKU1,A\n", true).is_ok());
        assert!(validate_file_content(&[0u8; 1000], true).is_err());
        assert!(validate_file_content(b"", true).is_err());
        assert!(validate_file_content(&[0xFF, 0xFE, 0x41], true).is_err());
    }

    #[test]
    fn test_validate_upload_complete() {
        let csv = b"SKU,BOM1\nSKU1,A\n";

        let result = validate_upload(Some("bom.csv"), csv, TableFormat::Csv);
        assert_eq!(result.unwrap().as_deref(), Some("bom.csv"));

        let result = validate_upload(None, csv, TableFormat::Csv);
        assert!(result.unwrap().is_none());

        assert!(validate_upload(Some("../bom.csv"), csv, TableFormat::Csv).is_err());

        // Declared xlsx but content is plain text
        assert!(matches!(
            validate_upload(Some("bom.xlsx"), csv, TableFormat::Xlsx),
            Err(ValidationError::FormatValidationFailed)
        ));
    }

    #[test]
    fn test_has_known_extension() {
        assert!(has_known_extension(".csv"));
        assert!(has_known_extension("bom.XLSX"));
        assert!(!has_known_extension(".exe"));
        assert!(!has_known_extension(".hidden"));
    }
}
