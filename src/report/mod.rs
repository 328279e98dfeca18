//! Result tables for display and export.
//!
//! Query results are turned into a [`table::ResultTable`] at the presentation
//! boundary; this is where the "no match" sentinels become rows. Tables render
//! as aligned text, JSON, or CSV (header row, no index column, UTF-8).

pub mod table;

pub use table::{ReportError, ResultTable, DEFAULT_EXPORT_FILENAME, MATCHING_PKG_COLUMN};
