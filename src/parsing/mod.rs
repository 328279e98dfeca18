//! Readers for the tabular inputs of the matcher.
//!
//! This module provides:
//!
//! - **Source tables**: A header row plus ragged data rows ([`table::SourceTable`])
//! - **CSV/TSV files**: Parsed with the `csv` crate, flexible record lengths
//! - **Excel workbooks**: `.xlsx` worksheets read with `calamine`
//! - **Batch query files**: A `SKU` column plus free-form component columns
//!
//! ## Example
//!
//! ```rust,no_run
//! use pkg_matcher::parsing::batch::read_batch_file;
//! use std::path::Path;
//!
//! let queries = read_batch_file(Path::new("skus.xlsx"), None).unwrap();
//! for q in &queries {
//!     println!("{}: {} components", q.sku, q.query.len());
//! }
//! ```
//!
//! ## Batch File Layout
//!
//! | SKU  | BOM1       | BOM2       | BOM3       |
//! |------|------------|------------|------------|
//! | SKU1 | 01-97-1519 | 01-97-0451 | 01-97-0624 |
//! | SKU2 | 01-97-1519 | 01-97-0451 |            |

pub mod batch;
pub mod delimited;
pub mod table;
pub mod xlsx;
