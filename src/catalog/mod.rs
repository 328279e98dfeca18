//! Package catalog construction, storage and indexing.
//!
//! The catalog maps package names to their component sets. It is built once per
//! session from a tabular source (one column per package) and is read-only
//! afterwards; every query takes the catalog explicitly.
//!
//! ## Embedded Catalog
//!
//! A small default catalog (`catalogs/default_pkgs.csv`) is compiled into the
//! binary and validated by `build.rs`. Custom catalogs can be loaded from CSV,
//! TSV or XLSX sources, or from a JSON export.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pkg_matcher::catalog::builder::CatalogConfig;
//! use pkg_matcher::PackageCatalog;
//! use std::path::Path;
//!
//! // Load from a workbook (sheet "Sheet1" by default)
//! let catalog =
//!     PackageCatalog::load_from_file(Path::new("pkg_data.xlsx"), &CatalogConfig::default())
//!         .unwrap();
//!
//! for package in catalog.packages() {
//!     println!("{}: {} components", package.name, package.len());
//! }
//!
//! // Export to JSON
//! let json = catalog.to_json().unwrap();
//! ```
//!
//! ## Duplicate Package Names
//!
//! If the source repeats a package name, the later column replaces the earlier
//! one but keeps its position (last-write-wins). This is reported with a
//! warning; [`crate::core::types::DuplicatePolicy::Reject`] turns it into an
//! error instead.

pub mod builder;
pub mod index;
pub mod store;
