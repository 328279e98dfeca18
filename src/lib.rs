//! # pkg-matcher
//!
//! A library for matching bill-of-materials (BOM) component lists against a
//! catalog of known packages (PKGs).
//!
//! Each package in the catalog is a named set of BOM component identifiers.
//! Given a BOM, `pkg-matcher` answers two questions:
//!
//! - **Exact match**: which package has exactly this set of components?
//! - **Where used**: which packages contain all of these components?
//!
//! Component order and repetition never matter: a BOM is compared as a set.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pkg_matcher::{BomQuery, MatchingEngine, PackageCatalog};
//!
//! // Load the embedded catalog of known packages
//! let catalog = PackageCatalog::load_embedded().unwrap();
//!
//! let query = BomQuery::new(["01-97-1519", "01-97-0451", "01-97-0624"]);
//!
//! let engine = MatchingEngine::new(&catalog);
//! println!("The matching PKG is: {}", engine.find_exact_match(&query));
//!
//! for name in engine.find_packages_containing(&query).display_values() {
//!     println!("{name}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Package catalog loading, storage and indexing
//! - [`core`]: Core data types for packages and queries
//! - [`matching`]: Exact-match and where-used lookups
//! - [`parsing`]: CSV/TSV/XLSX readers and SKU batch files
//! - [`report`]: Result tables and CSV export
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Web server for browser-based matching

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod report;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::store::PackageCatalog;
pub use core::package::Package;
pub use core::query::BomQuery;
pub use core::types::*;
pub use matching::{ExactMatch, MatchingEngine, WhereUsed};
