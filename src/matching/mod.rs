//! BOM-to-package matching.
//!
//! - [`MatchingEngine`]: Answers queries against a borrowed [`PackageCatalog`]
//! - [`ExactMatch`]: Result of an exact (set-equality) query
//! - [`WhereUsed`]: Result of a where-used (superset) query
//!
//! ## Queries
//!
//! 1. **Exact match**: The first package, in catalog order, whose component set
//!    equals the query set. Looked up through the catalog's set-signature index.
//! 2. **Where-used**: Every package whose component set contains the query set,
//!    in catalog order. Candidates come from the component index; the empty
//!    query matches every package.
//!
//! "Nothing found" is a normal result value, never an error. The sentinel
//! strings ([`NO_MATCHING_PKG`], [`NO_PKG_FOUND`]) only appear when results are
//! rendered or exported.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pkg_matcher::{BomQuery, MatchingEngine, PackageCatalog};
//!
//! let catalog = PackageCatalog::load_embedded().unwrap();
//! let engine = MatchingEngine::new(&catalog);
//!
//! let query = BomQuery::from_text("01-97-1519\n01-97-0451\n01-97-0624\n");
//! println!("The matching PKG is: {}", engine.find_exact_match(&query));
//!
//! for name in engine.find_packages_containing(&query).display_values() {
//!     println!("{name}");
//! }
//! ```
//!
//! [`PackageCatalog`]: crate::catalog::store::PackageCatalog

pub mod engine;
pub mod result;

pub use engine::MatchingEngine;
pub use result::{BatchMatch, ExactMatch, WhereUsed, NO_MATCHING_PKG, NO_PKG_FOUND};
