//! Core data types for BOM-to-package matching.
//!
//! - [`Package`]: A named, fixed set of BOM component identifiers
//! - [`BomQuery`]: A caller-supplied component list, kept in input order and as a set
//! - [`PackageName`]: Unique package identifier within a catalog
//! - [`DuplicatePolicy`]: How catalog construction treats repeated package names
//!
//! ## Component Identifiers
//!
//! Component identifiers are opaque strings (typically part numbers such as
//! `01-97-1519`). Equality is exact string equality after trimming leading and
//! trailing whitespace at ingestion; no case folding or other normalization is
//! applied.

pub mod package;
pub mod query;
pub mod types;
