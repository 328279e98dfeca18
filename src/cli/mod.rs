//! Command-line interface for pkg-matcher.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **match**: Find the package that exactly equals a BOM component list
//! - **batch**: Exact-match every row of an uploaded SKU file
//! - **where-used**: Find every package containing a set of BOM items
//! - **catalog**: List, show, or export packages from the catalog
//! - **serve**: Start the interactive web interface
//!
//! ## Usage
//!
//! ```text
//! # Exact match from arguments
//! pkg-matcher match 01-97-1519 01-97-0451 01-97-0624
//!
//! # Exact match from a newline-separated list on stdin
//! cat bom.txt | pkg-matcher match --input -
//!
//! # Batch file against a custom catalog, exporting matching_pkgs.csv
//! pkg-matcher batch skus.xlsx --catalog pkg_data.xlsx --export
//!
//! # Where used
//! pkg-matcher where-used 01-97-1519 --format json
//!
//! # Start web UI
//! pkg-matcher serve --port 8080 --open
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::catalog::builder::{CatalogConfig, DEFAULT_SHEET};
use crate::catalog::store::PackageCatalog;
use crate::core::query::BomQuery;
use crate::core::types::DuplicatePolicy;
use crate::report::ResultTable;

pub mod batch;
pub mod catalog;
pub mod exact;
pub mod where_used;

#[derive(Parser)]
#[command(name = "pkg-matcher")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Match BOM component lists against a catalog of known packages")]
#[command(
    long_about = "pkg-matcher compares bill-of-materials component lists against a catalog of packages, each a fixed set of components.\n\nIt answers two questions:\n- Which package exactly equals this BOM set?\n- Which packages contain this BOM set (where used)?"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the package whose components exactly equal a BOM list
    Match(exact::MatchArgs),

    /// Exact-match every row of a SKU file (XLSX, CSV or TSV)
    Batch(batch::BatchArgs),

    /// Find all packages that use every given BOM item
    WhereUsed(where_used::WhereUsedArgs),

    /// Inspect the package catalog
    Catalog(catalog::CatalogArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Where the catalog comes from
#[derive(clap::Args, Clone, Debug)]
pub struct CatalogSourceArgs {
    /// Catalog file: CSV, TSV or XLSX with one package per column, or a JSON
    /// export. Uses the embedded catalog when omitted.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Worksheet holding the catalog in XLSX files
    #[arg(long, default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// Fail on repeated package names instead of keeping the last definition
    #[arg(long)]
    pub strict_duplicates: bool,
}

impl Default for CatalogSourceArgs {
    fn default() -> Self {
        Self {
            catalog: None,
            sheet: DEFAULT_SHEET.to_string(),
            strict_duplicates: false,
        }
    }
}

impl CatalogSourceArgs {
    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            sheet: self.sheet.clone(),
            duplicate_policy: if self.strict_duplicates {
                DuplicatePolicy::Reject
            } else {
                DuplicatePolicy::LastWriteWins
            },
        }
    }

    /// Load the selected catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog source is unreadable or malformed.
    pub fn load(&self) -> anyhow::Result<PackageCatalog> {
        let catalog = match &self.catalog {
            Some(path) => PackageCatalog::load_from_file(path, &self.config())?,
            None => PackageCatalog::load_embedded()?,
        };

        tracing::info!("Loaded catalog with {} packages", catalog.len());
        if catalog.is_empty() {
            tracing::warn!("Catalog is empty, no packages to match against");
        }

        Ok(catalog)
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    #[command(flatten)]
    pub source: CatalogSourceArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Collect a BOM query from positional arguments and/or a newline-separated
/// input file (`-` for stdin). File lines come after the arguments.
///
/// # Errors
///
/// Returns an error if the input file or stdin cannot be read.
pub fn read_query(components: &[String], input: Option<&Path>) -> anyhow::Result<BomQuery> {
    let mut items: Vec<String> = components.to_vec();

    if let Some(path) = input {
        let text = if path.to_string_lossy() == "-" {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        } else {
            std::fs::read_to_string(path)?
        };
        items.extend(text.lines().map(str::to_string));
    }

    Ok(BomQuery::new(items))
}

/// Write a result table to the export path, if one was requested
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn export_table(table: &ResultTable, export: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = export {
        table.write_csv(path)?;
        eprintln!("Results exported to {}", path.display());
    }
    Ok(())
}
