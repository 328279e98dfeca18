//! Build a [`PackageCatalog`] from a source table.
//!
//! The source layout is one package per column: the header cell is the
//! package name and the cells below it are its component identifiers.
//! Columns may be ragged; blank and missing cells are ignored.
//!
//! ```text
//! PKG1        | PKG2
//! 01-97-1519  | 01-97-1519
//! 01-97-0451  | 01-97-0451
//! 01-97-0624  |
//! ```

use crate::catalog::store::{CatalogError, PackageCatalog};
use crate::core::package::Package;
use crate::core::types::{DuplicatePolicy, PackageName};
use crate::parsing::table::SourceTable;

/// Worksheet read from catalog workbooks unless overridden
pub const DEFAULT_SHEET: &str = "Sheet1";

/// Options for catalog construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Worksheet holding the catalog in `.xlsx` sources
    pub sheet: String,
    /// Handling of repeated package names in the header row
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_SHEET.to_string(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

/// Turns source tables into catalogs
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    config: CatalogConfig,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Build a catalog from a source table.
    ///
    /// Package names and component identifiers are trimmed. Columns with a
    /// blank header are skipped. Under [`DuplicatePolicy::LastWriteWins`] a
    /// repeated package name keeps the first column's position and the last
    /// column's components.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MalformedSource` if the table has no columns or
    /// no readable header, and `CatalogError::DuplicatePackage` for a repeated
    /// name under [`DuplicatePolicy::Reject`].
    pub fn build(&self, table: &SourceTable) -> Result<PackageCatalog, CatalogError> {
        if table.width() == 0 {
            return Err(CatalogError::MalformedSource(
                "source table has no columns".to_string(),
            ));
        }

        if table.is_headerless() {
            return Err(CatalogError::MalformedSource(
                "source table has no readable header row".to_string(),
            ));
        }

        let packages = table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                let name = header.trim();
                if name.is_empty() {
                    tracing::warn!("Skipping column {} with a blank package name", index + 1);
                    return None;
                }
                Some(Package::new(PackageName::new(name), table.column(index)))
            });

        self.build_from_packages(packages)
    }

    /// Assemble a catalog from packages in order, applying the same name
    /// trimming, blank-name skipping and duplicate policy as [`Self::build`].
    ///
    /// Used for JSON exports, whose packages bypass the table reader.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicatePackage` for a repeated name under
    /// [`DuplicatePolicy::Reject`].
    pub fn build_from_packages<I>(&self, packages: I) -> Result<PackageCatalog, CatalogError>
    where
        I: IntoIterator<Item = Package>,
    {
        let mut catalog = PackageCatalog::new();

        for package in packages {
            let name = package.name.as_str().trim();
            if name.is_empty() {
                tracing::warn!("Skipping package with a blank name");
                continue;
            }

            if catalog.contains(name) {
                match self.config.duplicate_policy {
                    DuplicatePolicy::Reject => {
                        return Err(CatalogError::DuplicatePackage(name.to_string()));
                    }
                    DuplicatePolicy::LastWriteWins => {
                        tracing::warn!(
                            "Package '{}' is defined more than once; the later definition replaces the earlier one",
                            name
                        );
                    }
                }
            }

            let package = Package::new(PackageName::new(name), &package.components);
            tracing::debug!("Package {} has {} components", package.name, package.len());
            catalog.add_package(package);
        }

        tracing::info!("Built catalog with {} packages", catalog.len());
        Ok(catalog)
    }
}

/// Build a catalog with the default configuration
///
/// # Errors
///
/// See [`CatalogBuilder::build`].
pub fn build(table: &SourceTable) -> Result<PackageCatalog, CatalogError> {
    CatalogBuilder::default().build(table)
}
