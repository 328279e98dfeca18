use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::catalog::builder::{CatalogBuilder, CatalogConfig};
use crate::core::package::Package;
use crate::core::types::PackageName;
use crate::parsing::table::{read_table_bytes, read_table_file, TableFormat};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Malformed catalog source: {0}")]
    MalformedSource(String),

    #[error("Package '{0}' is defined more than once in the catalog source")]
    DuplicatePackage(String),

    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    pub packages: Vec<Package>,
}

/// The package catalog with indexes.
///
/// Packages are kept in insertion order (source column order), which is the
/// iteration order every query follows.
#[derive(Debug, Clone, Default)]
pub struct PackageCatalog {
    /// All known packages, keyed by name
    packages: IndexMap<PackageName, Package>,

    /// Index: component -> positions of packages containing it, ascending
    component_to_pkgs: HashMap<String, Vec<usize>>,

    /// Index: component-set signature -> position of the first package with it
    signature_to_pkg: HashMap<String, usize>,
}

impl PackageCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the embedded default catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded table cannot be built.
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Validated at compile time by build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/default_pkgs.csv");
        let table = read_table_bytes(EMBEDDED_CATALOG.as_bytes(), TableFormat::Csv, None)
            .map_err(|e| CatalogError::MalformedSource(e.to_string()))?;
        CatalogBuilder::default().build(&table)
    }

    /// Load a catalog from a file: `.json` exports are read directly, tabular
    /// sources (CSV, TSV, XLSX) are passed through the catalog builder.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MalformedSource` if a tabular source is unreadable
    /// or headerless, or a JSON error for malformed exports.
    pub fn load_from_file(path: &Path, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            let content = std::fs::read_to_string(path)?;
            return Self::from_json_with_config(&content, config);
        }

        let table = read_table_file(path, None, Some(&config.sheet))
            .map_err(|e| CatalogError::MalformedSource(format!("{}: {e}", path.display())))?;

        CatalogBuilder::new(config.clone()).build(&table)
    }

    /// Parse catalog from JSON string with the default configuration
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_json_with_config(json, &CatalogConfig::default())
    }

    /// Parse catalog from JSON string. Packages go through the catalog
    /// builder, so names are trimmed and the duplicate policy applies.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if the JSON is invalid and
    /// `CatalogError::DuplicatePackage` for a repeated name under
    /// [`crate::core::types::DuplicatePolicy::Reject`].
    pub fn from_json_with_config(json: &str, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            tracing::warn!(
                "Catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION,
                data.version
            );
        }

        CatalogBuilder::new(config.clone()).build_from_packages(data.packages)
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            packages: self.packages.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Add a package to the catalog.
    ///
    /// A package whose name is already present replaces the earlier definition
    /// in place (it keeps the earlier position). The replaced package is
    /// returned.
    pub fn add_package(&mut self, package: Package) -> Option<Package> {
        let (index, replaced) = self.packages.insert_full(package.name.clone(), package);

        if replaced.is_some() {
            self.rebuild_indexes();
        } else {
            self.index_package(index);
        }

        replaced
    }

    fn index_package(&mut self, index: usize) {
        let Some((_, package)) = self.packages.get_index(index) else {
            return;
        };

        for component in &package.components {
            self.component_to_pkgs
                .entry(component.clone())
                .or_default()
                .push(index);
        }

        // First package in catalog order wins for identical component sets
        self.signature_to_pkg
            .entry(package.signature())
            .or_insert(index);
    }

    fn rebuild_indexes(&mut self) {
        self.component_to_pkgs.clear();
        self.signature_to_pkg.clear();
        for index in 0..self.packages.len() {
            self.index_package(index);
        }
    }

    /// Get a package by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Package at a catalog position
    #[must_use]
    pub fn package_at(&self, index: usize) -> Option<&Package> {
        self.packages.get_index(index).map(|(_, p)| p)
    }

    /// All packages in catalog order
    pub fn packages(&self) -> impl Iterator<Item = &Package> + '_ {
        self.packages.values()
    }

    /// All package names in catalog order
    pub fn names(&self) -> impl Iterator<Item = &PackageName> + '_ {
        self.packages.keys()
    }

    /// Positions of packages containing a component, in catalog order
    #[must_use]
    pub fn packages_with_component(&self, component: &str) -> &[usize] {
        self.component_to_pkgs
            .get(component)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First package (in catalog order) with the given set signature
    #[must_use]
    pub fn find_by_signature(&self, signature: &str) -> Option<&Package> {
        self.signature_to_pkg
            .get(signature)
            .and_then(|&idx| self.package_at(idx))
    }

    /// Number of packages in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DuplicatePolicy;

    #[test]
    fn test_load_embedded_catalog() {
        let catalog = PackageCatalog::load_embedded().unwrap();
        assert_eq!(catalog.len(), 4);

        let names: Vec<&str> = catalog.names().map(PackageName::as_str).collect();
        assert_eq!(names, vec!["PKG-1000", "PKG-1001", "PKG-1002", "PKG-1003"]);
        assert_eq!(catalog.get("PKG-1000").unwrap().len(), 4);
        assert_eq!(catalog.get("PKG-1003").unwrap().len(), 2);
    }

    #[test]
    fn test_catalog_get_nonexistent() {
        let catalog = PackageCatalog::load_embedded().unwrap();
        assert!(catalog.get("PKG-9999").is_none());
        assert!(!catalog.contains("PKG-9999"));
    }

    #[test]
    fn test_component_index_in_catalog_order() {
        let mut catalog = PackageCatalog::new();
        catalog.add_package(Package::new("PKG1", ["A", "B", "C"]));
        catalog.add_package(Package::new("PKG2", ["A", "B"]));
        catalog.add_package(Package::new("PKG3", ["C"]));

        assert_eq!(catalog.packages_with_component("A"), &[0, 1]);
        assert_eq!(catalog.packages_with_component("C"), &[0, 2]);
        assert!(catalog.packages_with_component("D").is_empty());
    }

    #[test]
    fn test_signature_keeps_first_package() {
        let mut catalog = PackageCatalog::new();
        catalog.add_package(Package::new("FIRST", ["A", "B"]));
        catalog.add_package(Package::new("SECOND", ["B", "A"]));

        let sig = Package::new("Q", ["A", "B"]).signature();
        assert_eq!(catalog.find_by_signature(&sig).unwrap().name.as_str(), "FIRST");
    }

    #[test]
    fn test_add_duplicate_name_replaces_in_place() {
        let mut catalog = PackageCatalog::new();
        catalog.add_package(Package::new("PKG1", ["A"]));
        catalog.add_package(Package::new("PKG2", ["B"]));
        let replaced = catalog.add_package(Package::new("PKG1", ["C"]));

        assert_eq!(replaced.unwrap().components.len(), 1);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.package_at(0).unwrap().name.as_str(), "PKG1");
        assert!(catalog.get("PKG1").unwrap().contains("C"));

        // Stale index entries are gone
        assert!(catalog.packages_with_component("A").is_empty());
        assert_eq!(catalog.packages_with_component("C"), &[0]);
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = PackageCatalog::load_embedded().unwrap();
        let json = catalog.to_json().unwrap();

        assert!(json.contains("\"version\""));
        assert!(json.contains("\"packages\""));
        assert!(json.contains("PKG-1000"));

        let reloaded = PackageCatalog::from_json(&json).unwrap();
        let a: Vec<&Package> = catalog.packages().collect();
        let b: Vec<&Package> = reloaded.packages().collect();
        assert_eq!(a, b);
    }

    const DUPLICATE_JSON: &str = r#"{
        "version": "1.0.0",
        "created_at": "2024-01-01T00:00:00Z",
        "packages": [
            {"name": " PKG1 ", "components": ["A", " B "]},
            {"name": "PKG2", "components": ["C"]},
            {"name": "", "components": ["D"]},
            {"name": "PKG1", "components": ["E"]}
        ]
    }"#;

    #[test]
    fn test_json_duplicates_last_write_wins() {
        let catalog = PackageCatalog::from_json(DUPLICATE_JSON).unwrap();

        let names: Vec<&str> = catalog.names().map(PackageName::as_str).collect();
        assert_eq!(names, vec!["PKG1", "PKG2"]);
        assert_eq!(
            catalog.get("PKG1").unwrap(),
            &Package::new("PKG1", ["E"])
        );
    }

    #[test]
    fn test_json_duplicates_rejected_when_strict() {
        let config = CatalogConfig {
            duplicate_policy: DuplicatePolicy::Reject,
            ..CatalogConfig::default()
        };
        let err = PackageCatalog::from_json_with_config(DUPLICATE_JSON, &config).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicatePackage(name) if name == "PKG1"));
    }

    #[test]
    fn test_json_components_are_trimmed() {
        let json = DUPLICATE_JSON.replace(
            r#"{"name": "PKG1", "components": ["E"]}"#,
            r#"{"name": "PKG3", "components": []}"#,
        );
        let catalog = PackageCatalog::from_json(&json).unwrap();
        assert_eq!(catalog.get("PKG1").unwrap(), &Package::new("PKG1", ["A", "B"]));
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
    }

    #[test]
    fn test_load_workbook_default_sheet() {
        // Sheet1 is the second sheet of the workbook
        let catalog =
            PackageCatalog::load_from_file(&fixture("pkg_catalog.xlsx"), &CatalogConfig::default())
                .unwrap();

        let names: Vec<&str> = catalog.names().map(PackageName::as_str).collect();
        assert_eq!(names, vec!["PKG1", "PKG2"]);
        assert_eq!(catalog.get("PKG2").unwrap(), &Package::new("PKG2", ["A", "1519"]));
    }

    #[test]
    fn test_load_workbook_named_sheet() {
        let config = CatalogConfig {
            sheet: "Other".to_string(),
            ..CatalogConfig::default()
        };
        let catalog = PackageCatalog::load_from_file(&fixture("pkg_catalog.xlsx"), &config).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("X").unwrap(), &Package::new("X", ["Y"]));
    }

    #[test]
    fn test_load_workbook_missing_or_empty_sheet_is_malformed() {
        for sheet in ["PKGs", "Empty"] {
            let config = CatalogConfig {
                sheet: sheet.to_string(),
                ..CatalogConfig::default()
            };
            let err = PackageCatalog::load_from_file(&fixture("pkg_catalog.xlsx"), &config)
                .unwrap_err();
            assert!(
                matches!(err, CatalogError::MalformedSource(_)),
                "sheet {sheet}: {err:?}"
            );
        }
    }

    #[test]
    fn test_load_unreadable_source_is_malformed() {
        let err = PackageCatalog::load_from_file(
            Path::new("/nonexistent/pkgs.xlsx"),
            &CatalogConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::MalformedSource(_)));
    }
}
