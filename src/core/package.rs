use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::types::PackageName;
use crate::utils::validation::compute_signature;

/// A known package: a name and the fixed set of BOM components it consists of.
///
/// Components keep the order they were first seen in the source, but equality
/// between two component sets ignores that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: PackageName,
    pub components: IndexSet<String>,
}

impl Package {
    /// Create a package, trimming component identifiers and dropping blanks.
    /// Duplicate components collapse into one.
    pub fn new<I, S>(name: impl Into<PackageName>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let components = components
            .into_iter()
            .filter_map(|c| {
                let c = c.as_ref().trim();
                (!c.is_empty()).then(|| c.to_string())
            })
            .collect();

        Self {
            name: name.into(),
            components,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn contains(&self, component: &str) -> bool {
        self.components.contains(component)
    }

    /// Order-independent digest of the component set
    #[must_use]
    pub fn signature(&self) -> String {
        compute_signature(&self.components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_dedups() {
        let pkg = Package::new("PKG1", [" A ", "B", "", "A", "  "]);
        assert_eq!(pkg.len(), 2);
        assert!(pkg.contains("A"));
        assert!(pkg.contains("B"));
        assert!(!pkg.contains(" A "));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Package::new("PKG1", ["A", "B", "C"]);
        let b = Package::new("PKG1", ["C", "A", "B"]);
        assert_eq!(a, b);
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_components_keep_source_order() {
        let pkg = Package::new("PKG1", ["C", "A", "B"]);
        let order: Vec<&str> = pkg.components.iter().map(String::as_str).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_empty_package() {
        let pkg = Package::new("EMPTY", Vec::<String>::new());
        assert!(pkg.is_empty());
        assert_eq!(pkg.signature(), "");
    }
}
