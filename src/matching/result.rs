use serde::Serialize;

use crate::core::types::PackageName;

/// Shown in place of a package name when no exact match exists
pub const NO_MATCHING_PKG: &str = "No matching PKG found.";

/// Shown as the single where-used row when no package contains the query
pub const NO_PKG_FOUND: &str = "No PKG found with the specified BOM item(s).";

/// Outcome of an exact-match query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "package", rename_all = "snake_case")]
pub enum ExactMatch {
    /// First package in catalog order whose component set equals the query
    Found(PackageName),
    NoMatch,
}

impl ExactMatch {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Package name, or the no-match sentinel
    #[must_use]
    pub fn display_value(&self) -> &str {
        match self {
            Self::Found(name) => name.as_str(),
            Self::NoMatch => NO_MATCHING_PKG,
        }
    }
}

impl std::fmt::Display for ExactMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_value())
    }
}

/// Outcome of a where-used (superset) query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "packages", rename_all = "snake_case")]
pub enum WhereUsed {
    /// Every package containing the query, in catalog order. Never empty.
    Found(Vec<PackageName>),
    NotFound,
}

impl WhereUsed {
    /// Wrap a result list, mapping an empty list to [`WhereUsed::NotFound`]
    #[must_use]
    pub fn from_packages(packages: Vec<PackageName>) -> Self {
        if packages.is_empty() {
            Self::NotFound
        } else {
            Self::Found(packages)
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub fn packages(&self) -> &[PackageName] {
        match self {
            Self::Found(packages) => packages,
            Self::NotFound => &[],
        }
    }

    /// Rows for display and export: the package names, or a single
    /// sentinel row when nothing was found
    #[must_use]
    pub fn display_values(&self) -> Vec<String> {
        match self {
            Self::Found(packages) => packages.iter().map(ToString::to_string).collect(),
            Self::NotFound => vec![NO_PKG_FOUND.to_string()],
        }
    }
}

/// Exact-match outcome for one row of a batch query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchMatch {
    pub sku: String,
    pub result: ExactMatch,
}
