use crate::catalog::index::CandidateFinder;
use crate::catalog::store::PackageCatalog;
use crate::core::query::BomQuery;
use crate::matching::result::{BatchMatch, ExactMatch, WhereUsed};
use crate::parsing::batch::BatchQuery;

/// The main matching engine.
///
/// Stateless apart from the borrowed catalog; every query is a pure
/// read-only computation.
pub struct MatchingEngine<'a> {
    catalog: &'a PackageCatalog,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(catalog: &'a PackageCatalog) -> Self {
        Self { catalog }
    }

    /// Find the package whose component set equals the query set.
    ///
    /// If several packages share the query's component set, the first one in
    /// catalog order is returned. An empty query only matches a package with
    /// no components.
    #[must_use]
    pub fn find_exact_match(&self, query: &BomQuery) -> ExactMatch {
        let Some(candidate) = self.catalog.find_by_signature(&query.signature()) else {
            tracing::debug!("No package with signature of {} components", query.len());
            return ExactMatch::NoMatch;
        };

        if candidate.components == query.components {
            return ExactMatch::Found(candidate.name.clone());
        }

        // Signature collision: fall back to a scan in catalog order
        tracing::debug!("Signature collision on package {}", candidate.name);
        self.catalog
            .packages()
            .find(|p| p.components == query.components)
            .map_or(ExactMatch::NoMatch, |p| ExactMatch::Found(p.name.clone()))
    }

    /// Find every package whose component set contains the query set
    /// (where-used). Results follow catalog order.
    ///
    /// The empty query is a subset of every package and returns the whole
    /// catalog.
    #[must_use]
    pub fn find_packages_containing(&self, query: &BomQuery) -> WhereUsed {
        let finder = CandidateFinder::new(self.catalog);

        let packages = finder
            .find_superset_candidates(query)
            .into_iter()
            .filter_map(|idx| self.catalog.package_at(idx))
            .filter(|p| query.components.is_subset(&p.components))
            .map(|p| p.name.clone())
            .collect();

        WhereUsed::from_packages(packages)
    }

    /// Exact-match every row of a batch, preserving row order
    #[must_use]
    pub fn match_batch(&self, queries: &[BatchQuery]) -> Vec<BatchMatch> {
        queries
            .iter()
            .map(|q| BatchMatch {
                sku: q.sku.clone(),
                result: self.find_exact_match(&q.query),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::package::Package;
    use crate::core::types::PackageName;
    use crate::matching::result::NO_PKG_FOUND;

    fn make_test_catalog() -> PackageCatalog {
        let mut catalog = PackageCatalog::new();
        catalog.add_package(Package::new("PKG1", ["A", "B", "C"]));
        catalog.add_package(Package::new("PKG2", ["A", "B"]));
        catalog
    }

    fn names(result: &WhereUsed) -> Vec<&str> {
        result.packages().iter().map(PackageName::as_str).collect()
    }

    #[test]
    fn test_exact_match_scenario() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        assert_eq!(
            engine.find_exact_match(&BomQuery::new(["A", "B"])),
            ExactMatch::Found("PKG2".into())
        );
        assert_eq!(
            engine.find_exact_match(&BomQuery::new(["A", "B", "C"])),
            ExactMatch::Found("PKG1".into())
        );
    }

    #[test]
    fn test_exact_match_ignores_order_and_duplicates() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let result = engine.find_exact_match(&BomQuery::new(["C", "A", "B", "A"]));
        assert_eq!(result, ExactMatch::Found("PKG1".into()));
    }

    #[test]
    fn test_exact_match_no_partial_credit() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        assert_eq!(
            engine.find_exact_match(&BomQuery::new(["A"])),
            ExactMatch::NoMatch
        );
        assert_eq!(
            engine.find_exact_match(&BomQuery::new(["A", "B", "C", "D"])),
            ExactMatch::NoMatch
        );
    }

    #[test]
    fn test_exact_match_duplicate_sets_returns_first() {
        let mut catalog = PackageCatalog::new();
        catalog.add_package(Package::new("PKG_Z", ["X", "Y"]));
        catalog.add_package(Package::new("PKG_A", ["Y", "X"]));
        let engine = MatchingEngine::new(&catalog);

        assert_eq!(
            engine.find_exact_match(&BomQuery::new(["X", "Y"])),
            ExactMatch::Found("PKG_Z".into())
        );
    }

    #[test]
    fn test_empty_query_exact() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);
        assert_eq!(
            engine.find_exact_match(&BomQuery::default()),
            ExactMatch::NoMatch
        );

        let mut with_empty = make_test_catalog();
        with_empty.add_package(Package::new("EMPTY", Vec::<String>::new()));
        let engine = MatchingEngine::new(&with_empty);
        assert_eq!(
            engine.find_exact_match(&BomQuery::default()),
            ExactMatch::Found("EMPTY".into())
        );
    }

    #[test]
    fn test_every_package_matches_itself() {
        let catalog = PackageCatalog::load_embedded().unwrap();
        let engine = MatchingEngine::new(&catalog);

        for package in catalog.packages() {
            let query = BomQuery::new(package.components.iter());
            assert_eq!(
                engine.find_exact_match(&query),
                ExactMatch::Found(package.name.clone())
            );
        }
    }

    #[test]
    fn test_where_used_scenario() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let result = engine.find_packages_containing(&BomQuery::new(["A"]));
        assert_eq!(names(&result), vec!["PKG1", "PKG2"]);

        let result = engine.find_packages_containing(&BomQuery::new(["D"]));
        assert_eq!(result, WhereUsed::NotFound);
        assert_eq!(result.display_values(), vec![NO_PKG_FOUND.to_string()]);
    }

    #[test]
    fn test_where_used_includes_equal_set() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let result = engine.find_packages_containing(&BomQuery::new(["A", "B"]));
        assert_eq!(names(&result), vec!["PKG1", "PKG2"]);

        let result = engine.find_packages_containing(&BomQuery::new(["C", "A"]));
        assert_eq!(names(&result), vec!["PKG1"]);
    }

    #[test]
    fn test_where_used_results_are_supersets() {
        let catalog = PackageCatalog::load_embedded().unwrap();
        let engine = MatchingEngine::new(&catalog);
        let query = BomQuery::new(["01-97-1519", "01-50-1539"]);

        let result = engine.find_packages_containing(&query);
        assert!(result.is_found());
        for name in result.packages() {
            let package = catalog.get(name.as_str()).unwrap();
            assert!(query.components.is_subset(&package.components));
        }
        assert_eq!(names(&result), vec!["PKG-1000", "PKG-1002"]);
    }

    #[test]
    fn test_where_used_empty_query_returns_whole_catalog() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let result = engine.find_packages_containing(&BomQuery::default());
        assert_eq!(names(&result), vec!["PKG1", "PKG2"]);
    }

    #[test]
    fn test_where_used_on_empty_catalog() {
        let catalog = PackageCatalog::new();
        let engine = MatchingEngine::new(&catalog);
        assert_eq!(
            engine.find_packages_containing(&BomQuery::default()),
            WhereUsed::NotFound
        );
    }

    #[test]
    fn test_match_batch_scenario() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let queries = vec![
            BatchQuery {
                sku: "SKU1".to_string(),
                query: BomQuery::new(["A", "B", "C"]),
            },
            BatchQuery {
                sku: "SKU2".to_string(),
                query: BomQuery::new(["A", "B"]),
            },
            BatchQuery {
                sku: "SKU3".to_string(),
                query: BomQuery::new(["Q"]),
            },
        ];

        let results = engine.match_batch(&queries);
        let rows: Vec<(&str, &str)> = results
            .iter()
            .map(|r| (r.sku.as_str(), r.result.display_value()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("SKU1", "PKG1"),
                ("SKU2", "PKG2"),
                ("SKU3", "No matching PKG found.")
            ]
        );
    }
}
