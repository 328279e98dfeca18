use crate::core::query::BomQuery;

use super::store::PackageCatalog;

/// Narrows the packages a query has to be checked against
pub struct CandidateFinder<'a> {
    catalog: &'a PackageCatalog,
}

impl<'a> CandidateFinder<'a> {
    pub fn new(catalog: &'a PackageCatalog) -> Self {
        Self { catalog }
    }

    /// Positions of packages that could contain every query component, in
    /// catalog order.
    ///
    /// Uses the shortest posting list among the query's components. An empty
    /// query returns every package; a component unknown to the catalog
    /// returns none.
    pub fn find_superset_candidates(&self, query: &BomQuery) -> Vec<usize> {
        if query.is_empty() {
            return (0..self.catalog.len()).collect();
        }

        let mut shortest: Option<&[usize]> = None;
        for component in &query.components {
            let postings = self.catalog.packages_with_component(component);
            if postings.is_empty() {
                return Vec::new();
            }
            if shortest.map_or(true, |s| postings.len() < s.len()) {
                shortest = Some(postings);
            }
        }

        shortest.map(<[usize]>::to_vec).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::package::Package;

    fn catalog() -> PackageCatalog {
        let mut catalog = PackageCatalog::new();
        catalog.add_package(Package::new("PKG1", ["A", "B", "C"]));
        catalog.add_package(Package::new("PKG2", ["A", "B"]));
        catalog.add_package(Package::new("PKG3", ["A", "D"]));
        catalog
    }

    #[test]
    fn test_uses_shortest_posting_list() {
        let catalog = catalog();
        let finder = CandidateFinder::new(&catalog);
        assert_eq!(finder.find_superset_candidates(&BomQuery::new(["A", "C"])), vec![0]);
        assert_eq!(finder.find_superset_candidates(&BomQuery::new(["B"])), vec![0, 1]);
    }

    #[test]
    fn test_empty_query_returns_all() {
        let catalog = catalog();
        let finder = CandidateFinder::new(&catalog);
        assert_eq!(
            finder.find_superset_candidates(&BomQuery::default()),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_unknown_component_returns_none() {
        let catalog = catalog();
        let finder = CandidateFinder::new(&catalog);
        assert!(finder
            .find_superset_candidates(&BomQuery::new(["A", "Z"]))
            .is_empty());
    }
}
