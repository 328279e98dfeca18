use indexmap::IndexSet;
use serde::Serialize;

use crate::utils::validation::compute_signature;

/// A BOM query as entered by a caller.
///
/// `items` keeps the input order for display; `components` is the
/// de-duplicated set used for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BomQuery {
    pub items: Vec<String>,
    #[serde(skip)]
    pub components: IndexSet<String>,
}

impl BomQuery {
    /// Build a query from component identifiers. Each item is trimmed and
    /// blank items are dropped.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items: Vec<String> = items
            .into_iter()
            .filter_map(|item| {
                let item = item.as_ref().trim();
                (!item.is_empty()).then(|| item.to_string())
            })
            .collect();
        let components = items.iter().cloned().collect();

        Self { items, components }
    }

    /// Parse newline-separated manual entry, one component per line
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Number of distinct components
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn signature(&self) -> String {
        compute_signature(&self.components)
    }
}

impl<S: AsRef<str>> FromIterator<S> for BomQuery {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
