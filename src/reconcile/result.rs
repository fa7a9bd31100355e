//! Reconciled search results.

use serde::{Deserialize, Serialize};

use crate::facet::{FacetResult, FacetSet};
use crate::search::SpellcheckResult;

/// Records in engine relevance order, with the engine's auxiliary sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledResult<R> {
    /// Records in relevance order.
    pub records: Vec<R>,
    /// Total match count reported by the engine.
    pub total: u64,
    /// Facet results of the search.
    pub facets: FacetSet,
    /// Spellcheck section of the search.
    pub spellcheck: Option<SpellcheckResult>,
    /// Corrected query text, when an automatic retry ran.
    pub corrected_query: Option<String>,
}

impl<R> ReconciledResult<R> {
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn facets(&self) -> &FacetSet {
        &self.facets
    }

    /// Look up one facet by its result name.
    pub fn facet(&self, name: &str) -> Option<&FacetResult> {
        self.facets.get(name)
    }

    pub fn spellcheck(&self) -> Option<&SpellcheckResult> {
        self.spellcheck.as_ref()
    }

    pub fn corrected_query(&self) -> Option<&str> {
        self.corrected_query.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<R> IntoIterator for ReconciledResult<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ReconciledResult<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
