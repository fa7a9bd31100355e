//! Facet results returned by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A value and the number of matching documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValueCount {
    /// Facet value (or sub-query name for multi-query facets).
    pub value: String,
    /// Number of matching documents.
    pub count: u64,
}

impl FacetValueCount {
    /// Create a new value count.
    pub fn new<S: Into<String>>(value: S, count: u64) -> Self {
        FacetValueCount {
            value: value.into(),
            count,
        }
    }
}

/// One node of a pivot facet tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotNode {
    /// Field of this level.
    pub field: String,
    /// Value of the field at this node.
    pub value: String,
    /// Number of matching documents.
    pub count: u64,
    /// Nested pivots for the next field.
    pub pivot: Vec<PivotNode>,
}

impl PivotNode {
    /// Create a leaf pivot node.
    pub fn new<F: Into<String>, V: Into<String>>(field: F, value: V, count: u64) -> Self {
        PivotNode {
            field: field.into(),
            value: value.into(),
            count,
            pivot: Vec::new(),
        }
    }

    /// Add a nested pivot node.
    pub fn with_child(mut self, child: PivotNode) -> Self {
        self.pivot.push(child);
        self
    }

    /// Depth of the subtree rooted at this node.
    pub fn depth(&self) -> usize {
        1 + self.pivot.iter().map(PivotNode::depth).max().unwrap_or(0)
    }
}

/// Result of a single facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacetResult {
    /// Field value counts.
    Field(Vec<FacetValueCount>),
    /// Count of a single facet query.
    Query(u64),
    /// Counts of each named sub-query.
    MultiQuery(Vec<FacetValueCount>),
    /// Pivot tree.
    Pivot(Vec<PivotNode>),
}

/// All facet results of a search, keyed by facet name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSet {
    facets: BTreeMap<String, FacetResult>,
}

impl FacetSet {
    /// Create an empty facet set.
    pub fn new() -> Self {
        FacetSet::default()
    }

    /// Insert the result of a facet.
    pub fn insert<S: Into<String>>(&mut self, key: S, result: FacetResult) {
        self.facets.insert(key.into(), result);
    }

    /// Builder-style insert.
    pub fn with<S: Into<String>>(mut self, key: S, result: FacetResult) -> Self {
        self.insert(key, result);
        self
    }

    /// Look up a facet by name.
    pub fn get(&self, key: &str) -> Option<&FacetResult> {
        self.facets.get(key)
    }

    /// Value counts of a field or multi-query facet.
    pub fn counts(&self, key: &str) -> Option<&[FacetValueCount]> {
        match self.facets.get(key)? {
            FacetResult::Field(counts) | FacetResult::MultiQuery(counts) => Some(counts),
            _ => None,
        }
    }

    /// Number of facets.
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Whether the set holds no facets.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Iterate over facets in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FacetResult)> {
        self.facets.iter()
    }
}
