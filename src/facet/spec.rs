//! Facet specifications and the engine requests compiled from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A facet requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacetSpec {
    /// Value counts for a single field.
    Field {
        /// Field to count values of.
        field: String,
    },
    /// Counts for ad hoc queries against a field.
    ///
    /// One query compiles to a single facet query; two or more compile to a
    /// multi-query group.
    Query {
        /// Field the queries apply to.
        field: String,
        /// Query values, in request order.
        queries: Vec<String>,
    },
    /// Nested counts across a list of fields.
    Pivot {
        /// Fields to pivot on, outermost first.
        fields: Vec<String>,
    },
}

impl FacetSpec {
    /// Create a field facet.
    pub fn field<S: Into<String>>(field: S) -> Self {
        FacetSpec::Field {
            field: field.into(),
        }
    }

    /// Create a query facet with a single query.
    pub fn query<F: Into<String>, Q: Into<String>>(field: F, query: Q) -> Self {
        FacetSpec::Query {
            field: field.into(),
            queries: vec![query.into()],
        }
    }

    /// Create a pivot facet.
    pub fn pivot<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FacetSpec::Pivot {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Stable name under which this facet is requested and looked up.
    pub fn key(&self) -> String {
        match self {
            FacetSpec::Field { field } => field_key(field),
            FacetSpec::Query { field, queries } if queries.len() > 1 => multi_query_key(field),
            FacetSpec::Query { field, .. } => query_key(field),
            FacetSpec::Pivot { fields } => pivot_key(fields),
        }
    }
}

/// Name of a field facet.
pub fn field_key(field: &str) -> String {
    format!("{field}-field")
}

/// Name of a single-query facet.
pub fn query_key(field: &str) -> String {
    format!("{field}-query")
}

/// Name of a multi-query facet group.
pub fn multi_query_key(field: &str) -> String {
    format!("{field}-multiquery")
}

/// Name of the `index`-th query within a multi-query group.
pub fn multi_query_item_key(field: &str, index: usize) -> String {
    format!("{field}-multiquery-{index}")
}

/// Name of a pivot facet.
pub fn pivot_key<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("-")
}

/// A named sub-query of a multi-query facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSubQuery {
    /// Name of the sub-query.
    pub key: String,
    /// Query text.
    pub query: String,
}

/// A single facet in an engine request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacetEntry {
    /// Field value counts.
    Field {
        /// Facet name.
        key: String,
        /// Field to count values of.
        field: String,
    },
    /// A single facet query.
    Query {
        /// Facet name.
        key: String,
        /// Query text, already qualified with its field.
        query: String,
    },
    /// A group of independently named facet queries.
    MultiQuery {
        /// Group name.
        key: String,
        /// Sub-queries in request order.
        queries: Vec<FacetSubQuery>,
    },
    /// A pivot over several fields.
    Pivot {
        /// Facet name.
        key: String,
        /// Fields, outermost first.
        fields: Vec<String>,
    },
}

impl FacetEntry {
    /// Name of this facet.
    pub fn key(&self) -> &str {
        match self {
            FacetEntry::Field { key, .. }
            | FacetEntry::Query { key, .. }
            | FacetEntry::MultiQuery { key, .. }
            | FacetEntry::Pivot { key, .. } => key,
        }
    }
}

/// Compiled facet part of a search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetRequest {
    /// Facets in request order.
    pub facets: Vec<FacetEntry>,
    /// Engine tuning options, passed through verbatim.
    pub options: BTreeMap<String, serde_json::Value>,
}

impl FacetRequest {
    /// Whether any facet was requested.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Look up a facet entry by name.
    pub fn get(&self, key: &str) -> Option<&FacetEntry> {
        self.facets.iter().find(|entry| entry.key() == key)
    }

    /// Render engine parameters for this facet request.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if self.is_empty() {
            return params;
        }

        params.push(("facet".to_string(), "true".to_string()));
        for entry in &self.facets {
            match entry {
                FacetEntry::Field { key, field } => {
                    params.push(("facet.field".to_string(), format!("{{!key={key}}}{field}")));
                }
                FacetEntry::Query { key, query } => {
                    params.push(("facet.query".to_string(), format!("{{!key={key}}}{query}")));
                }
                FacetEntry::MultiQuery { queries, .. } => {
                    for sub in queries {
                        params.push((
                            "facet.query".to_string(),
                            format!("{{!key={}}}{}", sub.key, sub.query),
                        ));
                    }
                }
                FacetEntry::Pivot { key, fields } => {
                    params.push((
                        "facet.pivot".to_string(),
                        format!("{{!key={}}}{}", key, fields.join(",")),
                    ));
                }
            }
        }

        for (option, value) in &self.options {
            let name = if option.starts_with("facet.") {
                option.clone()
            } else {
                format!("facet.{option}")
            };
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            params.push((name, value));
        }

        params
    }
}
