//! Compiles facet specifications into an engine facet request.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{PikeError, Result};
use crate::facet::spec::{
    FacetEntry, FacetRequest, FacetSpec, FacetSubQuery, field_key, multi_query_item_key,
    multi_query_key, pivot_key, query_key,
};

/// Turns [`FacetSpec`]s into a [`FacetRequest`].
///
/// Facet names are derived from the specs alone, so compiling the same specs
/// twice yields the same request and results can be looked up by
/// [`FacetSpec::key`]. Repeating a spec adds nothing, while two different
/// specs deriving the same name are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetCompiler;

impl FacetCompiler {
    /// Create a new facet compiler.
    pub fn new() -> Self {
        FacetCompiler
    }

    /// Compile the specs and pass the options through unchanged.
    pub fn compile(
        &self,
        specs: &[FacetSpec],
        options: &BTreeMap<String, serde_json::Value>,
    ) -> Result<FacetRequest> {
        let mut seen: BTreeMap<String, &FacetSpec> = BTreeMap::new();
        let mut facets = Vec::with_capacity(specs.len());

        for spec in specs {
            let Some(entry) = self.compile_spec(spec) else {
                continue;
            };
            match seen.get(entry.key()) {
                Some(&earlier) if earlier == spec => {
                    debug!("skipping repeated facet '{}'", entry.key());
                }
                Some(earlier) => {
                    return Err(PikeError::query(format!(
                        "facets {earlier:?} and {spec:?} both map to the name '{}'",
                        entry.key()
                    )));
                }
                None => {
                    seen.insert(entry.key().to_string(), spec);
                    facets.push(entry);
                }
            }
        }

        Ok(FacetRequest {
            facets,
            options: options.clone(),
        })
    }

    fn compile_spec(&self, spec: &FacetSpec) -> Option<FacetEntry> {
        match spec {
            FacetSpec::Field { field } => Some(FacetEntry::Field {
                key: field_key(field),
                field: field.clone(),
            }),
            FacetSpec::Query { field, queries } => match queries.as_slice() {
                [] => None,
                [query] => Some(FacetEntry::Query {
                    key: query_key(field),
                    query: format!("{field}:{query}"),
                }),
                _ => Some(FacetEntry::MultiQuery {
                    key: multi_query_key(field),
                    queries: queries
                        .iter()
                        .enumerate()
                        .map(|(i, query)| FacetSubQuery {
                            key: multi_query_item_key(field, i),
                            query: query.clone(),
                        })
                        .collect(),
                }),
            },
            FacetSpec::Pivot { fields } if fields.is_empty() => None,
            FacetSpec::Pivot { fields } => Some(FacetEntry::Pivot {
                key: pivot_key(fields),
                fields: fields.clone(),
            }),
        }
    }
}
