//! Search requests as sent to the transport.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PikeError, Result};
use crate::facet::FacetRequest;
use crate::filter::{CompiledFilter, assemble};
use crate::relevance::{MATCH_ALL, RelevanceParams};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Direction as written in the sort parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A single sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Field to sort on.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// Window of results requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Offset of the first result.
    pub start: usize,
    /// Maximum number of results; `None` leaves the limit to the engine.
    pub rows: Option<usize>,
}

/// Pagination supplied by the caller of a search, separate from the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationOverride {
    /// Offset; ignored when the builder set its own start.
    pub start: Option<usize>,
    /// Row limit.
    pub rows: Option<usize>,
}

impl PaginationOverride {
    /// Window for a 1-based page of `per_page` results.
    pub fn page(page: usize, per_page: usize) -> Result<Self> {
        if page == 0 {
            return Err(PikeError::invalid_argument("page numbers start at 1"));
        }
        if per_page == 0 {
            return Err(PikeError::invalid_argument(
                "per_page must be greater than 0",
            ));
        }
        let start = (page - 1).checked_mul(per_page).ok_or_else(|| {
            PikeError::invalid_argument(format!(
                "page {page} of {per_page} results is out of range"
            ))
        })?;
        Ok(PaginationOverride {
            start: Some(start),
            rows: Some(per_page),
        })
    }
}

/// Spellcheck behaviour of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpellcheckOptions {
    /// Ask the engine for spelling suggestions.
    pub enabled: bool,
    /// Re-run the search once with the first collation, if one is returned.
    pub auto_retry: bool,
    /// Ask the engine for collations (implied by `auto_retry`).
    pub collate: bool,
}

/// A fully compiled search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Identifier used to correlate log lines.
    pub id: Uuid,
    /// Core or collection to query.
    pub endpoint: String,
    /// Main query text.
    pub query: String,
    /// Compiled filter; empty when no filter clause is sent.
    pub filter: CompiledFilter,
    /// Facets to compute.
    pub facets: FacetRequest,
    /// Relevance parser parameters.
    pub relevance: RelevanceParams,
    /// Result window.
    pub pagination: Pagination,
    /// Sort clauses in priority order.
    pub sort: Vec<SortField>,
    /// Spellcheck options.
    pub spellcheck: SpellcheckOptions,
    /// Stored fields to return for each hit.
    pub fields: Vec<String>,
}

impl SearchRequest {
    /// The filter with its bindings substituted, or `None` when empty.
    pub fn filter_query(&self) -> Result<Option<String>> {
        if self.filter.is_empty() {
            return Ok(None);
        }
        assemble(&self.filter.query, &self.filter.bindings).map(Some)
    }

    /// Render the request as engine parameters.
    pub fn to_params(&self) -> Result<Vec<(String, String)>> {
        let mut params = Vec::new();
        let query = self.query.trim();

        if !query.is_empty() {
            params.push(("q".to_string(), query.to_string()));
        } else if !self.relevance.mode.is_dismax() {
            params.push(("q".to_string(), MATCH_ALL.to_string()));
        }

        if let Some(def_type) = self.relevance.mode.def_type() {
            params.push(("defType".to_string(), def_type.to_string()));
        }
        if let Some(qf) = &self.relevance.query_fields {
            params.push(("qf".to_string(), qf.clone()));
        }
        if let Some(alternative) = &self.relevance.query_alternative {
            params.push(("q.alt".to_string(), alternative.clone()));
        }

        if let Some(fq) = self.filter_query()? {
            params.push(("fq".to_string(), fq));
        }

        params.push(("start".to_string(), self.pagination.start.to_string()));
        if let Some(rows) = self.pagination.rows {
            params.push(("rows".to_string(), rows.to_string()));
        }

        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|s| format!("{} {}", s.field, s.direction.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            params.push(("sort".to_string(), sort));
        }

        if !self.fields.is_empty() {
            params.push(("fl".to_string(), self.fields.join(",")));
        }

        params.extend(self.facets.to_params());

        if self.spellcheck.enabled {
            params.push(("spellcheck".to_string(), "true".to_string()));
            if !query.is_empty() {
                params.push(("spellcheck.q".to_string(), query.to_string()));
            }
            if self.spellcheck.collate || self.spellcheck.auto_retry {
                params.push(("spellcheck.collate".to_string(), "true".to_string()));
                params.push((
                    "spellcheck.collateExtendedResults".to_string(),
                    "true".to_string(),
                ));
            }
        }

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterBuilder, FilterCompiler};
    use crate::relevance::RelevanceMode;

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            id: Uuid::new_v4(),
            endpoint: "core".to_string(),
            query: query.to_string(),
            filter: CompiledFilter::default(),
            facets: FacetRequest::default(),
            relevance: RelevanceParams::default(),
            pagination: Pagination::default(),
            sort: Vec::new(),
            spellcheck: SpellcheckOptions::default(),
            fields: vec!["id".to_string()],
        }
    }

    fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_page_window() {
        assert_eq!(PaginationOverride::page(1, 25).unwrap().start, Some(0));
        assert_eq!(PaginationOverride::page(3, 25).unwrap().start, Some(50));
        assert_eq!(PaginationOverride::page(3, 25).unwrap().rows, Some(25));
        assert!(PaginationOverride::page(0, 25).is_err());
        assert!(PaginationOverride::page(1, 0).is_err());
    }

    #[test]
    fn test_page_window_overflow_is_an_error() {
        assert!(matches!(
            PaginationOverride::page(usize::MAX / 2, 4),
            Err(PikeError::InvalidArgument(_))
        ));
        assert!(PaginationOverride::page(2, usize::MAX).is_err());
        assert_eq!(
            PaginationOverride::page(2, usize::MAX / 2).unwrap().start,
            Some(usize::MAX / 2)
        );
    }

    #[test]
    fn test_standard_params() {
        let mut req = request("title:rust");
        req.filter = FilterCompiler::new()
            .compile(
                &FilterBuilder::new()
                    .where_eq("lang", "en")
                    .or_where("lang", "de")
                    .build(),
            )
            .unwrap();
        req.pagination = Pagination {
            start: 50,
            rows: Some(25),
        };
        req.sort = vec![SortField {
            field: "published".into(),
            direction: SortDirection::Desc,
        }];

        let params = req.to_params().unwrap();
        assert_eq!(param(&params, "q"), Some("title:rust"));
        assert_eq!(param(&params, "fq"), Some("(lang:en OR lang:de)"));
        assert_eq!(param(&params, "start"), Some("50"));
        assert_eq!(param(&params, "rows"), Some("25"));
        assert_eq!(param(&params, "sort"), Some("published desc"));
        assert_eq!(param(&params, "fl"), Some("id"));
        assert_eq!(param(&params, "defType"), None);
        assert_eq!(param(&params, "facet"), None);
    }

    #[test]
    fn test_empty_dismax_query_uses_alternative() {
        let mut req = request("");
        req.relevance = RelevanceParams {
            mode: RelevanceMode::Dismax,
            query_fields: Some("title^2".to_string()),
            query_alternative: Some(MATCH_ALL.to_string()),
        };

        let params = req.to_params().unwrap();
        assert_eq!(param(&params, "q"), None);
        assert_eq!(param(&params, "defType"), Some("dismax"));
        assert_eq!(param(&params, "qf"), Some("title^2"));
        assert_eq!(param(&params, "q.alt"), Some("*:*"));
        assert_eq!(param(&params, "rows"), None);
    }

    #[test]
    fn test_spellcheck_params() {
        let mut req = request("serch");
        req.spellcheck = SpellcheckOptions {
            enabled: true,
            auto_retry: true,
            collate: false,
        };

        let params = req.to_params().unwrap();
        assert_eq!(param(&params, "spellcheck"), Some("true"));
        assert_eq!(param(&params, "spellcheck.q"), Some("serch"));
        assert_eq!(param(&params, "spellcheck.collate"), Some("true"));
    }
}
