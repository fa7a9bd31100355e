//! Turns a [`QueryBuilder`] into a request, executes it, and runs the
//! optional spellcheck retry.

use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::config::SearchConfig;
use crate::error::{PikeError, Result};
use crate::facet::FacetCompiler;
use crate::filter::FilterCompiler;
use crate::reconcile::{ReconciledResult, RecordStore, ResultReconciler};
use crate::record::PrimaryKey;
use crate::relevance::RelevanceModeSelector;
use crate::search::builder::QueryBuilder;
use crate::search::request::{Pagination, PaginationOverride, SearchRequest};
use crate::search::response::SearchResult;
use crate::search::transport::SearchTransport;

/// Compiles and executes searches against a transport.
#[derive(Debug, Clone)]
pub struct SearchExecutor {
    transport: Arc<dyn SearchTransport>,
    config: SearchConfig,
    filter_compiler: FilterCompiler,
    facet_compiler: FacetCompiler,
    selector: RelevanceModeSelector,
}

impl SearchExecutor {
    /// Create an executor over a shared transport.
    pub fn new(transport: Arc<dyn SearchTransport>, config: SearchConfig) -> Self {
        SearchExecutor {
            transport,
            config,
            filter_compiler: FilterCompiler::new(),
            facet_compiler: FacetCompiler::new(),
            selector: RelevanceModeSelector::new(),
        }
    }

    /// The executor's configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Compile a builder into a request without executing it.
    ///
    /// `overrides.start` only applies when the builder did not set its own
    /// start; `overrides.rows` replaces the builder's row limit.
    pub fn build_request(
        &self,
        builder: &QueryBuilder,
        overrides: Option<&PaginationOverride>,
    ) -> Result<SearchRequest> {
        let endpoint = builder
            .endpoint_name()
            .unwrap_or(&self.config.default_endpoint)
            .to_string();
        self.config.endpoint(&endpoint)?;

        let query = builder.query_text();
        let filter = self.filter_compiler.compile_all(builder.filters().nodes())?;
        let relevance = self
            .selector
            .params(&query, builder.boosts(), builder.is_dismax())?;
        let facets = self
            .facet_compiler
            .compile(builder.facets(), builder.facet_options())?;

        let start = builder
            .start()
            .or_else(|| overrides.and_then(|o| o.start))
            .unwrap_or(0);
        let rows = overrides.and_then(|o| o.rows).or(builder.rows());
        if rows == Some(0) {
            return Err(PikeError::invalid_argument(
                "rows must be greater than 0, or unset for no limit",
            ));
        }

        Ok(SearchRequest {
            id: Uuid::new_v4(),
            endpoint,
            query,
            filter,
            facets,
            relevance,
            pagination: Pagination { start, rows },
            sort: builder.sort().to_vec(),
            spellcheck: builder.spellcheck_options(),
            fields: vec![
                self.config.pk_field_name.clone(),
                self.config.type_field_name.clone(),
            ],
        })
    }

    /// Run a search with an optional pagination override.
    ///
    /// With auto-retry enabled, a collation that is blank or equal to the
    /// query text does not trigger the second search.
    pub fn execute(
        &self,
        builder: QueryBuilder,
        overrides: Option<PaginationOverride>,
    ) -> Result<SearchResult> {
        if !self.config.enabled {
            debug!("search disabled by configuration, returning an empty result");
            return Ok(SearchResult::empty());
        }

        let request = self.build_request(&builder, overrides.as_ref())?;
        debug!(
            "search {}: q='{}' mode={:?} on '{}'",
            request.id, request.query, request.relevance.mode, request.endpoint
        );
        let first = self.transport.select(&request)?;

        let collation = if request.spellcheck.auto_retry {
            first.collation().map(|c| c.query.trim().to_string())
        } else {
            None
        };
        let Some(collation) = collation.filter(|c| !c.is_empty() && *c != request.query) else {
            return Ok(first);
        };

        info!(
            "search {}: retrying '{}' with collation '{}'",
            request.id, request.query, collation
        );
        let retry = self.build_request(&builder.with_query_text(collation.clone()), overrides.as_ref())?;
        let mut second = self.transport.select(&retry)?;
        second.spellcheck = first.spellcheck;
        second.corrected_query = Some(collation);
        Ok(second)
    }

    /// Run a search with the builder's own pagination.
    pub fn search(&self, builder: QueryBuilder) -> Result<SearchResult> {
        self.execute(builder, None)
    }

    /// Fetch a 1-based page using the configured page size.
    pub fn paginate(&self, builder: QueryBuilder, page: usize) -> Result<SearchResult> {
        self.paginate_with(builder, self.config.paginate_size, page)
    }

    /// Fetch a 1-based page of `per_page` results.
    pub fn paginate_with(
        &self,
        builder: QueryBuilder,
        per_page: usize,
        page: usize,
    ) -> Result<SearchResult> {
        let overrides = PaginationOverride::page(page, per_page)?;
        self.execute(builder, Some(overrides))
    }

    /// Run a search and load the matching records from `store` in relevance
    /// order.
    ///
    /// Hits are restricted to the builder's type tag when one is set; the
    /// configured primary key field names the store's key column.
    pub fn get<T: RecordStore>(
        &self,
        builder: QueryBuilder,
        store: &T,
    ) -> Result<ReconciledResult<T::Record>> {
        let mut reconciler = ResultReconciler::for_store(store, self.config.pk_field_name.clone())?;
        if let Some(type_tag) = builder.type_tag() {
            reconciler = reconciler.for_type(type_tag);
        }
        let result = self.search(builder)?;
        reconciler.reconcile(result, store)
    }

    /// Keys of a result in relevance order.
    pub fn map_ids(&self, result: &SearchResult) -> Vec<PrimaryKey> {
        result.keys()
    }

    /// Total match count of a result.
    pub fn total_count(&self, result: &SearchResult) -> u64 {
        result.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relevance::{MATCH_ALL, RelevanceMode};
    use crate::search::memory::MemoryTransport;
    use crate::search::response::SpellcheckResult;

    fn executor(transport: Arc<MemoryTransport>) -> SearchExecutor {
        SearchExecutor::new(transport, SearchConfig::default())
    }

    #[test]
    fn test_disabled_executor_skips_transport() {
        let transport = Arc::new(MemoryTransport::with_responses([SearchResult::from_keys([1])]));
        let config = SearchConfig {
            enabled: false,
            ..SearchConfig::default()
        };
        let executor = SearchExecutor::new(transport.clone(), config);

        let result = executor.search(QueryBuilder::new("anything")).unwrap();
        assert!(result.is_empty());
        assert_eq!(transport.select_count(), 0);
    }

    #[test]
    fn test_builder_start_wins_over_override() {
        let executor = executor(Arc::new(MemoryTransport::new()));

        let overrides = PaginationOverride::page(3, 25).unwrap();
        let request = executor
            .build_request(&QueryBuilder::new("q").skip(7).take(5), Some(&overrides))
            .unwrap();
        assert_eq!(request.pagination.start, 7);
        assert_eq!(request.pagination.rows, Some(25));

        let request = executor
            .build_request(&QueryBuilder::new("q").take(5), Some(&overrides))
            .unwrap();
        assert_eq!(request.pagination.start, 50);

        let request = executor.build_request(&QueryBuilder::new("q").take(5), None).unwrap();
        assert_eq!(request.pagination, Pagination { start: 0, rows: Some(5) });
    }

    #[test]
    fn test_paginate_uses_config_page_size() {
        let transport = Arc::new(MemoryTransport::new());
        let executor = executor(transport.clone());

        executor.paginate(QueryBuilder::new("q"), 2).unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.pagination.start, 25);
        assert_eq!(request.pagination.rows, Some(25));

        assert!(matches!(
            executor.paginate(QueryBuilder::new("q"), 0),
            Err(PikeError::InvalidArgument(_))
        ));
        assert_eq!(transport.select_count(), 1);
    }

    #[test]
    fn test_dismax_alternative_query_is_set_before_transport() {
        let transport = Arc::new(MemoryTransport::new());
        let executor = executor(transport.clone());

        executor.search(QueryBuilder::new("").use_dismax()).unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.relevance.mode, RelevanceMode::Dismax);
        assert_eq!(request.relevance.query_alternative.as_deref(), Some(MATCH_ALL));
    }

    #[test]
    fn test_malformed_filter_fails_before_transport() {
        let transport = Arc::new(MemoryTransport::new());
        let executor = executor(transport.clone());

        let builder = QueryBuilder::new("q").where_template(
            "a:%L3%",
            vec!["x".into()],
            crate::filter::BooleanOp::And,
        );
        assert!(matches!(executor.search(builder), Err(PikeError::Query(_))));
        assert_eq!(transport.select_count(), 0);
    }

    #[test]
    fn test_unknown_endpoint_is_config_error() {
        let transport = Arc::new(MemoryTransport::new());
        let executor = executor(transport.clone());

        let err = executor
            .search(QueryBuilder::new("q").endpoint("missing"))
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(transport.select_count(), 0);
    }

    #[test]
    fn test_spellcheck_retry_runs_once() {
        let first = SearchResult::empty().with_spellcheck(
            SpellcheckResult::default()
                .with_suggestion("serch", vec!["search".into()])
                .with_collation("search", Some(3)),
        );
        let second = SearchResult::from_keys([4, 5, 6]).with_spellcheck(
            SpellcheckResult::default().with_collation("searches", None),
        );
        let transport = Arc::new(MemoryTransport::with_responses([first, second]));
        let executor = executor(transport.clone());

        let result = executor
            .search(QueryBuilder::new("serch").spellcheck_auto_retry())
            .unwrap();

        assert_eq!(transport.select_count(), 2);
        assert_eq!(transport.requests()[1].query, "search");
        assert_eq!(result.hits.len(), 3);
        assert_eq!(result.corrected_query.as_deref(), Some("search"));
        assert_eq!(result.collation().unwrap().query, "search");
    }

    #[test]
    fn test_get_reconciles_typed_hits() {
        use crate::reconcile::MemoryStore;
        use crate::record::Keyed;
        use crate::search::response::SearchHit;

        #[derive(Debug, Clone)]
        struct Post(i64);

        impl Keyed for Post {
            fn primary_key(&self) -> PrimaryKey {
                PrimaryKey::Int(self.0)
            }
        }

        let mut response = SearchResult::empty().with_total(3);
        response.hits = vec![
            SearchHit::new("2").with_type("posts"),
            SearchHit::new("7").with_type("users"),
            SearchHit::new("1").with_type("posts"),
        ];
        let transport = Arc::new(MemoryTransport::with_responses([response]));
        let executor = executor(transport);
        let store = MemoryStore::new("pgsql", vec![Post(1), Post(2), Post(7)]);

        let records = executor
            .get(QueryBuilder::new("hello").for_type("posts"), &store)
            .unwrap();
        let ids: Vec<i64> = records.records().iter().map(|p| p.0).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(records.total(), 3);
        assert_eq!(store.fetches()[0].key_column, "id");
    }

    #[test]
    fn test_get_rejects_unknown_dialect_before_search() {
        let transport = Arc::new(MemoryTransport::new());
        let executor = executor(transport.clone());
        let store: crate::reconcile::MemoryStore<PrimaryKeyRow> =
            crate::reconcile::MemoryStore::new("oracle", Vec::new());

        assert!(executor.get(QueryBuilder::new("q"), &store).unwrap_err().is_config());
        assert_eq!(transport.select_count(), 0);
    }

    #[derive(Debug, Clone)]
    struct PrimaryKeyRow(PrimaryKey);

    impl crate::record::Keyed for PrimaryKeyRow {
        fn primary_key(&self) -> PrimaryKey {
            self.0.clone()
        }
    }

    #[test]
    fn test_no_retry_without_auto_retry() {
        let first = SearchResult::empty()
            .with_spellcheck(SpellcheckResult::default().with_collation("search", None));
        let transport = Arc::new(MemoryTransport::with_responses([first]));
        let executor = executor(transport.clone());

        let result = executor
            .search(QueryBuilder::new("serch").spellcheck_collate())
            .unwrap();
        assert_eq!(transport.select_count(), 1);
        assert!(result.corrected_query.is_none());

        executor
            .search(QueryBuilder::new("serch").spellcheck_auto_retry())
            .unwrap();
        assert_eq!(transport.select_count(), 2);
    }

    #[test]
    fn test_zero_rows_is_rejected() {
        let transport = Arc::new(MemoryTransport::new());
        let executor = executor(transport.clone());

        assert!(matches!(
            executor.search(QueryBuilder::new("q").take(0)),
            Err(PikeError::InvalidArgument(_))
        ));
        assert_eq!(transport.select_count(), 0);

        let request = executor.build_request(&QueryBuilder::new("q"), None).unwrap();
        assert_eq!(request.pagination.rows, None);
    }

    #[test]
    fn test_collation_equal_to_query_does_not_retry() {
        let first = SearchResult::from_keys([1])
            .with_spellcheck(SpellcheckResult::default().with_collation(" kettle ", Some(1)));
        let transport = Arc::new(MemoryTransport::with_responses([first]));
        let executor = executor(transport.clone());

        let result = executor
            .search(QueryBuilder::new("kettle").spellcheck_auto_retry())
            .unwrap();
        assert_eq!(transport.select_count(), 1);
        assert_eq!(result.hits.len(), 1);
        assert!(result.corrected_query.is_none());
    }

    #[test]
    fn test_colliding_facets_fail_before_transport() {
        let transport = Arc::new(MemoryTransport::new());
        let executor = executor(transport.clone());

        let builder = QueryBuilder::new("q")
            .facet_field("brand")
            .facet_pivot(["brand", "field"]);
        assert!(matches!(executor.search(builder), Err(PikeError::Query(_))));
        assert_eq!(transport.select_count(), 0);
    }
}
