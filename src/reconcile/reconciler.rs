//! Restores engine rank order over fetched records.

use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, warn};

use crate::error::Result;
use crate::reconcile::dialect::{Dialect, OrderingStrategy};
use crate::reconcile::result::ReconciledResult;
use crate::reconcile::store::{FetchRequest, RecordStore};
use crate::record::{Keyed, PrimaryKey};
use crate::search::SearchResult;

/// Maps search hits onto store records.
#[derive(Debug, Clone)]
pub struct ResultReconciler {
    dialect: Dialect,
    strategy: Arc<dyn OrderingStrategy>,
    key_column: String,
    type_tag: Option<String>,
}

impl ResultReconciler {
    /// Create a reconciler for a dialect name; unknown dialects are a
    /// configuration error.
    pub fn new<S: Into<String>>(dialect: &str, key_column: S) -> Result<Self> {
        let dialect: Dialect = dialect.parse()?;
        Ok(ResultReconciler {
            dialect,
            strategy: Arc::from(dialect.strategy()),
            key_column: key_column.into(),
            type_tag: None,
        })
    }

    /// Create a reconciler matching a store's dialect.
    pub fn for_store<T: RecordStore, S: Into<String>>(store: &T, key_column: S) -> Result<Self> {
        ResultReconciler::new(store.dialect(), key_column)
    }

    /// Only keep hits tagged with `type_tag`. Hits without a tag are kept.
    pub fn for_type<S: Into<String>>(mut self, type_tag: S) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Keys of the hits this reconciler keeps, in relevance order.
    pub fn keys(&self, result: &SearchResult) -> Vec<PrimaryKey> {
        result
            .hits
            .iter()
            .filter(|hit| match (&self.type_tag, &hit.type_tag) {
                (Some(wanted), Some(tag)) => wanted == tag,
                _ => true,
            })
            .map(|hit| hit.key.clone())
            .collect()
    }

    /// Load the records behind `result` in relevance order.
    ///
    /// The store is not called when there is nothing to load. Records whose
    /// key was not among the hits are dropped, and hits without a record are
    /// skipped.
    pub fn reconcile<T: RecordStore>(
        &self,
        result: SearchResult,
        store: &T,
    ) -> Result<ReconciledResult<T::Record>> {
        let keys = self.keys(&result);
        let SearchResult {
            total,
            facets,
            spellcheck,
            corrected_query,
            ..
        } = result;

        let records = if keys.is_empty() {
            Vec::new()
        } else {
            let request = FetchRequest {
                order_by: self.strategy.order_by(&self.key_column, &keys),
                key_column: self.key_column.clone(),
                keys,
            };
            debug!(
                "fetching {} records ordered by {} strategy",
                request.keys.len(),
                self.strategy.name()
            );
            let fetched = store.fetch_by_keys(&request)?;
            self.reorder(&request.keys, fetched)
        };

        Ok(ReconciledResult {
            records,
            total,
            facets,
            spellcheck,
            corrected_query,
        })
    }

    fn reorder<R: Keyed>(&self, keys: &[PrimaryKey], fetched: Vec<R>) -> Vec<R> {
        let mut positions: AHashMap<String, usize> = AHashMap::with_capacity(keys.len());
        for (position, key) in keys.iter().enumerate() {
            positions.entry(key.to_string()).or_insert(position);
        }

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(keys.len()).collect();
        for record in fetched {
            let key = record.primary_key().to_string();
            match positions.get(&key) {
                Some(&position) if slots[position].is_none() => slots[position] = Some(record),
                Some(_) => warn!("duplicate record for key {key}, keeping the first"),
                None => warn!("store returned unrequested key {key}"),
            }
        }
        slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{FacetResult, FacetSet};
    use crate::reconcile::store::MemoryStore;
    use crate::search::SearchHit;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: &'static str,
    }

    impl Keyed for Row {
        fn primary_key(&self) -> PrimaryKey {
            PrimaryKey::Int(self.id)
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, name: "one" },
            Row { id: 2, name: "two" },
            Row { id: 3, name: "three" },
            Row { id: 4, name: "four" },
        ]
    }

    #[test]
    fn test_engine_order_is_restored() {
        let store = MemoryStore::new("sqlite", rows());
        let reconciler = ResultReconciler::for_store(&store, "id").unwrap();

        let result = SearchResult::from_keys(["3", "1", "2"]).with_total(10);
        let reconciled = reconciler.reconcile(result, &store).unwrap();

        let ids: Vec<i64> = reconciled.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(reconciled.total(), 10);
        assert_eq!(
            store.fetches()[0].order_by,
            "CASE WHEN id = '3' THEN 0 WHEN id = '1' THEN 1 WHEN id = '2' THEN 2 ELSE 3 END"
        );
    }

    #[test]
    fn test_empty_result_skips_store() {
        let store = MemoryStore::new("mysql", rows());
        let reconciler = ResultReconciler::new("mysql", "id").unwrap();
        let facets = FacetSet::new().with("brand-query", FacetResult::Query(0));

        let reconciled = reconciler
            .reconcile(SearchResult::empty().with_facets(facets), &store)
            .unwrap();
        assert!(reconciled.is_empty());
        assert!(reconciled.facets().get("brand-query").is_some());
        assert!(store.fetches().is_empty());
    }

    #[test]
    fn test_type_filter_and_missing_records() {
        let store = MemoryStore::new("mariadb", rows());
        let reconciler = ResultReconciler::new("mariadb", "id").unwrap().for_type("rows");

        let mut result = SearchResult::empty();
        result.hits = vec![
            SearchHit::new(4).with_type("rows"),
            SearchHit::new(2).with_type("other"),
            SearchHit::new(99).with_type("rows"),
            SearchHit::new(1),
        ];
        let reconciled = reconciler.reconcile(result, &store).unwrap();

        let names: Vec<&str> = reconciled.records().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["four", "one"]);
        assert_eq!(store.fetches()[0].order_by, "FIELD(id, 4, 99, 1)");
    }

    #[test]
    fn test_only_foreign_types_skips_store() {
        let store = MemoryStore::new("sqlite", rows());
        let reconciler = ResultReconciler::new("sqlite", "id").unwrap().for_type("rows");

        let mut result = SearchResult::empty();
        result.hits = vec![SearchHit::new(1).with_type("other")];
        assert!(reconciler.reconcile(result, &store).unwrap().is_empty());
        assert!(store.fetches().is_empty());
    }

    #[test]
    fn test_unknown_dialect() {
        let store = MemoryStore::new("oracle", rows());
        assert!(ResultReconciler::for_store(&store, "id").unwrap_err().is_config());
    }

    #[test]
    fn test_untagged_hits_survive_type_filter() {
        let store = MemoryStore::new("sqlite", rows());
        let reconciler = ResultReconciler::new("sqlite", "id").unwrap().for_type("rows");

        let mut result = SearchResult::empty();
        result.hits = vec![
            SearchHit::new(2),
            SearchHit::new(3).with_type("other"),
            SearchHit::new(1).with_type("rows"),
        ];
        assert_eq!(
            reconciler.keys(&result),
            vec![PrimaryKey::Int(2), PrimaryKey::Int(1)]
        );

        let reconciled = reconciler.reconcile(result, &store).unwrap();
        let ids: Vec<i64> = reconciled.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
