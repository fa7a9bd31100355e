//! Integration tests for mapping engine hits onto store records.

use std::sync::Arc;

use parking_lot::Mutex;
use pike::prelude::*;
use pike::reconcile::{FetchRequest, FieldOrdering, OrderingStrategy};
use pike::search::SearchHit;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: i64,
    login: String,
}

impl Keyed for User {
    fn primary_key(&self) -> PrimaryKey {
        PrimaryKey::Int(self.id)
    }
}

impl Searchable for User {
    fn type_tag(&self) -> String {
        "users".to_string()
    }

    fn searchable_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("login".to_string(), json!(self.login));
        fields
    }
}

/// A store that answers in reverse key order and counts its calls.
#[derive(Debug, Default)]
struct ReversingStore {
    users: Vec<User>,
    calls: Mutex<Vec<FetchRequest>>,
}

impl RecordStore for ReversingStore {
    type Record = User;

    fn dialect(&self) -> &str {
        "mysql"
    }

    fn fetch_by_keys(&self, request: &FetchRequest) -> Result<Vec<User>> {
        self.calls.lock().push(request.clone());
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| request.keys.iter().any(|k| k.to_string() == u.id.to_string()))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(users)
    }
}

fn users(n: i64) -> Vec<User> {
    (1..=n)
        .map(|id| User {
            id,
            login: format!("user{id}"),
        })
        .collect()
}

#[test]
fn test_permutation_is_preserved() -> Result<()> {
    let store = ReversingStore {
        users: users(5),
        ..ReversingStore::default()
    };
    let reconciler = ResultReconciler::for_store(&store, "id")?;

    let result = SearchResult::from_keys([3, 1, 2]).with_total(42);
    let reconciled = reconciler.reconcile(result, &store)?;

    let ids: Vec<i64> = reconciled.records().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(reconciled.total(), 42);

    let calls = store.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].order_by, FieldOrdering.order_by("id", &calls[0].keys));
    assert_eq!(calls[0].order_by, "FIELD(id, 3, 1, 2)");

    Ok(())
}

#[test]
fn test_empty_result_never_fetches() -> Result<()> {
    let store = ReversingStore {
        users: users(3),
        ..ReversingStore::default()
    };
    let reconciler = ResultReconciler::for_store(&store, "id")?;

    let reconciled = reconciler.reconcile(SearchResult::empty().with_total(0), &store)?;
    assert!(reconciled.is_empty());
    assert!(store.calls.lock().is_empty());

    Ok(())
}

#[test]
fn test_stale_hits_are_skipped() -> Result<()> {
    let store = MemoryStore::new("pgsql", users(2));
    let reconciler = ResultReconciler::for_store(&store, "id")?.for_type("users");

    let mut result = SearchResult::empty().with_total(3);
    result.hits = vec![
        SearchHit::new(2).with_type("users"),
        SearchHit::new(10).with_type("users"),
        SearchHit::new(1).with_type("users"),
    ];
    let reconciled = reconciler.reconcile(result, &store)?;

    let logins: Vec<&str> = reconciled.records().iter().map(|u| u.login.as_str()).collect();
    assert_eq!(logins, vec!["user2", "user1"]);
    assert!(store.fetches()[0].order_by.starts_with("CASE WHEN id = 2 THEN 0"));

    Ok(())
}

#[test]
fn test_index_then_search_round_trip() -> Result<()> {
    let transport = Arc::new(MemoryTransport::new());
    let config = SearchConfig::default();
    let indexer = Indexer::new(transport.clone(), config.clone());
    let all = users(3);

    assert_eq!(indexer.update(&all)?, 3);
    let updates = transport.updates();
    let documents = &updates[0].1.documents;
    assert_eq!(documents.len(), 3);
    assert_eq!(documents[0].fields["id"], json!(1));
    assert_eq!(documents[0].fields["model_table"], json!("users"));

    transport.push_response(SearchResult::from_keys([2, 3]));
    let executor = SearchExecutor::new(transport, config);
    let store = MemoryStore::new("sqlite", all);
    let found = executor.get(QueryBuilder::new("user").for_type("users"), &store)?;
    assert_eq!(found.into_records(), vec![store_user(2), store_user(3)]);

    Ok(())
}

fn store_user(id: i64) -> User {
    User {
        id,
        login: format!("user{id}"),
    }
}
