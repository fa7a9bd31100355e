//! Record store seam.

use std::fmt::Debug;

use ahash::AHashSet;
use parking_lot::Mutex;

use crate::error::Result;
use crate::record::{Keyed, PrimaryKey};

/// Parameters of a single store lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Keys to load.
    pub keys: Vec<PrimaryKey>,
    /// Name of the primary key column.
    pub key_column: String,
    /// Dialect-specific ordering expression.
    pub order_by: String,
}

/// Loads records by primary key.
///
/// Stores should apply `order_by`, but the reconciler does not rely on it.
pub trait RecordStore {
    /// Record type returned by this store.
    type Record: Keyed;

    /// Name of the store's relational dialect.
    fn dialect(&self) -> &str;

    /// Load the records whose keys are in `request.keys`.
    fn fetch_by_keys(&self, request: &FetchRequest) -> Result<Vec<Self::Record>>;
}

/// A store over an in-memory record list.
///
/// Ignores the ordering hint and returns matches in insertion order. Every
/// fetch is recorded.
#[derive(Debug)]
pub struct MemoryStore<R> {
    dialect: String,
    records: Vec<R>,
    fetches: Mutex<Vec<FetchRequest>>,
}

impl<R: Keyed + Clone + Debug> MemoryStore<R> {
    pub fn new<S: Into<String>>(dialect: S, records: Vec<R>) -> Self {
        MemoryStore {
            dialect: dialect.into(),
            records,
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Lookups received so far.
    pub fn fetches(&self) -> Vec<FetchRequest> {
        self.fetches.lock().clone()
    }
}

impl<R: Keyed + Clone + Debug> RecordStore for MemoryStore<R> {
    type Record = R;

    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn fetch_by_keys(&self, request: &FetchRequest) -> Result<Vec<R>> {
        self.fetches.lock().push(request.clone());
        let wanted: AHashSet<String> = request.keys.iter().map(|k| k.to_string()).collect();
        Ok(self
            .records
            .iter()
            .filter(|r| wanted.contains(&r.primary_key().to_string()))
            .cloned()
            .collect())
    }
}
