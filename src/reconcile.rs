//! Maps engine hits back to relational records in relevance order.
//!
//! The search engine only returns primary keys. The [`ResultReconciler`]
//! fetches the matching records from a [`RecordStore`] with a dialect-specific
//! ordering clause and then restores the engine's order in memory, so the
//! result is correct even when the store ignores the ordering hint.

pub mod dialect;
pub mod reconciler;
pub mod result;
pub mod store;

pub use self::dialect::{CaseOrdering, Dialect, FieldOrdering, OrderingStrategy};
pub use self::reconciler::ResultReconciler;
pub use self::result::ReconciledResult;
pub use self::store::{FetchRequest, MemoryStore, RecordStore};
