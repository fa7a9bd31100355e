//! # Pike
//!
//! A query compiler and result reconciler for Solr-style search engines.
//!
//! ## Features
//!
//! - Boolean filter trees compiled with globally numbered, safely bound
//!   placeholders
//! - Field, query, multi-query and pivot facets
//! - Automatic standard/dismax/edismax relevance mode selection
//! - One-shot spellcheck retry using the engine's collation
//! - Rank-preserving mapping of engine hits onto relational records
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pike::prelude::*;
//!
//! let transport = Arc::new(MemoryTransport::with_responses([SearchResult::from_keys([3, 1])]));
//! let executor = SearchExecutor::new(transport, SearchConfig::default());
//!
//! let builder = QueryBuilder::new("kettle")
//!     .where_eq("brand", "acme")
//!     .facet_field("color");
//! let result = executor.search(builder).unwrap();
//! assert_eq!(result.keys(), vec![PrimaryKey::Int(3), PrimaryKey::Int(1)]);
//! ```

pub mod config;
pub mod error;
pub mod facet;
pub mod filter;
pub mod indexing;
pub mod reconcile;
pub mod record;
pub mod relevance;
pub mod search;

pub mod prelude {
    pub use crate::config::{EndpointConfig, SearchConfig};
    pub use crate::error::{PikeError, Result};
    pub use crate::facet::{FacetResult, FacetSet, FacetSpec, FacetValueCount, PivotNode};
    pub use crate::filter::{Binding, BooleanOp, FilterBuilder, FilterNode, PlaceholderMode};
    pub use crate::indexing::{Indexer, Searchable};
    pub use crate::reconcile::{MemoryStore, ReconciledResult, RecordStore, ResultReconciler};
    pub use crate::record::{Keyed, PrimaryKey};
    pub use crate::relevance::{BoostSpec, RelevanceMode};
    pub use crate::search::{
        MemoryTransport, PaginationOverride, QueryBuilder, SearchExecutor, SearchResult,
        SearchTransport,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
