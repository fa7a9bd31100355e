//! Search orchestration: the query builder, compiled requests, the transport
//! seam, and the executor that ties them together.

pub mod builder;
pub mod executor;
pub mod memory;
pub mod request;
pub mod response;
pub mod transport;

pub use self::builder::QueryBuilder;
pub use self::executor::SearchExecutor;
pub use self::memory::MemoryTransport;
pub use self::request::{
    Pagination, PaginationOverride, SearchRequest, SortDirection, SortField, SpellcheckOptions,
};
pub use self::response::{Collation, SearchHit, SearchResult, SpellcheckResult, TermSuggestion};
pub use self::transport::SearchTransport;
