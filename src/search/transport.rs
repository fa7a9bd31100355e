//! Transport seam between the compiler and the search engine.
//!
//! Network access, connection pooling, retries and timeouts all live behind
//! [`SearchTransport`]. The executor issues at most two `select` calls per
//! search and never retries a failed one; whatever error the transport
//! returns reaches the caller as is.

use std::fmt::Debug;

use crate::error::Result;
use crate::indexing::UpdateCommand;
use crate::search::request::SearchRequest;
use crate::search::response::SearchResult;

/// A long-lived, shared handle to the search engine.
pub trait SearchTransport: Send + Sync + Debug {
    /// Execute a search request.
    ///
    /// Implementations substitute the filter bindings themselves, typically
    /// through [`SearchRequest::to_params`].
    fn select(&self, request: &SearchRequest) -> Result<SearchResult>;

    /// Apply an index update to an endpoint.
    fn update(&self, endpoint: &str, command: &UpdateCommand) -> Result<()>;
}
