//! In-memory transport for testing and demos.

use std::collections::VecDeque;

use log::debug;
use parking_lot::Mutex;

use crate::error::{PikeError, Result};
use crate::indexing::UpdateCommand;
use crate::search::request::SearchRequest;
use crate::search::response::SearchResult;
use crate::search::transport::SearchTransport;

/// A transport that replays scripted responses and records every call.
///
/// Responses are consumed in FIFO order; once the queue is exhausted every
/// select returns an empty result.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: Mutex<VecDeque<Result<SearchResult>>>,
    requests: Mutex<Vec<SearchRequest>>,
    updates: Mutex<Vec<(String, UpdateCommand)>>,
}

impl MemoryTransport {
    /// Create a transport with no scripted responses.
    pub fn new() -> Self {
        MemoryTransport::default()
    }

    /// Create a transport that answers with `responses` in order.
    pub fn with_responses<I: IntoIterator<Item = SearchResult>>(responses: I) -> Self {
        let transport = MemoryTransport::new();
        for response in responses {
            transport.push_response(response);
        }
        transport
    }

    /// Queue a response.
    pub fn push_response(&self, response: SearchResult) {
        self.responses.lock().push_back(Ok(response));
    }

    /// Queue a transport failure.
    pub fn push_failure<S: Into<String>>(&self, message: S) {
        let message = message.into();
        self.responses
            .lock()
            .push_back(Err(PikeError::transport(anyhow::anyhow!(message))));
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().clone()
    }

    /// Number of select calls received so far.
    pub fn select_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Update commands received so far, with their endpoints.
    pub fn updates(&self) -> Vec<(String, UpdateCommand)> {
        self.updates.lock().clone()
    }
}

impl SearchTransport for MemoryTransport {
    fn select(&self, request: &SearchRequest) -> Result<SearchResult> {
        debug!("memory transport: select {} on '{}'", request.id, request.endpoint);
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchResult::empty()))
    }

    fn update(&self, endpoint: &str, command: &UpdateCommand) -> Result<()> {
        debug!(
            "memory transport: update '{}' with {} documents and {} deletes",
            endpoint,
            command.documents.len(),
            command.deletes.len()
        );
        self.updates
            .lock()
            .push((endpoint.to_string(), command.clone()));
        Ok(())
    }
}
