//! Transport abstraction: sends one formatted request and returns the raw reply.
//!
//! The transport does not interpret status codes; the client turns a
//! non-success status into [`SearchError::Status`](akisearch_core::SearchError::Status).

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockReply, MockTransport};

use async_trait::async_trait;

use akisearch_core::SearchResult;
use akisearch_query::FormattedRequest;

/// Raw reply of the search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl TransportResponse {
    /// `200 OK` carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends formatted requests to the search service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange. Failures to reach the service are
    /// [`SearchError::Transport`](akisearch_core::SearchError::Transport).
    async fn send(&self, request: &FormattedRequest) -> SearchResult<TransportResponse>;
}
