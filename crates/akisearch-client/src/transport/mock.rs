//! Scripted in-memory transport for testing.
//!
//! Replies are consumed in order. Every request is recorded so tests can
//! assert on what was sent and how often.
//!
//! ```rust
//! use akisearch_client::{MockReply, MockTransport, TransportResponse};
//!
//! let transport = MockTransport::new_with_replies(vec![
//!     MockReply::Error("connection reset"),
//!     MockReply::Response(TransportResponse::ok(r#"{"hits":{"total":0,"hits":[]}}"#)),
//! ]);
//! assert_eq!(transport.call_count(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use akisearch_core::{SearchError, SearchResult};
use akisearch_query::FormattedRequest;

use super::{Transport, TransportResponse};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(TransportResponse),
    /// Fails the exchange with [`SearchError::Transport`].
    Error(&'static str),
}

/// [`Transport`] replaying a fixed script.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<FormattedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::default(),
        }
    }

    /// Append a reply to the script.
    pub fn push(&self, reply: MockReply) {
        self.replies.lock().push_back(reply);
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<FormattedRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn remaining_replies(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &FormattedRequest) -> SearchResult<TransportResponse> {
        self.requests.lock().push(request.clone());

        match self.replies.lock().pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(message)) => Err(SearchError::Transport(message.to_string())),
            None => Err(SearchError::Transport(
                "mock transport has no scripted reply".to_string(),
            )),
        }
    }
}
