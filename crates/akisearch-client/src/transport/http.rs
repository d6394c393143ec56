use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::trace;

use akisearch_core::{Connection, SearchError, SearchResult};
use akisearch_query::{FormattedRequest, HttpMethod};

use super::{Transport, TransportResponse};

/// Client-side timeout when the connection sets none, and the floor otherwise.
const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Headroom past the search timeout for the service to send its partial reply.
const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// [`Transport`] over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> SearchResult<Self> {
        Self::with_timeout(DEFAULT_CLIENT_TIMEOUT)
    }

    /// Transport whose client-side timeout outlasts the connection's search
    /// timeout, so a `timed_out` reply from the service still arrives.
    pub fn for_connection(connection: &Connection) -> SearchResult<Self> {
        Self::with_timeout(client_timeout(connection.timeout()))
    }

    fn with_timeout(timeout: Duration) -> SearchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Use a preconfigured client (proxies, TLS roots, custom timeouts).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Search timeout plus a margin, never below the default client timeout.
fn client_timeout(search_timeout: Duration) -> Duration {
    (search_timeout + CLIENT_TIMEOUT_MARGIN).max(DEFAULT_CLIENT_TIMEOUT)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &FormattedRequest) -> SearchResult<TransportResponse> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.uri),
            HttpMethod::Post => self.client.post(&request.uri),
        };

        let builder = match &request.body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone()),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| SearchError::Transport(format!("{} {}: {}", request.method, request.uri, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(format!("failed to read response body: {}", e)))?;

        trace!(status = status.as_u16(), bytes = body.len(), "Received search response");

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_timeout_outlasts_search_timeout() {
        assert_eq!(client_timeout(Duration::ZERO), DEFAULT_CLIENT_TIMEOUT);
        assert_eq!(client_timeout(Duration::from_millis(500)), DEFAULT_CLIENT_TIMEOUT);
        assert_eq!(
            client_timeout(Duration::from_secs(60)),
            Duration::from_secs(65)
        );
        assert!(client_timeout(Duration::from_secs(26)) > Duration::from_secs(30));
    }
}
