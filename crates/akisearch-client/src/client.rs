use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use akisearch_core::{AkisearchConfig, Connection, SearchError, SearchRequest, SearchResult};
use akisearch_query::{create_formatter, FormattedRequest};

use crate::cancel::CancellationToken;
use crate::materializer::{materialize, Materialization, Materialized};
use crate::response::SearchResponse;
use crate::retry::RetryPolicy;
use crate::transport::{HttpTransport, Transport};

/// Decides whether a search outcome is retried.
pub type RetryPredicate = Arc<dyn Fn(&SearchResult<SearchResponse>) -> bool + Send + Sync>;

/// Retries every error except cancellation. Successful responses are final.
pub fn retry_on_error(outcome: &SearchResult<SearchResponse>) -> bool {
    matches!(outcome, Err(err) if !err.is_cancelled())
}

/// Executes search requests against one connection.
///
/// Requests are compiled before the first attempt; compilation errors are
/// returned directly and never retried.
#[derive(Clone)]
pub struct SearchClient {
    connection: Connection,
    transport: Arc<dyn Transport>,
    retry_policy: RetryPolicy,
    should_retry: RetryPredicate,
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("connection", &self.connection)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl SearchClient {
    pub fn new(
        connection: Connection,
        transport: Arc<dyn Transport>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            connection,
            transport,
            retry_policy,
            should_retry: Arc::new(retry_on_error),
        }
    }

    /// Client over HTTP built from loaded configuration.
    pub fn from_config(config: &AkisearchConfig) -> SearchResult<Self> {
        let connection = Connection::try_from(&config.connection)?;
        let transport = HttpTransport::for_connection(&connection)?;

        Ok(Self::new(
            connection,
            Arc::new(transport),
            RetryPolicy::from_config(&config.retry),
        ))
    }

    /// Replace the retry decision. It is never consulted once the
    /// caller's token is cancelled.
    #[must_use]
    pub fn with_retry_predicate<P>(mut self, should_retry: P) -> Self
    where
        P: Fn(&SearchResult<SearchResponse>) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Arc::new(should_retry);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Compile `request` for this connection without sending it.
    pub fn compile(&self, request: &SearchRequest) -> SearchResult<FormattedRequest> {
        create_formatter(&self.connection, request).format()
    }

    /// Execute `request` and return the parsed response.
    pub async fn search(
        &self,
        request: &SearchRequest,
        token: &CancellationToken,
    ) -> SearchResult<SearchResponse> {
        let formatted = self.compile(request)?;
        debug!(method = %formatted.method, uri = %formatted.uri, "Executing search");

        let client = self;
        let formatted = &formatted;
        let should_retry = &self.should_retry;

        let response = self
            .retry_policy
            .execute_with_log_info(
                move |attempt_token| client.send_once(formatted, attempt_token),
                |outcome| !token.is_cancelled() && should_retry(outcome),
                |_, info| {
                    info.insert("method".to_string(), formatted.method.to_string());
                    info.insert("uri".to_string(), formatted.uri.clone());
                },
                token,
            )
            .await?;

        info!(
            took_ms = response.took,
            hits = response.hits().len(),
            total = response.total(),
            "Search completed"
        );

        Ok(response)
    }

    /// Execute `request` and project its hits into `T`.
    pub async fn search_as<T>(
        &self,
        request: &SearchRequest,
        materialization: Materialization,
        token: &CancellationToken,
    ) -> SearchResult<Materialized<T>>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.search(request, token).await?;
        materialize(&response, materialization)
    }

    async fn send_once(
        &self,
        request: &FormattedRequest,
        token: CancellationToken,
    ) -> SearchResult<SearchResponse> {
        if token.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let response = tokio::select! {
            _ = token.cancelled() => return Err(SearchError::Cancelled),
            response = self.transport.send(request) => response?,
        };

        if !response.is_success() {
            return Err(SearchError::Status {
                status: response.status,
                reason: response.reason,
                body: response.body,
            });
        }

        SearchResponse::parse(&response.body)
    }
}
