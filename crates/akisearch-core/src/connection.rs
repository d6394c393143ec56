use std::time::Duration;

use crate::config::ConnectionConfig;
use crate::error::{require_non_blank, SearchError, SearchResult};

/// Validated description of the search endpoint a request is compiled against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    endpoint: String,
    index: Option<String>,
    timeout: Duration,
    prefer_get_requests: bool,
}

impl Connection {
    /// Create a connection to `endpoint` with no index and no timeout.
    ///
    /// The endpoint is normalized to end with a single `/`.
    pub fn new(endpoint: impl Into<String>) -> SearchResult<Self> {
        let endpoint = endpoint.into();
        require_non_blank("endpoint", &endpoint)?;

        let endpoint = endpoint.trim();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(SearchError::invalid_argument(
                "endpoint",
                format!("must be an http(s) URL, got '{}'", endpoint),
            ));
        }

        Ok(Self {
            endpoint: format!("{}/", endpoint.trim_end_matches('/')),
            index: None,
            timeout: Duration::ZERO,
            prefer_get_requests: false,
        })
    }

    /// Restrict searches to a single index.
    pub fn with_index(mut self, index: impl Into<String>) -> SearchResult<Self> {
        let index = index.into();
        require_non_blank("index", &index)?;
        self.index = Some(index);
        Ok(self)
    }

    /// Set the server-side search timeout. `Duration::ZERO` omits it from request bodies.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Prefer compact query-string requests when the request can be expressed that way.
    #[must_use]
    pub fn with_prefer_get_requests(mut self, prefer: bool) -> Self {
        self.prefer_get_requests = prefer;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn prefer_get_requests(&self) -> bool {
        self.prefer_get_requests
    }
}

impl TryFrom<&ConnectionConfig> for Connection {
    type Error = SearchError;

    fn try_from(config: &ConnectionConfig) -> SearchResult<Self> {
        let mut connection = Connection::new(config.endpoint.clone())?
            .with_timeout(config.timeout())
            .with_prefer_get_requests(config.prefer_get_requests);

        if let Some(index) = &config.index {
            connection = connection.with_index(index.clone())?;
        }

        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_normalized() {
        let connection = Connection::new("http://a.b.com:9000").unwrap();
        assert_eq!(connection.endpoint(), "http://a.b.com:9000/");

        let connection = Connection::new("http://a.b.com:9000//").unwrap();
        assert_eq!(connection.endpoint(), "http://a.b.com:9000/");
    }

    #[test]
    fn test_rejects_blank_or_non_http_endpoint() {
        assert!(matches!(
            Connection::new(" "),
            Err(SearchError::InvalidArgument { name: "endpoint", .. })
        ));
        assert!(Connection::new("a.b.com").is_err());
    }

    #[test]
    fn test_rejects_blank_index() {
        let connection = Connection::new("http://a.b.com/").unwrap();
        assert!(connection.with_index("").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = ConnectionConfig {
            endpoint: "https://search.local/".to_string(),
            index: Some("products".to_string()),
            timeout_ms: 1500,
            prefer_get_requests: true,
        };

        let connection = Connection::try_from(&config).unwrap();
        assert_eq!(connection.index(), Some("products"));
        assert_eq!(connection.timeout(), Duration::from_millis(1500));
        assert!(connection.prefer_get_requests());
    }
}
