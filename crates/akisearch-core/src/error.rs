use thiserror::Error;

/// Canonical error type for criteria construction, request compilation and execution.
#[derive(Debug, Error)]
pub enum SearchError {
    /// An argument was missing, blank or outside its permitted range.
    #[error("invalid argument `{name}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument (e.g. `"field"`).
        name: &'static str,
        /// Human-readable explanation of the violation.
        message: String,
    },

    /// The operation is not valid for the current input.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The transport could not complete the exchange.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("request failed with status {status} ({reason})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason phrase reported alongside the status.
        reason: String,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// Serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error occurred.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The retry policy gave up after the configured number of attempts.
    #[error("the operation did not succeed after the maximum number of attempts ({max_attempts})")]
    RetryExhausted {
        /// Configured attempt budget.
        max_attempts: u32,
    },

    /// The operation was cancelled by the caller.
    #[error("the operation was cancelled")]
    Cancelled,

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SearchError {
    /// Creates an `InvalidArgument` variant.
    #[must_use]
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    /// Creates an `InvalidOperation` variant.
    #[must_use]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Returns `true` for the cancellation signal.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_eof() || err.is_syntax() || err.is_data() {
            Self::Deserialization(err.to_string())
        } else {
            Self::Serialization(err.to_string())
        }
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenient result alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Rejects null-equivalent (empty or whitespace-only) identifiers.
pub(crate) fn require_non_blank(name: &'static str, value: &str) -> SearchResult<()> {
    if value.trim().is_empty() {
        return Err(SearchError::invalid_argument(name, "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_names_field() {
        let err = SearchError::invalid_argument("field", "must not be blank");
        assert_eq!(
            err.to_string(),
            "invalid argument `field`: must not be blank"
        );
    }

    #[test]
    fn test_retry_exhausted_carries_attempts() {
        let err = SearchError::RetryExhausted { max_attempts: 3 };
        assert!(err.to_string().contains("(3)"));
        assert!(!err.is_cancelled());
        assert!(SearchError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_json_syntax_error_maps_to_deserialization() {
        let err: SearchError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, SearchError::Deserialization(_)));
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("field", "name").is_ok());
        assert!(require_non_blank("field", "").is_err());
        assert!(require_non_blank("field", "   ").is_err());
    }
}
