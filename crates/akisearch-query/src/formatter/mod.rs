//! Request formatters compiling a [`SearchRequest`] into a wire request.
//!
//! Two formatters share one contract:
//! - [`QueryStringFormatter`] renders everything into the URI and sends a `GET`
//! - [`BodyFormatter`] renders a JSON body and sends a `POST`
//!
//! [`create_formatter`] picks between them. The connection's preference for
//! compact requests is advisory; the request's shape decides.

mod body;
mod query_string;

pub use body::BodyFormatter;
pub use query_string::QueryStringFormatter;

use std::fmt;
use std::time::Duration;

use tracing::debug;

use akisearch_core::{Connection, Criteria, SearchRequest, SearchResult};

/// Literal path segment of the search endpoint.
pub const SEARCH_SEGMENT: &str = "_search";

/// HTTP method a formatted request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRequest {
    pub method: HttpMethod,
    pub uri: String,
    pub body: Option<String>,
}

/// Compiles one search request against one connection.
pub trait RequestFormatter: Send + Sync {
    fn method(&self) -> HttpMethod;

    /// Fully qualified target URI, including any query string.
    fn uri(&self) -> String;

    /// Request body, if the method carries one.
    fn body(&self) -> SearchResult<Option<String>>;

    fn format(&self) -> SearchResult<FormattedRequest> {
        Ok(FormattedRequest {
            method: self.method(),
            uri: self.uri(),
            body: self.body()?,
        })
    }
}

/// Choose the formatter for `request`.
///
/// The query-string formatter is used only when the connection prefers
/// compact requests and the request can be expressed without a body.
pub fn create_formatter<'a>(
    connection: &'a Connection,
    request: &'a SearchRequest,
) -> Box<dyn RequestFormatter + 'a> {
    if connection.prefer_get_requests() {
        match QueryStringFormatter::new(connection, request) {
            Ok(formatter) => {
                debug!(formatter = "query_string", "selected request formatter");
                return Box::new(formatter);
            }
            Err(e) => {
                debug!(
                    formatter = "body",
                    reason = %e,
                    "request needs a body; ignoring compact request preference"
                );
            }
        }
    }

    Box::new(BodyFormatter::new(connection, request))
}

/// Whether `request` can be expressed entirely as URI parameters.
///
/// Facets, sorts that ignore unmapped fields, and more than one criteria
/// group all need a structured body.
pub fn is_query_string_capable(request: &SearchRequest) -> bool {
    if !request.facets().is_empty() {
        return false;
    }

    if request.sort_options().iter().any(|sort| sort.ignore_unmapped()) {
        return false;
    }

    match (request.filter(), request.query()) {
        (None, None) => true,
        (Some(criteria), None) | (None, Some(criteria)) => {
            query_string_expression(criteria).is_some()
        }
        (Some(_), Some(_)) => false,
    }
}

/// Lucene syntax for criteria simple enough to live in a `q` parameter.
///
/// A term qualifies only when its field and value are plain words; anything
/// the query parser would split or interpret (whitespace, operators, quotes,
/// wildcards) stays in the body as an exact `term` filter.
pub(crate) fn query_string_expression(criteria: &Criteria) -> Option<String> {
    match criteria {
        Criteria::QueryString(query) => Some(query.value().to_string()),
        Criteria::Term(term) => {
            let value = plain_value(term.single_value()?)?;
            if !is_plain_word(term.field()) || !is_plain_word(&value) {
                return None;
            }
            Some(format!("{}:{}", term.field(), value))
        }
        _ => None,
    }
}

fn plain_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Letters, digits, `_`, `.` and `@`; nothing the query parser treats specially.
fn is_plain_word(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@'))
}

/// Render a timeout with the coarsest exact unit: milliseconds when there is
/// a millisecond component, else seconds when there is a second component,
/// else minutes. Sub-millisecond remainders round up, so a nonzero timeout
/// never renders as zero.
pub fn format_timeout(timeout: Duration) -> String {
    let timeout = if timeout.subsec_nanos() % 1_000_000 != 0 {
        Duration::from_millis(timeout.as_millis() as u64 + 1)
    } else {
        timeout
    };

    if timeout.subsec_millis() != 0 {
        return timeout.as_millis().to_string();
    }

    let seconds = timeout.as_secs();
    if seconds % 60 != 0 {
        return format!("{}s", seconds);
    }

    format!("{}m", seconds / 60)
}

/// Base search URI: endpoint, optional index and document type, `_search`,
/// then the `&`-joined parameters. Parameters with an empty value render as
/// a bare key.
pub(crate) fn search_uri(
    connection: &Connection,
    request: &SearchRequest,
    parameters: &[(&str, String)],
) -> String {
    let mut uri = connection.endpoint().to_string();

    if let Some(index) = connection.index() {
        uri.push_str(&urlencoding::encode(index));
        uri.push('/');
    }

    if let Some(document_type) = request.document_type() {
        uri.push_str(&urlencoding::encode(document_type));
        uri.push('/');
    }

    uri.push_str(SEARCH_SEGMENT);

    if !parameters.is_empty() {
        let query: Vec<String> = parameters
            .iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    key.to_string()
                } else {
                    format!("{}={}", key, value)
                }
            })
            .collect();
        uri.push('?');
        uri.push_str(&query.join("&"));
    }

    uri
}

/// Parameters both formatters append to the URI.
pub(crate) fn common_parameters(request: &SearchRequest) -> Vec<(&'static str, String)> {
    request
        .search_type()
        .map(|search_type| ("search_type", urlencoding::encode(search_type).into_owned()))
        .into_iter()
        .collect()
}
