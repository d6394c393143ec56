//! Criteria compilation: serializes search requests into query-string or
//! JSON-body wire requests.

pub mod formatter;
pub mod json;

pub use formatter::{
    create_formatter, format_timeout, is_query_string_capable, BodyFormatter, FormattedRequest,
    HttpMethod, QueryStringFormatter, RequestFormatter, SEARCH_SEGMENT,
};
