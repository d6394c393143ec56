use serde_json::{Map, Value};

use akisearch_core::{Connection, SearchRequest, SearchResult};

use super::{common_parameters, format_timeout, search_uri, HttpMethod, RequestFormatter};
use crate::json;

/// Renders a search as a JSON body for a `POST` request.
#[derive(Debug)]
pub struct BodyFormatter<'a> {
    connection: &'a Connection,
    request: &'a SearchRequest,
}

impl<'a> BodyFormatter<'a> {
    pub fn new(connection: &'a Connection, request: &'a SearchRequest) -> Self {
        Self {
            connection,
            request,
        }
    }

    /// Structured request document.
    ///
    /// Keys are only present when they carry information: `fields`, `query`,
    /// `filter`, `sort`, `facets`, `from` (when skipping), `size` (when
    /// limited) and `timeout` (when the connection has one).
    pub fn document(&self) -> Value {
        let request = self.request;
        let mut root = Map::new();

        if !request.fields().is_empty() {
            root.insert(
                "fields".to_string(),
                Value::Array(request.fields().iter().cloned().map(Value::from).collect()),
            );
        }

        if let Some(query) = request.query() {
            root.insert("query".to_string(), json::criteria(query));
        }

        if let Some(filter) = request.filter() {
            root.insert("filter".to_string(), json::criteria(filter));
        }

        if !request.sort_options().is_empty() {
            root.insert(
                "sort".to_string(),
                Value::Array(request.sort_options().iter().map(json::sort_option).collect()),
            );
        }

        if !request.facets().is_empty() {
            let facets: Map<String, Value> = request
                .facets()
                .iter()
                .map(|facet| (facet.name().to_string(), json::facet(facet)))
                .collect();
            root.insert("facets".to_string(), Value::Object(facets));
        }

        if request.skip() > 0 {
            root.insert("from".to_string(), Value::from(request.skip()));
        }

        if let Some(take) = request.take() {
            root.insert("size".to_string(), Value::from(take));
        }

        let timeout = self.connection.timeout();
        if !timeout.is_zero() {
            root.insert("timeout".to_string(), Value::from(format_timeout(timeout)));
        }

        Value::Object(root)
    }
}

impl RequestFormatter for BodyFormatter<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn uri(&self) -> String {
        search_uri(self.connection, self.request, &common_parameters(self.request))
    }

    fn body(&self) -> SearchResult<Option<String>> {
        Ok(Some(serde_json::to_string(&self.document())?))
    }
}
