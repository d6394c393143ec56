use akisearch_core::{Connection, SearchError, SearchRequest, SearchResult};

use super::{
    common_parameters, format_timeout, is_query_string_capable, query_string_expression,
    search_uri, HttpMethod, RequestFormatter,
};

/// Renders a search entirely into URI parameters for a `GET` request.
///
/// Parameters appear in a fixed order: `q`, `fields`, one `sort` per sort
/// option (last declared first), `from`, `size`, `timeout`, `search_type`.
#[derive(Debug)]
pub struct QueryStringFormatter<'a> {
    connection: &'a Connection,
    request: &'a SearchRequest,
}

impl<'a> QueryStringFormatter<'a> {
    /// Fails when the request needs a structured body.
    pub fn new(connection: &'a Connection, request: &'a SearchRequest) -> SearchResult<Self> {
        if !is_query_string_capable(request) {
            return Err(SearchError::invalid_operation(
                "request cannot be expressed as a query string",
            ));
        }

        Ok(Self {
            connection,
            request,
        })
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        let request = self.request;
        let mut parameters = Vec::new();

        if let Some(expression) = request
            .filter()
            .or(request.query())
            .and_then(query_string_expression)
        {
            parameters.push(("q", urlencoding::encode(&expression).into_owned()));
        }

        if !request.fields().is_empty() {
            let fields: Vec<_> = request
                .fields()
                .iter()
                .map(|field| urlencoding::encode(field))
                .collect();
            parameters.push(("fields", fields.join(",")));
        }

        for sort in request.sort_options().iter().rev() {
            let name = urlencoding::encode(sort.name());
            let value = if sort.is_ascending() {
                name.into_owned()
            } else {
                format!("{}:desc", name)
            };
            parameters.push(("sort", value));
        }

        if request.skip() > 0 {
            parameters.push(("from", request.skip().to_string()));
        }

        if let Some(take) = request.take() {
            parameters.push(("size", take.to_string()));
        }

        parameters.push(("timeout", format_timeout(self.connection.timeout())));

        parameters.extend(common_parameters(request));

        parameters
    }
}

impl RequestFormatter for QueryStringFormatter<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn uri(&self) -> String {
        search_uri(self.connection, self.request, &self.parameters())
    }

    fn body(&self) -> SearchResult<Option<String>> {
        Ok(None)
    }
}
