//! Command-line flags shared by `compile` and `search`.

use std::path::PathBuf;

use clap::Args;

use akisearch_core::{AkisearchConfig, Criteria, SearchError, SearchRequest, SearchResult, SortOption};

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Single configuration file to use instead of the layered lookup
    /// (system, local and AKISEARCH_CONFIG files, then AKISEARCH__* variables)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Search endpoint, overriding the configured one
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Index to search, overriding the configured one
    #[arg(long)]
    pub index: Option<String>,

    /// Send GET requests with a query string when the request allows it
    #[arg(long)]
    pub prefer_get: bool,
}

impl ConnectionArgs {
    pub fn load(&self) -> SearchResult<AkisearchConfig> {
        let mut config = match &self.config {
            Some(path) => AkisearchConfig::from_file(path)?,
            None => AkisearchConfig::load()?,
        };

        if let Some(endpoint) = &self.endpoint {
            config.connection.endpoint = endpoint.clone();
        }
        if let Some(index) = &self.index {
            config.connection.index = Some(index.clone());
        }
        if self.prefer_get {
            config.connection.prefer_get_requests = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Document type to search
    #[arg(long = "type")]
    pub document_type: Option<String>,

    /// Term filter as FIELD=VALUE[,VALUE...]; repeat to match any of several
    #[arg(long = "term")]
    pub terms: Vec<String>,

    /// Raw query-string query, e.g. "name:Smith AND age:[18 TO 65]"
    #[arg(long)]
    pub query: Option<String>,

    /// Sort field; prefix with '-' for descending. Repeatable
    #[arg(long = "sort", allow_hyphen_values = true)]
    pub sorts: Vec<String>,

    /// Comma-separated fields to return instead of the whole document
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Number of hits to skip
    #[arg(long, default_value_t = 0)]
    pub skip: u64,

    /// Maximum number of hits to return
    #[arg(long)]
    pub take: Option<u64>,

    /// Search type, e.g. "count"
    #[arg(long)]
    pub search_type: Option<String>,
}

impl RequestArgs {
    pub fn to_request(&self) -> SearchResult<SearchRequest> {
        let mut builder = SearchRequest::builder()
            .skip(self.skip)
            .fields(self.fields.iter().cloned());

        if let Some(document_type) = &self.document_type {
            builder = builder.document_type(document_type.clone());
        }
        if let Some(take) = self.take {
            builder = builder.take(take);
        }
        if let Some(search_type) = &self.search_type {
            builder = builder.search_type(search_type.clone());
        }

        if !self.terms.is_empty() {
            let terms = self
                .terms
                .iter()
                .map(|term| parse_term(term))
                .collect::<SearchResult<Vec<_>>>()?;
            builder = builder.filter(Criteria::or(terms));
        }

        if let Some(query) = &self.query {
            builder = builder.query(Criteria::query_string(query.clone())?);
        }

        for sort in &self.sorts {
            builder = builder.sort(parse_sort(sort)?);
        }

        builder.build()
    }
}

/// Parse `FIELD=VALUE[,VALUE...]` into a term criterion.
pub fn parse_term(raw: &str) -> SearchResult<Criteria> {
    let (field, values) = raw.split_once('=').ok_or_else(|| {
        SearchError::invalid_argument("term", format!("expected FIELD=VALUE, got '{}'", raw))
    })?;

    let values: Vec<&str> = values.split(',').filter(|v| !v.is_empty()).collect();
    Criteria::terms(field.trim(), values)
}

/// Parse `field` (ascending) or `-field` (descending).
pub fn parse_sort(raw: &str) -> SearchResult<SortOption> {
    match raw.strip_prefix('-') {
        Some(name) => SortOption::descending(name),
        None => SortOption::ascending(raw),
    }
}
