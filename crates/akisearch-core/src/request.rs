use std::collections::HashSet;

use crate::criteria::Criteria;
use crate::error::{require_non_blank, SearchError, SearchResult};
use crate::facet::Facet;

/// Sort key of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    name: String,
    ascending: bool,
    ignore_unmapped: bool,
}

impl SortOption {
    pub fn new(name: impl Into<String>, ascending: bool) -> SearchResult<Self> {
        let name = name.into();
        require_non_blank("name", &name)?;
        Ok(Self {
            name,
            ascending,
            ignore_unmapped: false,
        })
    }

    pub fn ascending(name: impl Into<String>) -> SearchResult<Self> {
        Self::new(name, true)
    }

    pub fn descending(name: impl Into<String>) -> SearchResult<Self> {
        Self::new(name, false)
    }

    /// Tolerate indexes where the sort field has no mapping.
    #[must_use]
    pub fn ignoring_unmapped(mut self) -> Self {
        self.ignore_unmapped = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn ignore_unmapped(&self) -> bool {
        self.ignore_unmapped
    }
}

/// A compiled-ready search: what to match, how to page, sort and project.
///
/// Immutable once built; see [`SearchRequest::builder`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    document_type: Option<String>,
    skip: u64,
    take: Option<u64>,
    fields: Vec<String>,
    sort_options: Vec<SortOption>,
    filter: Option<Criteria>,
    query: Option<Criteria>,
    facets: Vec<Facet>,
    search_type: Option<String>,
}

impl SearchRequest {
    pub fn builder() -> SearchRequestBuilder {
        SearchRequestBuilder::default()
    }

    pub fn document_type(&self) -> Option<&str> {
        self.document_type.as_deref()
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn take(&self) -> Option<u64> {
        self.take
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn sort_options(&self) -> &[SortOption] {
        &self.sort_options
    }

    pub fn filter(&self) -> Option<&Criteria> {
        self.filter.as_ref()
    }

    pub fn query(&self) -> Option<&Criteria> {
        self.query.as_ref()
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn search_type(&self) -> Option<&str> {
        self.search_type.as_deref()
    }
}

/// Builder validating [`SearchRequest`] invariants on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    pub fn document_type(mut self, document_type: impl Into<String>) -> Self {
        self.request.document_type = Some(document_type.into());
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.request.skip = skip;
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.request.take = Some(take);
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.request.fields.push(field.into());
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn sort(mut self, sort: SortOption) -> Self {
        self.request.sort_options.push(sort);
        self
    }

    pub fn filter(mut self, filter: Criteria) -> Self {
        self.request.filter = Some(filter);
        self
    }

    pub fn query(mut self, query: Criteria) -> Self {
        self.request.query = Some(query);
        self
    }

    pub fn facet(mut self, facet: Facet) -> Self {
        self.request.facets.push(facet);
        self
    }

    pub fn search_type(mut self, search_type: impl Into<String>) -> Self {
        self.request.search_type = Some(search_type.into());
        self
    }

    pub fn build(self) -> SearchResult<SearchRequest> {
        let request = self.request;

        if let Some(document_type) = &request.document_type {
            require_non_blank("document_type", document_type)?;
        }

        if request.take == Some(0) {
            return Err(SearchError::invalid_argument(
                "take",
                "must be greater than 0 when set",
            ));
        }

        for field in &request.fields {
            require_non_blank("fields", field)?;
        }

        if let Some(search_type) = &request.search_type {
            require_non_blank("search_type", search_type)?;
        }

        // Facets are keyed by name on the wire.
        let mut names = HashSet::with_capacity(request.facets.len());
        for facet in &request.facets {
            if !names.insert(facet.name()) {
                return Err(SearchError::invalid_argument(
                    "facets",
                    format!("duplicate facet name '{}'", facet.name()),
                ));
            }
        }

        Ok(request)
    }
}
