//! Aggregation descriptors requested alongside a search.
//!
//! Facets are independent of the request's criteria but may carry their own
//! sub-filter, which restricts the documents the statistics are computed over.

use crate::criteria::Criteria;
use crate::error::{require_non_blank, SearchError, SearchResult};

/// A named aggregation over the matched documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    name: String,
    filter: Option<Criteria>,
    kind: FacetKind,
}

/// Shape of the statistics a [`Facet`] computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetKind {
    /// Count of documents matching the filter.
    Filter,
    /// Count, min, max, mean and friends over numeric fields.
    Statistical { fields: Vec<String> },
    /// Most frequent terms across fields.
    Terms {
        fields: Vec<String>,
        size: Option<u32>,
    },
    /// Statistics of `value` grouped by the terms of `key`.
    TermsStats {
        key: String,
        value: String,
        size: Option<u32>,
    },
}

impl FacetKind {
    /// Wire name of the facet type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Statistical { .. } => "statistical",
            Self::Terms { .. } => "terms",
            Self::TermsStats { .. } => "terms_stats",
        }
    }
}

impl Facet {
    /// Document count for `filter` (all documents when absent).
    pub fn filter(name: impl Into<String>, filter: Option<Criteria>) -> SearchResult<Self> {
        Self::build(name, filter, FacetKind::Filter)
    }

    pub fn statistical<I, S>(
        name: impl Into<String>,
        filter: Option<Criteria>,
        fields: I,
    ) -> SearchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = collect_fields(fields)?;
        Self::build(name, filter, FacetKind::Statistical { fields })
    }

    pub fn terms<I, S>(
        name: impl Into<String>,
        filter: Option<Criteria>,
        size: Option<u32>,
        fields: I,
    ) -> SearchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        validate_size(size)?;
        let fields = collect_fields(fields)?;
        Self::build(name, filter, FacetKind::Terms { fields, size })
    }

    pub fn terms_stats(
        name: impl Into<String>,
        filter: Option<Criteria>,
        key: impl Into<String>,
        value: impl Into<String>,
        size: Option<u32>,
    ) -> SearchResult<Self> {
        let key = key.into();
        let value = value.into();
        require_non_blank("key", &key)?;
        require_non_blank("value", &value)?;
        validate_size(size)?;
        Self::build(name, filter, FacetKind::TermsStats { key, value, size })
    }

    fn build(
        name: impl Into<String>,
        filter: Option<Criteria>,
        kind: FacetKind,
    ) -> SearchResult<Self> {
        let name = name.into();
        require_non_blank("name", &name)?;
        Ok(Self { name, filter, kind })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter_criteria(&self) -> Option<&Criteria> {
        self.filter.as_ref()
    }

    pub fn kind(&self) -> &FacetKind {
        &self.kind
    }
}

fn collect_fields<I, S>(fields: I) -> SearchResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
    if fields.is_empty() {
        return Err(SearchError::invalid_argument(
            "fields",
            "at least one field is required",
        ));
    }
    for field in &fields {
        require_non_blank("fields", field)?;
    }
    Ok(fields)
}

fn validate_size(size: Option<u32>) -> SearchResult<()> {
    if size == Some(0) {
        return Err(SearchError::invalid_argument("size", "must be greater than 0"));
    }
    Ok(())
}
