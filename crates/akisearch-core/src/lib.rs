//! Core domain types for AkiSearch: criteria, facets, requests and configuration.

pub mod config;
pub mod connection;
pub mod criteria;
pub mod error;
pub mod facet;
pub mod request;

pub use config::{AkisearchConfig, ConnectionConfig, RetryConfig};
pub use connection::Connection;
pub use criteria::{
    CompoundCriteria, Criteria, CriteriaKind, FieldCriteria, NotCriteria, PatternCriteria,
    QueryStringCriteria, RangeComparator, RangeCriteria, RangeSpecification, TermCriteria,
};
pub use error::{SearchError, SearchResult};
pub use facet::{Facet, FacetKind};
pub use request::{SearchRequest, SearchRequestBuilder, SortOption};
