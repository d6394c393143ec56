//! Reduces a hit list to the shape the caller asked for.
//!
//! `first` and `single` follow the usual sequence-operator contracts. The
//! materializer never reorders: element 0 is whatever the server ranked first.

use serde::de::DeserializeOwned;

use akisearch_core::{SearchError, SearchResult};

use crate::response::SearchResponse;

const NO_ELEMENTS: &str = "sequence contains no elements";
const MORE_THAN_ONE_ELEMENT: &str = "sequence contains more than one element";

/// First element of `items`.
///
/// An empty list yields `T::default()` when `default_if_none` is set and
/// fails with [`SearchError::InvalidOperation`] otherwise.
pub fn first<T: Default>(items: Vec<T>, default_if_none: bool) -> SearchResult<T> {
    match items.into_iter().next() {
        Some(item) => Ok(item),
        None if default_if_none => Ok(T::default()),
        None => Err(SearchError::invalid_operation(NO_ELEMENTS)),
    }
}

/// The only element of `items`; more than one element is an error.
pub fn single<T: Default>(items: Vec<T>, default_if_none: bool) -> SearchResult<T> {
    if items.len() > 1 {
        return Err(SearchError::invalid_operation(MORE_THAN_ONE_ELEMENT));
    }
    first(items, default_if_none)
}

/// Requested result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Materialization {
    #[default]
    List,
    First {
        default_if_none: bool,
    },
    Single {
        default_if_none: bool,
    },
    /// Total number of matches reported by the server, not the page size.
    Count,
}

/// Result of [`materialize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized<T> {
    List(Vec<T>),
    One(T),
    Count(u64),
}

impl<T> Materialized<T> {
    pub fn into_list(self) -> Option<Vec<T>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_one(self) -> Option<T> {
        match self {
            Self::One(item) => Some(item),
            _ => None,
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Count(count) => Some(*count),
            _ => None,
        }
    }
}

/// Project `response` hits into `T` and reduce them per `materialization`.
pub fn materialize<T>(
    response: &SearchResponse,
    materialization: Materialization,
) -> SearchResult<Materialized<T>>
where
    T: DeserializeOwned + Default,
{
    let hits = response.hits();

    match materialization {
        Materialization::Count => Ok(Materialized::Count(response.total())),
        Materialization::List => Ok(Materialized::List(
            hits.iter()
                .map(|hit| hit.document())
                .collect::<SearchResult<Vec<T>>>()?,
        )),
        Materialization::First { default_if_none } => {
            // Only the leading hit is projected.
            let items = hits
                .first()
                .map(|hit| hit.document())
                .transpose()?
                .into_iter()
                .collect();
            Ok(Materialized::One(first(items, default_if_none)?))
        }
        Materialization::Single { default_if_none } => {
            if hits.len() > 1 {
                return Err(SearchError::invalid_operation(MORE_THAN_ONE_ELEMENT));
            }
            let items = hits
                .iter()
                .map(|hit| hit.document())
                .collect::<SearchResult<Vec<T>>>()?;
            Ok(Materialized::One(single(items, default_if_none)?))
        }
    }
}
