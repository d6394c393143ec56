//! Wire model of a search response.
//!
//! Missing `hits` or `hits.hits` (or an explicit `null`) parse as zero hits.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use akisearch_core::{SearchError, SearchResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Server-side execution time in milliseconds.
    #[serde(default)]
    pub took: u64,

    #[serde(default)]
    pub timed_out: bool,

    #[serde(rename = "_shards", default)]
    pub shards: ShardStatistics,

    #[serde(default, deserialize_with = "null_as_default")]
    pub hits: Hits,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardStatistics {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub failed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    /// Total number of matching documents, independent of paging.
    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub max_score: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index")]
    pub index: String,

    #[serde(rename = "_type", default)]
    pub document_type: Option<String>,

    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_score", default)]
    pub score: Option<f64>,

    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
}

impl SearchResponse {
    pub fn parse(body: &str) -> SearchResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Hits on this page, in server order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits.hits
    }

    /// Total number of matching documents.
    pub fn total(&self) -> u64 {
        self.hits.total
    }
}

impl Hit {
    /// Project the hit into `T`.
    ///
    /// Uses `_source` when present, otherwise the requested `fields`.
    pub fn document<T: DeserializeOwned>(&self) -> SearchResult<T> {
        let value = match (&self.source, &self.fields) {
            (Some(source), _) => source.clone(),
            (None, Some(fields)) => Value::Object(fields.clone()),
            (None, None) => {
                return Err(SearchError::Deserialization(format!(
                    "hit '{}' carries neither _source nor fields",
                    self.id
                )))
            }
        };

        Ok(serde_json::from_value(value)?)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
