//! Search execution: retry with exponential backoff, transports, response
//! parsing and materialization.

pub mod cancel;
pub mod client;
pub mod materializer;
pub mod response;
pub mod retry;
pub mod transport;

pub use cancel::CancellationToken;
pub use client::{retry_on_error, RetryPredicate, SearchClient};
pub use materializer::{first, materialize, single, Materialization, Materialized};
pub use response::{Hit, Hits, SearchResponse, ShardStatistics};
pub use retry::{Delay, RetryPolicy, TokioDelay};
pub use transport::{HttpTransport, MockReply, MockTransport, Transport, TransportResponse};
