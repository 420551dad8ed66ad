//! Transport traits and implementations.
//!
//! Two collaborators are consumed by the namespace: a [`QueryTransport`] that
//! executes GraphQL documents, and a [`ContentTransport`] that downloads raw
//! page bytes. [`HttpTransport`] implements both against a live server;
//! [`MockRemote`] (behind the `mock` feature) implements both in memory.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::http::HttpTransport;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{MockChapter, MockRemote, MockSeries};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

/// Executes structured queries against the remote catalog.
///
/// Implementations must keep transport failures
/// ([`Network`](ErrorKind::Network), [`Status`](ErrorKind::Status)) apart
/// from well-formed error responses ([`Query`](ErrorKind::Query)).
///
/// # Examples
///
/// ```no_run
/// use mangadav_remote::{error::Result, queries, transport::QueryTransport};
///
/// async fn library(transport: &dyn QueryTransport) -> Result<serde_json::Value> {
///     transport.execute(queries::GET_LIBRARY, serde_json::json!({ "first": 50 })).await
/// }
/// ```
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Send `document` with `variables` and return the response's `data`
    /// member.
    async fn execute(&self, document: &str, variables: Value) -> Result<Value>;
}

/// Downloads raw page content.
#[async_trait]
pub trait ContentTransport: Send + Sync {
    /// Fetch the bytes behind `url`.
    ///
    /// Relative URLs (as returned by the page-list mutation) are resolved
    /// against the transport's content base URL.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

#[derive(Deserialize)]
struct Envelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

/// Unwrap a GraphQL response envelope into its `data` member.
///
/// A non-empty `errors` array wins over any partial `data`.
pub(crate) fn decode_envelope(body: Value) -> Result<Value> {
    let envelope: Envelope = match serde_json::from_value(body) {
        Ok(envelope) => envelope,
        Err(e) => exn::bail!(ErrorKind::InvalidResponse(e.to_string())),
    };
    if !envelope.errors.is_empty() {
        let messages: Vec<_> = envelope.errors.into_iter().map(|e| e.message).collect();
        exn::bail!(ErrorKind::Query(messages.join("; ")));
    }
    match envelope.data {
        Some(Value::Null) | None => exn::bail!(ErrorKind::InvalidResponse("missing data".to_string())),
        Some(data) => Ok(data),
    }
}
