//! Remote Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Transport failures and well-formed error responses from the catalog are
//! kept as separate variants so callers can tell "the server is down" apart
//! from "the server said no".

use derive_more::{Display, Error};

/// A remote error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP client could not be set up (TLS backend, invalid settings).
    #[display("failed to build HTTP client")]
    Client,
    /// The request never produced a response (connection refused, timeout,
    /// body could not be read).
    #[display("network error")]
    Network,
    /// The server answered with a non-success HTTP status.
    #[display("unexpected HTTP status: {_0}")]
    Status(#[error(not(source))] u16),
    /// The query was delivered and the catalog answered with GraphQL errors.
    #[display("query rejected: {_0}")]
    Query(#[error(not(source))] String),
    /// The response body did not have the expected shape.
    #[display("invalid response: {_0}")]
    InvalidResponse(#[error(not(source))] String),
    /// A page URL could not be turned into an absolute URL.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            Self::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}
