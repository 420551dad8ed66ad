//! Namespace Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! A path that simply doesn't resolve is *not* an error: lookups return
//! `Ok(None)`. [`NotFound`](ErrorKind::NotFound) is reserved for a node that
//! was handed out and then turned out not to exist once its content was
//! requested (a page index past the end of a freshly fetched page list).

use derive_more::{Display, Error};

/// A namespace error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for namespace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The node does not exist (report "does not exist", not a fault).
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The query or content transport failed, or answered with something
    /// unusable. Nothing was cached; the same request may be retried.
    #[display("remote catalog unavailable")]
    RemoteUnavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable)
    }
}
