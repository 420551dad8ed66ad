//! Remote catalog access for mangadav.
//!
//! The catalog is a GraphQL server exposing a library of series, their
//! chapters, and the page URLs of each chapter. This crate owns everything
//! that crosses the network:
//!
//! - [`transport`] — the [`QueryTransport`] and [`ContentTransport`] seams,
//!   with an HTTP implementation (and an in-memory one behind `mock`).
//! - [`Library`] — typed, pagination-aware catalog operations.

pub mod error;
mod library;
pub mod models;
pub mod queries;
pub mod transport;

pub use crate::library::{DEFAULT_PAGE_SIZE, Library};
pub use crate::transport::{ContentTransport, QueryTransport};
use std::sync::Arc;

pub type QueryHandle = Arc<dyn QueryTransport>;
pub type ContentHandle = Arc<dyn ContentTransport>;
