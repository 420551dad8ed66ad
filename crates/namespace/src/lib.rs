//! A read-only hierarchical namespace over a remote manga catalog.
//!
//! Paths have at most three segments:
//!
//! ```text
//! /                         every series in the library
//! /<series>                 the chapters of a series
//! /<series>/<chapter>       the pages of a chapter
//! /<series>/<chapter>/page_<n>.<ext>
//! ```
//!
//! The [`Resolver`] turns a path into a [`Node`]. Catalog nodes list and look
//! up their children through the [`Collection`] trait; page nodes
//! ([`PageResource`](resource::PageResource)) download their bytes the first
//! time anyone asks for them. Series and chapter names become remote
//! identifiers only through listings, so a client has to walk the tree from
//! the root, like a file manager does.

pub mod cache;
pub mod catalog;
mod context;
pub mod error;
mod mode;
mod node;
pub mod path;
mod resolver;
pub mod resource;

pub use crate::catalog::Collection;
pub use crate::context::{Context, DEFAULT_CONTENT_TYPE, DEFAULT_EXTENSION, Layout};
pub use crate::mode::Materialization;
pub use crate::node::{Node, NodeKind};
pub use crate::resolver::Resolver;
