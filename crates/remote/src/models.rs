//! Catalog models.
//!
//! These mirror the subset of the remote GraphQL schema that the namespace
//! needs: enough to name things and to find their identifiers again.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Remote identifier of a series (a "manga" in the remote schema).
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub i64);

/// Remote identifier of a chapter.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(pub i64);

/// A series in the remote library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    /// Display name, used verbatim as a directory name.
    pub title: String,
}

/// A chapter belonging to a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub name: String,
    #[serde(rename = "mangaId")]
    pub series_id: SeriesId,
    #[serde(default)]
    pub source_order: i64,
    /// Zero until the remote has fetched the chapter's page list at least once.
    #[serde(default)]
    pub page_count: u32,
}

/// Cursor pagination block shared by every connection type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One page of a paginated connection (`nodes` + `pageInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfo,
}
