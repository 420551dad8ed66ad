//! Typed access to the remote catalog.
//!
//! [`Library`] turns the three catalog operations into typed calls and hides
//! cursor pagination: listings keep requesting pages until the server reports
//! `hasNextPage: false`, preserving the server's order throughout.

use crate::QueryHandle;
use crate::error::{ErrorKind, Result};
use crate::models::{Chapter, ChapterId, Connection, Series, SeriesId};
use crate::queries;
use exn::{OptionExt, ResultExt};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::instrument;

/// Default number of nodes requested per page of a listing.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Typed catalog operations over a [`QueryTransport`](crate::transport::QueryTransport).
#[derive(Clone)]
pub struct Library {
    transport: QueryHandle,
    page_size: u32,
}
impl Library {
    pub fn new(transport: QueryHandle) -> Self {
        Self {
            transport,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Change the number of nodes requested per page. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Every series in the library, in the order the server returns them.
    #[instrument(skip(self))]
    pub async fn series(&self) -> Result<Vec<Series>> {
        self.collect(queries::GET_LIBRARY, "mangas", json!({})).await
    }

    /// Every chapter of a series, ordered by source order (descending) as
    /// requested from the server.
    #[instrument(skip(self))]
    pub async fn chapters(&self, series: SeriesId) -> Result<Vec<Chapter>> {
        self.collect(queries::GET_CHAPTERS, "chapters", json!({ "mangaId": series })).await
    }

    /// The ordered list of page URLs for a chapter.
    ///
    /// This asks the remote to (re-)fetch the chapter's pages, so the result
    /// reflects the current state of the source and is never cached here.
    #[instrument(skip(self))]
    pub async fn pages(&self, chapter: ChapterId) -> Result<Vec<String>> {
        let data = self
            .transport
            .execute(queries::FETCH_CHAPTER_PAGES, json!({ "input": { "chapterId": chapter } }))
            .await?;
        let pages = data
            .pointer("/fetchChapterPages/pages")
            .cloned()
            .ok_or_raise(|| ErrorKind::InvalidResponse("missing fetchChapterPages.pages".to_string()))?;
        let pages: Vec<String> = decode(pages, "fetchChapterPages.pages")?;
        tracing::debug!(pages = pages.len(), "Fetched chapter page list");
        Ok(pages)
    }

    /// Walk a paginated connection from the first page to the last.
    async fn collect<T: DeserializeOwned>(&self, document: &str, field: &str, base: Value) -> Result<Vec<T>> {
        let mut nodes = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut variables = base.clone();
            variables["first"] = json!(self.page_size);
            if let Some(after) = &cursor {
                variables["after"] = json!(after);
            }
            let mut data = self.transport.execute(document, variables).await?;
            let connection = data
                .get_mut(field)
                .map(Value::take)
                .ok_or_raise(|| ErrorKind::InvalidResponse(format!("missing {field}")))?;
            let connection: Connection<T> = decode(connection, field)?;
            nodes.extend(connection.nodes);
            if !connection.page_info.has_next_page {
                break;
            }
            match connection.page_info.end_cursor {
                // A cursor that doesn't move would loop forever.
                Some(next) if cursor.as_ref() != Some(&next) => cursor = Some(next),
                _ => exn::bail!(ErrorKind::InvalidResponse(format!("{field}: hasNextPage without a new endCursor"))),
            }
        }
        tracing::debug!(field, nodes = nodes.len(), "Collected paginated listing");
        Ok(nodes)
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).or_raise(|| ErrorKind::InvalidResponse(format!("malformed {what}")))
}
