//! In-memory catalog for testing.

use super::{ContentTransport, QueryTransport};
use crate::error::{ErrorKind, Result};
use crate::queries::operation_name;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A series in the mock library.
#[derive(Debug, Clone)]
pub struct MockSeries {
    id: i64,
    title: String,
    chapters: Vec<MockChapter>,
}
impl MockSeries {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            chapters: Vec::new(),
        }
    }

    /// Append a chapter with `pages` pages. Chapters are served in the order
    /// they are added (already "sorted" by source order, descending).
    pub fn chapter(mut self, id: i64, name: impl Into<String>, pages: usize) -> Self {
        self.chapters.push(MockChapter {
            id,
            name: name.into(),
            pages,
        });
        self
    }
}

/// A chapter in the mock library.
#[derive(Debug, Clone)]
pub struct MockChapter {
    id: i64,
    name: String,
    pages: usize,
}

/// In-memory catalog implementing both [`QueryTransport`] and
/// [`ContentTransport`].
///
/// Page URLs follow the remote server's relative form
/// (`/api/v1/manga/{series}/chapter/{chapter}/page/{index}`) and every page's
/// content is the ASCII string `"{chapter}:{index}"`, so tests can tell
/// exactly which page was downloaded. Every query and fetch is counted, which
/// lets tests assert that no network activity happened.
#[derive(Debug, Default)]
pub struct MockRemote {
    library: RwLock<Vec<MockSeries>>,
    offline: AtomicBool,
    queries: std::sync::Mutex<HashMap<String, usize>>,
    fetches: AtomicUsize,
}

impl MockRemote {
    /// Create a mock catalog pre-populated with series.
    pub fn with_series(series: impl IntoIterator<Item = MockSeries>) -> Self {
        Self {
            library: RwLock::new(series.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Relative URL of a page, as the page-list mutation reports it.
    pub fn page_url(series: i64, chapter: i64, index: usize) -> String {
        format!("/api/v1/manga/{series}/chapter/{chapter}/page/{index}")
    }

    /// Content served for a page.
    pub fn page_content(chapter: i64, index: usize) -> Bytes {
        Bytes::from(format!("{chapter}:{index}"))
    }

    /// Simulate the server going away (every call fails with
    /// [`Network`](ErrorKind::Network)) or coming back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Rename a series in place (its identifier is unchanged).
    pub async fn rename_series(&self, id: i64, title: impl Into<String>) {
        if let Some(series) = self.library.write().await.iter_mut().find(|s| s.id == id) {
            series.title = title.into();
        }
    }

    /// Change how many pages a chapter has.
    pub async fn set_page_count(&self, chapter: i64, pages: usize) {
        let mut library = self.library.write().await;
        if let Some(found) = library.iter_mut().flat_map(|s| s.chapters.iter_mut()).find(|c| c.id == chapter) {
            found.pages = pages;
        }
    }

    /// Number of queries executed for an operation (e.g. `"GET_CHAPTERS"`).
    pub fn query_count(&self, operation: &str) -> usize {
        self.lock_queries().get(operation).copied().unwrap_or(0)
    }

    /// Number of queries executed, across all operations.
    pub fn total_query_count(&self) -> usize {
        self.lock_queries().values().sum()
    }

    /// Number of content fetches attempted.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Total network activity: queries plus content fetches.
    pub fn request_count(&self) -> usize {
        self.total_query_count() + self.fetch_count()
    }

    fn lock_queries(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        // A panicking test thread poisons the lock; the counts are still usable.
        self.queries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Network);
        }
        Ok(())
    }

    /// Slice `nodes` according to `first`/`after` variables, building the
    /// matching `pageInfo`. Cursors are stringified offsets.
    fn paginate(nodes: Vec<Value>, variables: &Value) -> Value {
        let offset = variables
            .get("after")
            .and_then(Value::as_str)
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0)
            .min(nodes.len());
        let first = variables
            .get("first")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(nodes.len());
        let end = offset.saturating_add(first).min(nodes.len());
        let has_next_page = end < nodes.len();
        let page = nodes[offset..end].to_vec();
        json!({
            "nodes": page,
            "pageInfo": {
                "hasNextPage": has_next_page,
                "endCursor": (end > offset).then(|| end.to_string()),
            },
        })
    }

    async fn library(&self, variables: &Value) -> Result<Value> {
        let library = self.library.read().await;
        let nodes = library.iter().map(|s| json!({ "id": s.id, "title": s.title })).collect();
        Ok(json!({ "mangas": Self::paginate(nodes, variables) }))
    }

    async fn chapters(&self, variables: &Value) -> Result<Value> {
        let Some(series_id) = variables.get("mangaId").and_then(Value::as_i64) else {
            exn::bail!(ErrorKind::Query("mangaId is required".to_string()));
        };
        let library = self.library.read().await;
        let chapters = library.iter().find(|s| s.id == series_id).map(|s| s.chapters.as_slice()).unwrap_or_default();
        let total = chapters.len();
        let nodes = chapters
            .iter()
            .enumerate()
            .map(|(i, c)| {
                json!({
                    "id": c.id,
                    "name": c.name,
                    "mangaId": series_id,
                    "sourceOrder": total - i,
                    "pageCount": c.pages,
                })
            })
            .collect();
        Ok(json!({ "chapters": Self::paginate(nodes, variables) }))
    }

    async fn pages(&self, variables: &Value) -> Result<Value> {
        let Some(chapter_id) = variables.pointer("/input/chapterId").and_then(Value::as_i64) else {
            exn::bail!(ErrorKind::Query("input.chapterId is required".to_string()));
        };
        let library = self.library.read().await;
        let found = library.iter().find_map(|s| s.chapters.iter().find(|c| c.id == chapter_id).map(|c| (s.id, c)));
        let Some((series_id, chapter)) = found else {
            exn::bail!(ErrorKind::Query(format!("chapter {chapter_id} not found")));
        };
        let pages: Vec<_> = (0..chapter.pages).map(|i| Self::page_url(series_id, chapter_id, i)).collect();
        Ok(json!({
            "fetchChapterPages": {
                "chapter": { "id": chapter_id, "pageCount": chapter.pages },
                "pages": pages,
            }
        }))
    }

    /// Parse a page URL back into `(series, chapter, index)`.
    fn parse_page_url(url: &str) -> Option<(i64, i64, usize)> {
        let rest = url.trim_start_matches('/').strip_prefix("api/v1/manga/")?;
        let mut parts = rest.split('/');
        let series = parts.next()?.parse().ok()?;
        let chapter = match (parts.next()?, parts.next()?) {
            ("chapter", id) => id.parse().ok()?,
            _ => return None,
        };
        let index = match (parts.next()?, parts.next()?) {
            ("page", index) => index.parse().ok()?,
            _ => return None,
        };
        parts.next().is_none().then_some((series, chapter, index))
    }
}

#[async_trait]
impl QueryTransport for MockRemote {
    async fn execute(&self, document: &str, variables: Value) -> Result<Value> {
        let operation = operation_name(document).unwrap_or("anonymous").to_string();
        *self.lock_queries().entry(operation.clone()).or_default() += 1;
        self.check_online()?;
        match operation.as_str() {
            "GET_LIBRARY" => self.library(&variables).await,
            "GET_CHAPTERS" => self.chapters(&variables).await,
            "FETCH_CHAPTER_PAGES" => self.pages(&variables).await,
            other => exn::bail!(ErrorKind::Query(format!("unknown operation {other}"))),
        }
    }
}

#[async_trait]
impl ContentTransport for MockRemote {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let Some((series_id, chapter_id, index)) = Self::parse_page_url(url) else {
            exn::bail!(ErrorKind::Status(404));
        };
        let library = self.library.read().await;
        let exists = library
            .iter()
            .filter(|s| s.id == series_id)
            .flat_map(|s| s.chapters.iter())
            .any(|c| c.id == chapter_id && index < c.pages);
        match exists {
            true => Ok(Self::page_content(chapter_id, index)),
            false => exn::bail!(ErrorKind::Status(404)),
        }
    }
}
