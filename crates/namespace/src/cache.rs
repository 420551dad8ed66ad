//! Process-wide caches shared by every request.
//!
//! Both caches are append-only for the lifetime of the process: entries are
//! added or overwritten, never removed. A series or chapter renamed or
//! deleted on the remote therefore leaves a stale entry behind; lookups of
//! the old name keep resolving to the old identifier.
//!
//! Neither cache is global. A [`Context`](crate::Context) owns them and every
//! node it creates shares them, so tests get fresh caches per context.

use crate::resource::PageResource;
use mangadav_remote::models::{ChapterId, SeriesId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Cache key for a series: its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey(pub String);

/// Cache key for a chapter: the owning series' name and the chapter's name.
///
/// Kept as two fields rather than a concatenated string so that
/// `("ab", "c")` and `("a", "bc")` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterKey {
    pub series: String,
    pub chapter: String,
}
impl ChapterKey {
    pub fn new(series: impl Into<String>, chapter: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            chapter: chapter.into(),
        }
    }
}

/// Human-readable name to remote identifier, for series and chapters.
///
/// Writers insert a whole listing under one write lock, so a concurrent
/// reader sees either the previous listing's entries or the new one's, never
/// half of a batch. Concurrent writers of the same name converge on
/// last-writer-wins, which is safe because the remote assigns stable ids to
/// stable names.
#[derive(Debug, Default)]
pub struct IdentifierCache {
    series: RwLock<HashMap<SeriesKey, SeriesId>>,
    chapters: RwLock<HashMap<ChapterKey, ChapterId>>,
}
impl IdentifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn series_id(&self, name: &str) -> Option<SeriesId> {
        let id = self.series.read().await.get(&SeriesKey(name.to_string())).copied();
        tracing::trace!(series = name, hit = id.is_some(), "Series identifier lookup");
        id
    }

    pub async fn chapter_id(&self, series: &str, chapter: &str) -> Option<ChapterId> {
        let id = self.chapters.read().await.get(&ChapterKey::new(series, chapter)).copied();
        tracing::trace!(series, chapter, hit = id.is_some(), "Chapter identifier lookup");
        id
    }

    /// Record (or refresh) a batch of series identifiers.
    pub async fn record_series(&self, entries: impl IntoIterator<Item = (String, SeriesId)>) {
        let mut guard = self.series.write().await;
        for (name, id) in entries {
            if let Some(previous) = guard.insert(SeriesKey(name.clone()), id)
                && previous != id
            {
                tracing::warn!(series = name, %previous, current = %id, "Series identifier changed");
            }
        }
    }

    /// Record (or refresh) a batch of chapter identifiers for one series.
    pub async fn record_chapters(&self, series: &str, entries: impl IntoIterator<Item = (String, ChapterId)>) {
        let mut guard = self.chapters.write().await;
        for (chapter, id) in entries {
            if let Some(previous) = guard.insert(ChapterKey::new(series, chapter.clone()), id)
                && previous != id
            {
                tracing::warn!(series, chapter, %previous, current = %id, "Chapter identifier changed");
            }
        }
    }

    pub async fn series_len(&self) -> usize {
        self.series.read().await.len()
    }

    pub async fn chapters_len(&self) -> usize {
        self.chapters.read().await.len()
    }
}

/// Resolved page URL to a materialised [`PageResource`].
///
/// Best-effort deduplication, not single-flight: two first-time requests for
/// the same page may both download it, and whichever inserts last is the one
/// reused afterwards. Only resources that already hold their bytes are
/// inserted, so anything read back from here never triggers a download.
#[derive(Debug, Default)]
pub struct ContentCache {
    resources: RwLock<HashMap<String, PageResource>>,
}
impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, url: &str) -> Option<PageResource> {
        let found = self.resources.read().await.get(url).cloned();
        tracing::trace!(url, hit = found.is_some(), "Content cache lookup");
        found
    }

    pub async fn insert(&self, url: impl Into<String>, resource: PageResource) {
        self.resources.write().await.insert(url.into(), resource);
    }

    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_series_roundtrip_and_overwrite() {
        let cache = IdentifierCache::new();
        assert_eq!(cache.series_id("Alpha").await, None);
        cache.record_series([("Alpha".to_string(), SeriesId(1))]).await;
        assert_eq!(cache.series_id("Alpha").await, Some(SeriesId(1)));
        cache.record_series([("Alpha".to_string(), SeriesId(2))]).await;
        assert_eq!(cache.series_id("Alpha").await, Some(SeriesId(2)));
        assert_eq!(cache.series_len().await, 1);
    }

    #[tokio::test]
    async fn test_chapter_keys_do_not_collide() {
        let cache = IdentifierCache::new();
        cache.record_chapters("ab", [("c".to_string(), ChapterId(1))]).await;
        cache.record_chapters("a", [("bc".to_string(), ChapterId(2))]).await;
        assert_eq!(cache.chapter_id("ab", "c").await, Some(ChapterId(1)));
        assert_eq!(cache.chapter_id("a", "bc").await, Some(ChapterId(2)));
        assert_eq!(cache.chapters_len().await, 2);
    }

    #[tokio::test]
    async fn test_same_chapter_name_in_different_series() {
        let cache = IdentifierCache::new();
        cache.record_chapters("Alpha", [("Ch1".to_string(), ChapterId(10))]).await;
        cache.record_chapters("Beta", [("Ch1".to_string(), ChapterId(20))]).await;
        assert_eq!(cache.chapter_id("Alpha", "Ch1").await, Some(ChapterId(10)));
        assert_eq!(cache.chapter_id("Beta", "Ch1").await, Some(ChapterId(20)));
        assert_eq!(cache.chapter_id("Gamma", "Ch1").await, None);
    }

    #[tokio::test]
    async fn test_entries_are_never_removed() {
        let cache = IdentifierCache::new();
        cache.record_series([("Old".to_string(), SeriesId(1))]).await;
        // A later listing that no longer contains "Old" doesn't evict it.
        cache.record_series([("New".to_string(), SeriesId(1))]).await;
        assert_eq!(cache.series_id("Old").await, Some(SeriesId(1)));
        assert_eq!(cache.series_id("New").await, Some(SeriesId(1)));
    }
}
