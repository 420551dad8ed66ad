use super::{Collection, PageCatalog};
use crate::error::{ErrorKind, Result};
use crate::path::SEPARATOR;
use crate::{Context, Materialization, Node};
use async_trait::async_trait;
use exn::ResultExt;
use mangadav_remote::models::SeriesId;
use tokio::sync::RwLock;
use tracing::instrument;

/// The chapters of one series.
///
/// Listed names carry the owning series as a prefix (`Alpha/Ch1`);
/// [`child`](Collection::child) accepts both the prefixed and the bare name.
pub struct ChapterCatalog {
    ctx: Context,
    series: String,
    series_id: SeriesId,
    mode: Materialization,
    names: RwLock<Option<Vec<String>>>,
}
impl ChapterCatalog {
    pub fn new(ctx: Context, series: impl Into<String>, series_id: SeriesId, mode: Materialization) -> Self {
        Self {
            ctx,
            series: series.into(),
            series_id,
            mode,
            names: RwLock::new(None),
        }
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn series_id(&self) -> SeriesId {
        self.series_id
    }

    pub fn mode(&self) -> Materialization {
        self.mode
    }

    /// Query the series' chapters and record every chapter identifier under
    /// `(series name, chapter name)`.
    #[instrument(skip(self), fields(series = %self.series))]
    pub async fn load(&self) -> Result<()> {
        let chapters =
            self.ctx.library().chapters(self.series_id).await.or_raise(|| ErrorKind::RemoteUnavailable)?;
        self.ctx.ids().record_chapters(&self.series, chapters.iter().map(|c| (c.name.clone(), c.id))).await;
        // Remote order (source order, descending) is kept as is.
        let names: Vec<_> = chapters.into_iter().map(|c| c.name).collect();
        tracing::debug!(chapters = names.len(), "Loaded chapter catalog");
        *self.names.write().await = Some(names);
        Ok(())
    }

    pub async fn is_loaded(&self) -> bool {
        self.names.read().await.is_some()
    }

    /// Bare chapter names known without any remote call (empty until loaded).
    pub async fn known_children(&self) -> Vec<String> {
        self.names.read().await.clone().unwrap_or_default()
    }

    fn display_name(&self, chapter: &str) -> String {
        format!("{}{SEPARATOR}{chapter}", self.series)
    }

    /// Strip the `<series>/` prefix a listing added, if present.
    fn bare_name<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.series.as_str()).and_then(|rest| rest.strip_prefix(SEPARATOR)).unwrap_or(name)
    }
}

#[async_trait]
impl Collection for ChapterCatalog {
    async fn list_children(&self) -> Result<Vec<String>> {
        if !self.is_loaded().await {
            self.load().await?;
        }
        Ok(self.known_children().await.iter().map(|chapter| self.display_name(chapter)).collect())
    }

    /// Never touches the remote: an identifier that no listing has recorded
    /// yet is simply not found.
    async fn child(&self, name: &str) -> Result<Option<Node>> {
        let chapter = self.bare_name(name);
        let Some(id) = self.ctx.ids().chapter_id(&self.series, chapter).await else {
            tracing::debug!(series = %self.series, chapter, "Chapter not in identifier cache");
            return Ok(None);
        };
        let catalog = PageCatalog::new(self.ctx.clone(), &self.series, chapter, id, Materialization::Lazy);
        Ok(Some(Node::Pages(catalog)))
    }
}
