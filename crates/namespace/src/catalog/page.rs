use super::Collection;
use crate::error::{ErrorKind, Result};
use crate::path::PageName;
use crate::resource::PageResource;
use crate::{Context, Materialization, Node};
use async_trait::async_trait;
use exn::ResultExt;
use mangadav_remote::models::ChapterId;
use tokio::sync::RwLock;
use tracing::instrument;

/// The pages of one chapter, presented as `page_1.<ext>` … `page_<k>.<ext>`.
///
/// The page URL list is fetched fresh by every instance that loads and is
/// never shared between instances: pages can come and go on the remote, and
/// a stale list here would hand out the wrong image.
pub struct PageCatalog {
    ctx: Context,
    series: String,
    chapter: String,
    chapter_id: ChapterId,
    mode: Materialization,
    urls: RwLock<Option<Vec<String>>>,
}
impl PageCatalog {
    pub fn new(
        ctx: Context,
        series: impl Into<String>,
        chapter: impl Into<String>,
        chapter_id: ChapterId,
        mode: Materialization,
    ) -> Self {
        Self {
            ctx,
            series: series.into(),
            chapter: chapter.into(),
            chapter_id,
            mode,
            urls: RwLock::new(None),
        }
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    pub fn chapter_id(&self) -> ChapterId {
        self.chapter_id
    }

    pub fn mode(&self) -> Materialization {
        self.mode
    }

    /// Fetch the chapter's ordered page URL list.
    #[instrument(skip(self), fields(series = %self.series, chapter = %self.chapter))]
    pub async fn load(&self) -> Result<()> {
        let urls = self.ctx.library().pages(self.chapter_id).await.or_raise(|| ErrorKind::RemoteUnavailable)?;
        tracing::debug!(pages = urls.len(), "Loaded page catalog");
        *self.urls.write().await = Some(urls);
        Ok(())
    }

    pub async fn is_loaded(&self) -> bool {
        self.urls.read().await.is_some()
    }

    /// URL of the page at 0-based `index`, if loaded and in range.
    pub async fn url(&self, index: usize) -> Option<String> {
        self.urls.read().await.as_ref().and_then(|urls| urls.get(index).cloned())
    }

    fn file_names(&self, count: usize) -> Vec<String> {
        let extension = &self.ctx.layout().extension;
        (0..count).map(|index| PageName::new(index, extension.as_str()).to_string()).collect()
    }
}

#[async_trait]
impl Collection for PageCatalog {
    async fn list_children(&self) -> Result<Vec<String>> {
        if !self.is_loaded().await {
            self.load().await?;
        }
        let count = self.urls.read().await.as_ref().map(Vec::len).unwrap_or_default();
        Ok(self.file_names(count))
    }

    /// Resolve `page_<n>.<ext>` to the page at index `n - 1`.
    ///
    /// With the URL list loaded (always the case for an eager catalog) the
    /// index is bounds-checked and the resource is handed out with its URL
    /// known, reusing an already downloaded resource for the same URL. A lazy
    /// catalog that was never listed can't check bounds without a remote
    /// call, so it hands out a lazy resource that only ever produces
    /// placeholder content.
    async fn child(&self, name: &str) -> Result<Option<Node>> {
        let Ok(page) = name.parse::<PageName>() else {
            return Ok(None);
        };
        if page.extension() != self.ctx.layout().extension {
            return Ok(None);
        }
        if self.mode.is_eager() && !self.is_loaded().await {
            self.load().await?;
        }
        if !self.is_loaded().await {
            let resource = PageResource::new(&self.ctx, self.chapter_id, page, None, self.mode);
            return Ok(Some(Node::Page(resource)));
        }
        let Some(url) = self.url(page.index()).await else {
            tracing::debug!(chapter = %self.chapter, page = %page, "Page index out of range");
            return Ok(None);
        };
        if self.mode.is_eager()
            && let Some(cached) = self.ctx.resources().get(&url).await
        {
            tracing::debug!(url, "Reusing materialised page resource");
            return Ok(Some(Node::Page(cached)));
        }
        let resource = PageResource::new(&self.ctx, self.chapter_id, page, Some(url), self.mode);
        Ok(Some(Node::Page(resource)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::PLACEHOLDER;
    use crate::testing::fixture;
    use mangadav_remote::transport::MockRemote;

    fn catalog(ctx: &crate::Context, mode: Materialization) -> PageCatalog {
        PageCatalog::new(ctx.clone(), "Alpha", "Ch1", ChapterId(10), mode)
    }

    fn page(node: Option<Node>) -> PageResource {
        match node {
            Some(Node::Page(resource)) => resource,
            _ => panic!("expected a page resource"),
        }
    }

    #[tokio::test]
    async fn test_file_names_are_one_based() {
        let (_remote, ctx) = fixture();
        let names = catalog(&ctx, Materialization::Eager).list_children().await.unwrap();
        assert_eq!(names, ["page_1.jpg", "page_2.jpg", "page_3.jpg"]);
    }

    #[tokio::test]
    async fn test_child_maps_to_index_minus_one() {
        let (_remote, ctx) = fixture();
        let catalog = catalog(&ctx, Materialization::Eager);
        catalog.load().await.unwrap();
        let resource = page(catalog.child("page_3.jpg").await.unwrap());
        assert_eq!(resource.index(), 2);
        assert_eq!(resource.url().await.as_deref(), Some(MockRemote::page_url(1, 10, 2).as_str()));
    }

    #[tokio::test]
    async fn test_child_out_of_range() {
        let (_remote, ctx) = fixture();
        let catalog = catalog(&ctx, Materialization::Eager);
        assert!(catalog.child("page_4.jpg").await.unwrap().is_none());
        assert!(catalog.child("page_0.jpg").await.unwrap().is_none());
        assert!(catalog.child("page_1.png").await.unwrap().is_none());
        assert!(catalog.child("cover.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_every_instance_fetches_fresh() {
        let (remote, ctx) = fixture();
        assert_eq!(catalog(&ctx, Materialization::Eager).list_children().await.unwrap().len(), 3);
        remote.set_page_count(10, 5).await;
        assert_eq!(catalog(&ctx, Materialization::Eager).list_children().await.unwrap().len(), 5);
        assert_eq!(remote.query_count("FETCH_CHAPTER_PAGES"), 2);
    }

    #[tokio::test]
    async fn test_lazy_unlisted_child_is_offline_placeholder() {
        let (remote, ctx) = fixture();
        let catalog = catalog(&ctx, Materialization::Lazy);
        let resource = page(catalog.child("page_2.jpg").await.unwrap());
        assert_eq!(resource.mode(), Materialization::Lazy);
        assert_eq!(&resource.content().await.unwrap()[..], PLACEHOLDER);
        assert_eq!(remote.request_count(), 0);
    }

    #[tokio::test]
    async fn test_lazy_listed_child_is_bounds_checked() {
        let (remote, ctx) = fixture();
        let catalog = catalog(&ctx, Materialization::Lazy);
        catalog.list_children().await.unwrap();
        assert!(catalog.child("page_4.jpg").await.unwrap().is_none());
        let resource = page(catalog.child("page_1.jpg").await.unwrap());
        assert_eq!(resource.content_length().await.unwrap(), PLACEHOLDER.len() as u64);
        assert_eq!(remote.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_eager_child_reuses_materialised_resource() {
        let (remote, ctx) = fixture();
        let first = page(catalog(&ctx, Materialization::Eager).child("page_2.jpg").await.unwrap());
        let bytes = first.content().await.unwrap();
        let second = page(catalog(&ctx, Materialization::Eager).child("page_2.jpg").await.unwrap());
        assert!(first.same_as(&second));
        assert_eq!(second.content().await.unwrap(), bytes);
        assert_eq!(remote.fetch_count(), 1);
    }
}
