//! The single entry point of the namespace.

use crate::catalog::{ChapterCatalog, PageCatalog, SeriesCatalog};
use crate::error::Result;
use crate::path::NamespacePath;
use crate::resource::PageResource;
use crate::{Context, Materialization, Node};
use tracing::instrument;

/// Resolves slash-delimited paths to nodes.
///
/// Every node the resolver hands out is eager and already loaded. Lookups
/// only consult the [`IdentifierCache`](crate::cache::IdentifierCache): a
/// series or chapter is found only once a listing of its parent has recorded
/// it, exactly as a directory-walking client would encounter it.
#[derive(Clone)]
pub struct Resolver {
    ctx: Context,
}
impl Resolver {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Resolve `path`. `Ok(None)` means "does not exist": an unknown name,
    /// more than three segments, or a malformed page file name.
    pub async fn resolve(&self, path: &str) -> Result<Option<Node>> {
        match NamespacePath::parse(path) {
            Some(path) => self.resolve_path(&path).await,
            None => {
                tracing::debug!(path, "Malformed namespace path");
                Ok(None)
            },
        }
    }

    #[instrument(skip(self), fields(path = %path))]
    pub async fn resolve_path(&self, path: &NamespacePath) -> Result<Option<Node>> {
        let ids = self.ctx.ids();
        match path {
            NamespacePath::Root => {
                let catalog = SeriesCatalog::new(self.ctx.clone(), Materialization::Eager);
                catalog.load().await?;
                Ok(Some(Node::Series(catalog)))
            },
            NamespacePath::Series { series } => {
                let Some(id) = ids.series_id(series).await else {
                    tracing::debug!("Series not in identifier cache");
                    return Ok(None);
                };
                let catalog = ChapterCatalog::new(self.ctx.clone(), series, id, Materialization::Eager);
                catalog.load().await?;
                Ok(Some(Node::Chapters(catalog)))
            },
            NamespacePath::Chapter { series, chapter } => {
                let Some(id) = ids.chapter_id(series, chapter).await else {
                    tracing::debug!("Chapter not in identifier cache");
                    return Ok(None);
                };
                let catalog = PageCatalog::new(self.ctx.clone(), series, chapter, id, Materialization::Eager);
                catalog.load().await?;
                Ok(Some(Node::Pages(catalog)))
            },
            NamespacePath::Page { series, chapter, page } => {
                if page.extension() != self.ctx.layout().extension {
                    return Ok(None);
                }
                let Some(id) = ids.chapter_id(series, chapter).await else {
                    tracing::debug!("Chapter not in identifier cache");
                    return Ok(None);
                };
                // URL left unresolved until content is first requested.
                let resource = PageResource::new(&self.ctx, id, page.clone(), None, Materialization::Eager);
                Ok(Some(Node::Page(resource)))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::fixture;
    use mangadav_remote::models::{ChapterId, SeriesId};
    use mangadav_remote::transport::MockRemote;
    use rstest::rstest;

    async fn list(resolver: &Resolver, path: &str) -> Vec<String> {
        let node = resolver.resolve(path).await.unwrap().unwrap();
        node.as_collection().unwrap().list_children().await.unwrap()
    }

    #[tokio::test]
    async fn test_walk_from_root_to_page() {
        let (remote, ctx) = fixture();
        let resolver = Resolver::new(ctx);

        assert_eq!(list(&resolver, "/").await, ["Alpha", "Beta"]);
        assert_eq!(list(&resolver, "/Alpha").await, ["Alpha/Ch1", "Alpha/Ch2"]);
        assert_eq!(list(&resolver, "/Alpha/Ch1/").await, ["page_1.jpg", "page_2.jpg", "page_3.jpg"]);

        let node = resolver.resolve("Alpha/Ch1/page_2.jpg").await.unwrap().unwrap();
        let page = node.as_resource().unwrap();
        assert_eq!(page.mode(), Materialization::Eager);
        assert_eq!(page.content().await.unwrap(), MockRemote::page_content(10, 1));
        assert_eq!(page.content_length().await.unwrap(), MockRemote::page_content(10, 1).len() as u64);
        assert_eq!(remote.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_root_is_eager() {
        let (remote, ctx) = fixture();
        let resolver = Resolver::new(ctx.clone());
        let Some(Node::Series(root)) = resolver.resolve("").await.unwrap() else {
            panic!("expected the series catalog");
        };
        assert!(root.is_loaded().await);
        assert_eq!(remote.query_count("GET_LIBRARY"), 1);
        assert_eq!(ctx.ids().series_len().await, 2);
    }

    #[tokio::test]
    async fn test_no_implicit_listing() {
        let (remote, ctx) = fixture();
        let resolver = Resolver::new(ctx);
        assert!(resolver.resolve("Alpha").await.unwrap().is_none());
        assert!(resolver.resolve("Alpha/Ch1").await.unwrap().is_none());
        assert!(resolver.resolve("Alpha/Ch1/page_1.jpg").await.unwrap().is_none());
        assert_eq!(remote.request_count(), 0);
    }

    #[rstest]
    #[case("Alpha/Ch1/page_1.jpg/extra")]
    #[case("Alpha/Ch1/cover.jpg")]
    #[case("Alpha/Ch1/page_0.jpg")]
    #[case("Alpha/Ch1/page_1.png")]
    #[case("Alpha/../Beta")]
    #[case("Gamma")]
    #[case("Alpha/Ch9")]
    #[tokio::test]
    async fn test_not_found(#[case] path: &str) {
        let (_remote, ctx) = fixture();
        let resolver = Resolver::new(ctx);
        list(&resolver, "").await;
        list(&resolver, "Alpha").await;
        assert!(resolver.resolve(path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_out_of_bounds_page() {
        let (_remote, ctx) = fixture();
        let resolver = Resolver::new(ctx);
        list(&resolver, "").await;
        list(&resolver, "Alpha").await;

        // Through the chapter listing the index is bounds-checked up front.
        let chapter = resolver.resolve("Alpha/Ch1").await.unwrap().unwrap();
        assert!(chapter.as_collection().unwrap().child("page_4.jpg").await.unwrap().is_none());

        // Resolved directly, the URL is unknown until content is requested.
        let node = resolver.resolve("Alpha/Ch1/page_4.jpg").await.unwrap().unwrap();
        let err = node.as_resource().unwrap().content().await.unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound("page_4.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_remote_failure_is_not_cached() {
        let (remote, ctx) = fixture();
        let resolver = Resolver::new(ctx.clone());
        remote.set_offline(true);
        let err = resolver.resolve("/").await.unwrap_err();
        assert_eq!(*err, ErrorKind::RemoteUnavailable);
        assert!(err.is_retryable());
        assert_eq!(ctx.ids().series_len().await, 0);

        remote.set_offline(false);
        assert_eq!(list(&resolver, "/").await, ["Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_converges() {
        let (_remote, ctx) = fixture();
        let first = Resolver::new(ctx.clone());
        let second = Resolver::new(ctx.clone());
        let (a, b) = tokio::join!(list(&first, "/"), list(&second, "/"));
        assert_eq!(a, b);

        let (a, b) = tokio::join!(first.resolve("Alpha"), second.resolve("Alpha"));
        let (Some(Node::Chapters(a)), Some(Node::Chapters(b))) = (a.unwrap(), b.unwrap()) else {
            panic!("expected chapter catalogs");
        };
        assert_eq!(a.series_id(), SeriesId(1));
        assert_eq!(b.series_id(), SeriesId(1));
        assert_eq!(ctx.ids().series_id("Alpha").await, Some(SeriesId(1)));
        assert_eq!(ctx.ids().chapter_id("Alpha", "Ch1").await, Some(ChapterId(10)));
        assert_eq!(ctx.ids().chapters_len().await, 2);
    }

    #[tokio::test]
    async fn test_content_reused_across_paths() {
        let (remote, ctx) = fixture();
        let resolver = Resolver::new(ctx);
        list(&resolver, "").await;
        list(&resolver, "Alpha").await;

        let direct = resolver.resolve("Alpha/Ch1/page_1.jpg").await.unwrap().unwrap();
        let bytes = direct.as_resource().unwrap().content().await.unwrap();

        let chapter = resolver.resolve("Alpha/Ch1").await.unwrap().unwrap();
        let listed = chapter.as_collection().unwrap().child("page_1.jpg").await.unwrap().unwrap();
        let listed = listed.into_resource().unwrap();
        assert!(listed.is_fetched().await);
        assert_eq!(listed.content().await.unwrap(), bytes);
        assert_eq!(remote.fetch_count(), 1);
    }
}
