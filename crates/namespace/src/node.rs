use crate::catalog::{ChapterCatalog, Collection, PageCatalog, SeriesCatalog};
use crate::resource::PageResource;
use derive_more::Display;

/// Anything a path can resolve to.
pub enum Node {
    /// The root.
    Series(SeriesCatalog),
    /// One series.
    Chapters(ChapterCatalog),
    /// One chapter.
    Pages(PageCatalog),
    /// One page.
    Page(PageResource),
}

/// What a serving protocol reports a node as.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    #[display("directory")]
    Collection,
    #[display("file")]
    Resource,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Page(_) => NodeKind::Resource,
            _ => NodeKind::Collection,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.kind() == NodeKind::Collection
    }

    /// The kind and media type a serving protocol advertises for this node.
    pub fn display_info(&self) -> (NodeKind, Option<&str>) {
        match self {
            Self::Page(resource) => (NodeKind::Resource, Some(resource.content_type())),
            _ => (NodeKind::Collection, None),
        }
    }

    pub fn as_collection(&self) -> Option<&dyn Collection> {
        match self {
            Self::Series(catalog) => Some(catalog),
            Self::Chapters(catalog) => Some(catalog),
            Self::Pages(catalog) => Some(catalog),
            Self::Page(_) => None,
        }
    }

    pub fn as_resource(&self) -> Option<&PageResource> {
        match self {
            Self::Page(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn into_resource(self) -> Option<PageResource> {
        match self {
            Self::Page(resource) => Some(resource),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Series(_) => f.write_str("Series"),
            Self::Chapters(catalog) => f.debug_tuple("Chapters").field(&catalog.series()).finish(),
            Self::Pages(catalog) => {
                f.debug_tuple("Pages").field(&catalog.series()).field(&catalog.chapter()).finish()
            },
            Self::Page(resource) => f.debug_tuple("Page").field(resource).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Materialization;
    use crate::path::PageName;
    use crate::testing::fixture;
    use mangadav_remote::models::ChapterId;

    #[test]
    fn test_kinds() {
        let (_remote, ctx) = fixture();
        let root = Node::Series(SeriesCatalog::new(ctx.clone(), Materialization::Eager));
        assert!(root.is_collection());
        assert!(root.as_collection().is_some());
        assert!(root.as_resource().is_none());
        assert_eq!(root.kind().to_string(), "directory");
        assert_eq!(root.display_info(), (NodeKind::Collection, None));

        let page = PageResource::new(&ctx, ChapterId(10), PageName::new(0, "jpg"), None, Materialization::Lazy);
        let page = Node::Page(page);
        assert!(!page.is_collection());
        assert!(page.as_collection().is_none());
        assert_eq!(page.kind().to_string(), "file");
        assert_eq!(page.display_info(), (NodeKind::Resource, Some("image/jpeg")));
        assert_eq!(page.into_resource().map(|r| r.name()).as_deref(), Some("page_1.jpg"));
    }
}
