use crate::cache::{ContentCache, IdentifierCache};
use mangadav_remote::{ContentHandle, Library};
use std::sync::Arc;

/// Default page file extension.
pub const DEFAULT_EXTENSION: &str = "jpg";
/// Default media type reported for every page.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// How pages are presented as files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Extension of page file names (`page_<n>.<extension>`), without the dot.
    pub extension: String,
    /// Media type reported for every page.
    pub content_type: String,
}
impl Default for Layout {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

/// Everything a node needs to resolve itself: the remote collaborators, the
/// shared caches, and the page layout.
///
/// Cheap to clone; clones share the same caches. Create one per process (or
/// one per test) and hand it to the [`Resolver`](crate::Resolver).
#[derive(Clone)]
pub struct Context {
    library: Library,
    content: ContentHandle,
    ids: Arc<IdentifierCache>,
    resources: Arc<ContentCache>,
    layout: Arc<Layout>,
}
impl Context {
    /// Create a context with empty caches and the default [`Layout`].
    pub fn new(library: Library, content: ContentHandle) -> Self {
        Self {
            library,
            content,
            ids: Arc::new(IdentifierCache::new()),
            resources: Arc::new(ContentCache::new()),
            layout: Arc::new(Layout::default()),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Arc::new(layout);
        self
    }

    /// Share existing caches instead of the ones created by [`new`](Self::new).
    pub fn with_caches(mut self, ids: Arc<IdentifierCache>, resources: Arc<ContentCache>) -> Self {
        self.ids = ids;
        self.resources = resources;
        self
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn content(&self) -> &ContentHandle {
        &self.content
    }

    pub fn ids(&self) -> &Arc<IdentifierCache> {
        &self.ids
    }

    pub fn resources(&self) -> &Arc<ContentCache> {
        &self.resources
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}
