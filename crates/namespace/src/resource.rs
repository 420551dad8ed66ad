//! The leaf node: one page of one chapter.
//!
//! A [`PageResource`] moves through three content states, at most once each
//! per instance:
//!
//! ```text
//! Unresolved --(page list query)--> Located(url) --(download)--> Fetched(url, bytes)
//! ```
//!
//! Only eager resources ever leave `Unresolved`/`Located`. A lazy resource
//! answers every content request with [`PLACEHOLDER`] and never touches the
//! network, however often it is asked.

use crate::cache::ContentCache;
use crate::error::{ErrorKind, Result};
use crate::path::PageName;
use crate::{Context, Materialization};
use bytes::Bytes;
use exn::ResultExt;
use futures::Stream;
use mangadav_remote::models::ChapterId;
use mangadav_remote::{ContentHandle, Library};
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tracing::instrument;

/// Content returned by lazy resources: the JPEG start- and end-of-image
/// markers, i.e. the smallest byte stream that still sniffs as a JPEG.
pub const PLACEHOLDER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

enum State {
    Unresolved,
    Located { url: String },
    Fetched { url: String, bytes: Bytes },
}

struct Inner {
    library: Library,
    content: ContentHandle,
    // Weak: the cache holds resources, a resource must not keep the cache alive.
    resources: Weak<ContentCache>,
    content_type: String,
    chapter_id: ChapterId,
    page: PageName,
    mode: Materialization,
    state: Mutex<State>,
}

/// A single page, answering length, type and bytes.
///
/// Cheap to clone; clones share one content state, so the page is downloaded
/// at most once no matter which clone asks first.
#[derive(Clone)]
pub struct PageResource {
    inner: Arc<Inner>,
}
impl PageResource {
    /// Create a page resource. With `url` unknown, an eager resource looks it
    /// up from the chapter's page list on first content access.
    pub fn new(
        ctx: &Context,
        chapter_id: ChapterId,
        page: PageName,
        url: Option<String>,
        mode: Materialization,
    ) -> Self {
        let state = match url {
            Some(url) => State::Located { url },
            None => State::Unresolved,
        };
        Self {
            inner: Arc::new(Inner {
                library: ctx.library().clone(),
                content: ctx.content().clone(),
                resources: Arc::downgrade(ctx.resources()),
                content_type: ctx.layout().content_type.clone(),
                chapter_id,
                page,
                mode,
                state: Mutex::new(state),
            }),
        }
    }

    /// File name of this page (`page_<n>.<ext>`).
    pub fn name(&self) -> String {
        self.inner.page.to_string()
    }

    /// 0-based index into the chapter's page list.
    pub fn index(&self) -> usize {
        self.inner.page.index()
    }

    pub fn chapter_id(&self) -> ChapterId {
        self.inner.chapter_id
    }

    pub fn mode(&self) -> Materialization {
        self.inner.mode
    }

    /// The resolved page URL, if known yet.
    pub async fn url(&self) -> Option<String> {
        match &*self.inner.state.lock().await {
            State::Unresolved => None,
            State::Located { url } | State::Fetched { url, .. } => Some(url.clone()),
        }
    }

    /// Whether the page's bytes have been downloaded (or reused).
    pub async fn is_fetched(&self) -> bool {
        matches!(&*self.inner.state.lock().await, State::Fetched { .. })
    }

    /// Whether two handles share the same underlying resource.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Media type of the page. Fixed, never sniffed.
    pub fn content_type(&self) -> &str {
        &self.inner.content_type
    }

    /// Byte ranges are not supported; clients must fall back to full reads.
    pub fn supports_ranges(&self) -> bool {
        false
    }

    /// Entity tags are not supported.
    pub fn supports_etags(&self) -> bool {
        false
    }

    /// Length of [`content`](Self::content) in bytes, materialising the page
    /// if needed.
    pub async fn content_length(&self) -> Result<u64> {
        let bytes = self.materialize().await?;
        Ok(u64::try_from(bytes.len()).unwrap_or(u64::MAX))
    }

    /// The page's bytes, materialising the page if needed.
    pub async fn content(&self) -> Result<Bytes> {
        self.materialize().await
    }

    /// The page's bytes as a stream, for serving collaborators that write
    /// responses incrementally.
    pub fn content_stream(&self) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
        let resource = self.clone();
        futures::stream::once(async move { resource.materialize().await })
    }

    /// Bytes already held by this resource, without any remote call.
    async fn fetched_bytes(&self) -> Option<Bytes> {
        match &*self.inner.state.lock().await {
            State::Fetched { bytes, .. } => Some(bytes.clone()),
            _ => None,
        }
    }

    #[instrument(skip(self), fields(chapter = %self.inner.chapter_id, page = %self.inner.page))]
    async fn materialize(&self) -> Result<Bytes> {
        if !self.inner.mode.is_eager() {
            return Ok(Bytes::from_static(PLACEHOLDER));
        }
        // Held across the remote calls: one materialisation per instance.
        let mut state = self.inner.state.lock().await;
        let url = match &*state {
            State::Fetched { bytes, .. } => return Ok(bytes.clone()),
            State::Located { url } => url.clone(),
            State::Unresolved => self.locate().await?,
        };
        // Keep a located URL even if the download below fails.
        *state = State::Located { url: url.clone() };
        let (bytes, downloaded) = self.download(&url).await?;
        *state = State::Fetched {
            url: url.clone(),
            bytes: bytes.clone(),
        };
        if downloaded && let Some(cache) = self.inner.resources.upgrade() {
            cache.insert(url, self.clone()).await;
        }
        Ok(bytes)
    }

    /// Look this page's URL up in a freshly fetched page list.
    async fn locate(&self) -> Result<String> {
        let urls =
            self.inner.library.pages(self.inner.chapter_id).await.or_raise(|| ErrorKind::RemoteUnavailable)?;
        match urls.into_iter().nth(self.index()) {
            Some(url) => Ok(url),
            None => exn::bail!(ErrorKind::NotFound(self.name())),
        }
    }

    /// Reuse bytes from a resource already materialised for `url`, or
    /// download them. The flag tells whether a download happened.
    async fn download(&self, url: &str) -> Result<(Bytes, bool)> {
        if let Some(cache) = self.inner.resources.upgrade()
            && let Some(other) = cache.get(url).await
            && !self.same_as(&other)
            && let Some(bytes) = other.fetched_bytes().await
        {
            tracing::debug!(url, "Reusing bytes of materialised page resource");
            return Ok((bytes, false));
        }
        let bytes = self.inner.content.fetch(url).await.or_raise(|| ErrorKind::RemoteUnavailable)?;
        tracing::debug!(url, bytes = bytes.len(), "Downloaded page content");
        Ok((bytes, true))
    }
}
impl fmt::Debug for PageResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageResource")
            .field("chapter_id", &self.inner.chapter_id)
            .field("page", &self.inner.page)
            .field("mode", &self.inner.mode)
            .finish_non_exhaustive()
    }
}
