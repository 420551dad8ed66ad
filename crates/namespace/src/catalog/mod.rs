//! Directory-like nodes.
//!
//! Every catalog follows the same two-phase protocol: `new()` is pure and
//! performs no I/O, `load()` performs the remote call and remembers the
//! result for the lifetime of the instance. The [`Resolver`](crate::Resolver)
//! builds eager catalogs by calling both; children handed out by a catalog
//! are built lazily and only loaded once somebody lists them.

mod chapter;
mod page;
mod series;

pub use self::chapter::ChapterCatalog;
pub use self::page::PageCatalog;
pub use self::series::SeriesCatalog;
use crate::Node;
use crate::error::Result;
use async_trait::async_trait;

/// The two capabilities a directory-serving protocol needs from a catalog.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Names of the children, in remote order. Loads the catalog first if
    /// nothing has been loaded yet.
    async fn list_children(&self) -> Result<Vec<String>>;

    /// Look up a child by the name [`list_children`](Self::list_children)
    /// reported. `Ok(None)` means "does not exist".
    async fn child(&self, name: &str) -> Result<Option<Node>>;
}
