use super::{ChapterCatalog, Collection};
use crate::error::{ErrorKind, Result};
use crate::{Context, Materialization, Node};
use async_trait::async_trait;
use exn::ResultExt;
use tokio::sync::RwLock;
use tracing::instrument;

/// The root: one child per series in the remote library.
///
/// Loading it is the only way series identifiers enter the
/// [`IdentifierCache`](crate::cache::IdentifierCache); a series path can't be
/// resolved until a root listing has seen it.
pub struct SeriesCatalog {
    ctx: Context,
    mode: Materialization,
    names: RwLock<Option<Vec<String>>>,
}
impl SeriesCatalog {
    pub fn new(ctx: Context, mode: Materialization) -> Self {
        Self {
            ctx,
            mode,
            names: RwLock::new(None),
        }
    }

    pub fn mode(&self) -> Materialization {
        self.mode
    }

    /// Query the remote library and record every series identifier.
    ///
    /// Always hits the remote, refreshing anything loaded before.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<()> {
        let series = self.ctx.library().series().await.or_raise(|| ErrorKind::RemoteUnavailable)?;
        self.ctx.ids().record_series(series.iter().map(|s| (s.title.clone(), s.id))).await;
        let names: Vec<_> = series.into_iter().map(|s| s.title).collect();
        tracing::debug!(series = names.len(), "Loaded series catalog");
        *self.names.write().await = Some(names);
        Ok(())
    }

    /// Whether [`load`](Self::load) has completed on this instance.
    pub async fn is_loaded(&self) -> bool {
        self.names.read().await.is_some()
    }

    /// Children known without any remote call (empty until loaded).
    pub async fn known_children(&self) -> Vec<String> {
        self.names.read().await.clone().unwrap_or_default()
    }
}

#[async_trait]
impl Collection for SeriesCatalog {
    async fn list_children(&self) -> Result<Vec<String>> {
        if !self.is_loaded().await {
            self.load().await?;
        }
        Ok(self.known_children().await)
    }

    /// A known series yields a lazy [`ChapterCatalog`]: its identifier is
    /// already cached, and its chapters are only queried once it is listed.
    async fn child(&self, name: &str) -> Result<Option<Node>> {
        let Some(id) = self.ctx.ids().series_id(name).await else {
            tracing::debug!(series = name, "Series not in identifier cache");
            return Ok(None);
        };
        let catalog = ChapterCatalog::new(self.ctx.clone(), name, id, Materialization::Lazy);
        Ok(Some(Node::Chapters(catalog)))
    }
}
