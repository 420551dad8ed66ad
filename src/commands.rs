//! The commands, written against a [`Resolver`] like any directory-serving
//! frontend would be.
//!
//! Series and chapters are only resolvable once a listing of their parent has
//! been seen, so every command first [`walk`]s from the root to its target,
//! listing each directory on the way. A page is taken from its loaded
//! chapter rather than resolved on its own, so the chapter's page list is
//! fetched once per walk.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use mangadav_namespace::path::{NamespacePath, SEPARATOR};
use mangadav_namespace::{Node, Resolver};
use tokio::io::{AsyncWrite, AsyncWriteExt};

const INDENT: &str = "    ";

/// Resolve `path` the way a client browsing from the root would reach it.
pub async fn walk(resolver: &Resolver, path: &str) -> Result<Node> {
    let target = NamespacePath::parse(path).ok_or_raise(|| ErrorKind::NotFound(path.to_string()))?;
    let mut parent = None;
    for ancestor in target.ancestors() {
        let node = resolve(resolver, &ancestor).await?;
        // A loaded chapter already holds its page list.
        if !matches!(node, Node::Pages(_))
            && let Some(collection) = node.as_collection()
        {
            collection.list_children().await.or_raise(|| ErrorKind::Namespace)?;
        }
        parent = Some(node);
    }
    match (&target, parent) {
        (NamespacePath::Page { page, .. }, Some(chapter)) => {
            let collection = chapter.as_collection().ok_or_raise(|| ErrorKind::NotFound(target.to_string()))?;
            collection
                .child(&page.to_string())
                .await
                .or_raise(|| ErrorKind::Namespace)?
                .ok_or_raise(|| ErrorKind::NotFound(target.to_string()))
        },
        _ => resolve(resolver, &target).await,
    }
}

async fn resolve(resolver: &Resolver, path: &NamespacePath) -> Result<Node> {
    resolver
        .resolve_path(path)
        .await
        .or_raise(|| ErrorKind::Namespace)?
        .ok_or_raise(|| ErrorKind::NotFound(path.to_string()))
}

pub async fn ls<W: AsyncWrite + Unpin>(resolver: &Resolver, path: &str, out: &mut W) -> Result<()> {
    let node = walk(resolver, path).await?;
    let collection = node.as_collection().ok_or_raise(|| ErrorKind::NotADirectory(path.to_string()))?;
    for name in collection.list_children().await.or_raise(|| ErrorKind::Namespace)? {
        write_line(out, &name).await?;
    }
    Ok(())
}

pub async fn cat<W: AsyncWrite + Unpin>(resolver: &Resolver, path: &str, out: &mut W) -> Result<()> {
    let node = walk(resolver, path).await?;
    let page = node.as_resource().ok_or_raise(|| ErrorKind::IsADirectory(path.to_string()))?;
    let bytes = page.content().await.or_raise(|| ErrorKind::Namespace)?;
    out.write_all(&bytes).await.or_raise(|| ErrorKind::Io)?;
    out.flush().await.or_raise(|| ErrorKind::Io)
}

pub async fn stat<W: AsyncWrite + Unpin>(resolver: &Resolver, path: &str, out: &mut W) -> Result<()> {
    let node = walk(resolver, path).await?;
    let target = NamespacePath::parse(path).ok_or_raise(|| ErrorKind::NotFound(path.to_string()))?;
    write_line(out, &format!("path: {target}")).await?;
    let (kind, content_type) = node.display_info();
    write_line(out, &format!("kind: {kind}")).await?;
    if let Some(content_type) = content_type {
        write_line(out, &format!("content-type: {content_type}")).await?;
    }
    match (node.as_collection(), node.as_resource()) {
        (Some(collection), _) => {
            let children = collection.list_children().await.or_raise(|| ErrorKind::Namespace)?;
            write_line(out, &format!("children: {}", children.len())).await?;
        },
        (None, Some(page)) => {
            let length = page.content_length().await.or_raise(|| ErrorKind::Namespace)?;
            write_line(out, &format!("content-length: {length}")).await?;
            write_line(out, &format!("ranges: {}", page.supports_ranges())).await?;
        },
        (None, None) => {},
    }
    Ok(())
}

/// Print the tree below `path`, pre-order. Directories below the target are
/// reached through [`child`](mangadav_namespace::Collection::child), so they
/// are only listed when descended into and pages are never downloaded.
pub async fn tree<W: AsyncWrite + Unpin>(
    resolver: &Resolver,
    path: &str,
    depth: Option<usize>,
    out: &mut W,
) -> Result<()> {
    let root = walk(resolver, path).await?;
    let label = NamespacePath::parse(path).map(|p| p.to_string()).unwrap_or_else(|| path.to_string());
    let mut stack = vec![(label, root, 0usize)];
    while let Some((name, node, level)) = stack.pop() {
        let suffix = if node.is_collection() && level > 0 { "/" } else { "" };
        write_line(out, &format!("{}{name}{suffix}", INDENT.repeat(level))).await?;
        let Some(collection) = node.as_collection() else {
            continue;
        };
        if depth.is_some_and(|max| level >= max) {
            continue;
        }
        // Chapter listings carry their series as a prefix.
        let series = match &node {
            Node::Chapters(catalog) => Some(catalog.series()),
            _ => None,
        };
        let names = collection.list_children().await.or_raise(|| ErrorKind::Namespace)?;
        let mut children = Vec::with_capacity(names.len());
        for name in names {
            let Some(child) = collection.child(&name).await.or_raise(|| ErrorKind::Namespace)? else {
                tracing::warn!(name, "Listed child no longer resolves");
                continue;
            };
            let short = series
                .and_then(|series| name.strip_prefix(series))
                .and_then(|rest| rest.strip_prefix(SEPARATOR))
                .unwrap_or(&name)
                .to_string();
            children.push((short, child, level + 1));
        }
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, line: &str) -> Result<()> {
    out.write_all(line.as_bytes()).await.or_raise(|| ErrorKind::Io)?;
    out.write_all(b"\n").await.or_raise(|| ErrorKind::Io)
}
