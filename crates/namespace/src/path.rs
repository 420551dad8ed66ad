//! Namespace paths and page file names.
//!
//! A path has between zero and three segments, and the number of segments
//! decides which kind of node answers it:
//!
//! | Path                       | Node                                   |
//! |----------------------------|----------------------------------------|
//! | `/`                        | series catalog (root)                  |
//! | `/Alpha`                   | chapter catalog of series `Alpha`      |
//! | `/Alpha/Ch1`               | page catalog of chapter `Ch1`          |
//! | `/Alpha/Ch1/page_3.jpg`    | page resource, page index 2            |
//!
//! Page file names are **1-based** (`page_1.jpg` is the first page) while
//! page indices are 0-based everywhere else. [`PageName`] is the only place
//! that converts between the two.

use crate::error::{ErrorKind, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

// No leading zeros: every page has exactly one valid file name.
static PAGE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^page_([1-9][0-9]*)\.([A-Za-z0-9]+)$").unwrap());

/// File name of a single page: `page_<n>.<ext>`, with `n` 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageName {
    index: usize,
    extension: String,
}
impl PageName {
    /// Name the page at 0-based `index`.
    pub fn new(index: usize, extension: impl Into<String>) -> Self {
        Self {
            index,
            extension: extension.into(),
        }
    }

    /// 0-based position of the page in its chapter's URL list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based page number, as shown in the file name.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}
impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page_{}.{}", self.number(), self.extension)
    }
}
impl FromStr for PageName {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        let not_found = || ErrorKind::NotFound(s.to_string());
        let Some(captures) = PAGE_NAME_REGEX.captures(s) else {
            exn::bail!(not_found());
        };
        // Overflowing numbers fail to parse, which is still "not found".
        let Ok(number) = captures[1].parse::<usize>() else {
            exn::bail!(not_found());
        };
        Ok(Self::new(number - 1, &captures[2]))
    }
}

/// A parsed namespace path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespacePath {
    Root,
    Series { series: String },
    Chapter { series: String, chapter: String },
    Page { series: String, chapter: String, page: PageName },
}
impl NamespacePath {
    /// Parse a slash-delimited path.
    ///
    /// Empty segments (leading, trailing, or doubled separators) are ignored.
    /// Returns `None` for anything that cannot name a node: more than three
    /// segments, `.`/`..` segments, or a malformed page file name.
    ///
    /// ```
    /// use mangadav_namespace::path::NamespacePath;
    ///
    /// assert_eq!(NamespacePath::parse("/"), Some(NamespacePath::Root));
    /// let page = NamespacePath::parse("/Alpha/Ch1/page_3.jpg/").unwrap();
    /// assert_eq!(page.page().unwrap().index(), 2);
    /// assert_eq!(NamespacePath::parse("/Alpha/Ch1/cover.jpg"), None);
    /// ```
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return None;
        }
        match segments.as_slice() {
            [] => Some(Self::Root),
            [series] => Some(Self::Series {
                series: series.to_string(),
            }),
            [series, chapter] => Some(Self::Chapter {
                series: series.to_string(),
                chapter: chapter.to_string(),
            }),
            [series, chapter, page] => Some(Self::Page {
                series: series.to_string(),
                chapter: chapter.to_string(),
                page: page.parse().ok()?,
            }),
            _ => None,
        }
    }

    /// Number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        match self {
            Self::Root => 0,
            Self::Series { .. } => 1,
            Self::Chapter { .. } => 2,
            Self::Page { .. } => 3,
        }
    }

    pub fn series(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Series { series } | Self::Chapter { series, .. } | Self::Page { series, .. } => Some(series),
        }
    }

    pub fn chapter(&self) -> Option<&str> {
        match self {
            Self::Chapter { chapter, .. } | Self::Page { chapter, .. } => Some(chapter),
            _ => None,
        }
    }

    pub fn page(&self) -> Option<&PageName> {
        match self {
            Self::Page { page, .. } => Some(page),
            _ => None,
        }
    }

    /// The path one level up; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Root => None,
            Self::Series { .. } => Some(Self::Root),
            Self::Chapter { series, .. } => Some(Self::Series { series: series.clone() }),
            Self::Page { series, chapter, .. } => Some(Self::Chapter {
                series: series.clone(),
                chapter: chapter.clone(),
            }),
        }
    }

    /// Every proper ancestor, starting at the root.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut ancestors = Vec::with_capacity(self.depth());
        let mut current = self.parent();
        while let Some(path) = current {
            current = path.parent();
            ancestors.push(path);
        }
        ancestors.reverse();
        ancestors
    }
}
impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "/"),
            Self::Series { series } => write!(f, "/{series}"),
            Self::Chapter { series, chapter } => write!(f, "/{series}/{chapter}"),
            Self::Page { series, chapter, page } => write!(f, "/{series}/{chapter}/{page}"),
        }
    }
}
