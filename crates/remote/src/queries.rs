//! GraphQL documents sent to the remote catalog.
//!
//! Operation names double as dispatch keys for the mock transport, so keep
//! [`operation_name`] in sync with the documents below.

pub const GET_LIBRARY: &str = r#"
query GET_LIBRARY($first: Int, $after: Cursor) {
  mangas(condition: { inLibrary: true }, first: $first, after: $after) {
    nodes {
      id
      title
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
"#;

pub const GET_CHAPTERS: &str = r#"
query GET_CHAPTERS($mangaId: Int!, $first: Int, $after: Cursor) {
  chapters(
    condition: { mangaId: $mangaId }
    orderBy: SOURCE_ORDER
    orderByType: DESC
    first: $first
    after: $after
  ) {
    nodes {
      id
      name
      mangaId
      sourceOrder
      pageCount
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
"#;

pub const FETCH_CHAPTER_PAGES: &str = r#"
mutation FETCH_CHAPTER_PAGES($input: FetchChapterPagesInput!) {
  fetchChapterPages(input: $input) {
    chapter {
      id
      pageCount
    }
    pages
  }
}
"#;

/// Extract the operation name (`GET_LIBRARY`, ...) from a document.
pub fn operation_name(document: &str) -> Option<&str> {
    let mut words = document.split_whitespace();
    while let Some(word) = words.next() {
        if word == "query" || word == "mutation" {
            let name = words.next()?;
            return name.split('(').next().filter(|n| !n.is_empty());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GET_LIBRARY, Some("GET_LIBRARY"))]
    #[case(GET_CHAPTERS, Some("GET_CHAPTERS"))]
    #[case(FETCH_CHAPTER_PAGES, Some("FETCH_CHAPTER_PAGES"))]
    #[case("{ mangas { nodes { id } } }", None)]
    fn test_operation_name(#[case] document: &str, #[case] expected: Option<&str>) {
        assert_eq!(operation_name(document), expected);
    }
}
