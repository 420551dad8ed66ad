//! HTTP transport for a live catalog server.
//!
//! Queries are POSTed as JSON (`{"query": ..., "variables": ...}`) to the
//! GraphQL endpoint; page content is fetched with a plain GET against the
//! content base URL.

use super::{ContentTransport, QueryTransport, decode_envelope};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use bytes::Bytes;
use exn::ResultExt;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::instrument;
use url::Url;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("mangadav/", env!("CARGO_PKG_VERSION"));

/// Query and content transport backed by one [`reqwest::Client`].
///
/// # Examples
///
/// ```no_run
/// use mangadav_remote::transport::HttpTransport;
///
/// # fn example() -> mangadav_remote::error::Result<()> {
/// let transport = HttpTransport::builder("http://127.0.0.1:4567/api/graphql", "http://127.0.0.1:4567/")?
///     .timeout(std::time::Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_url: Url,
    content_url: Url,
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    api_url: Url,
    content_url: Url,
    timeout: Duration,
    user_agent: String,
}
impl HttpTransportBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(HttpTransport {
            client,
            api_url: self.api_url,
            content_url: self.content_url,
        })
    }
}

impl HttpTransport {
    /// Start building a transport for the given GraphQL endpoint and content
    /// base URL.
    pub fn builder(api_url: impl AsRef<str>, content_url: impl AsRef<str>) -> Result<HttpTransportBuilder> {
        Ok(HttpTransportBuilder {
            api_url: parse_url(api_url.as_ref())?,
            content_url: parse_url(content_url.as_ref())?,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Turn a page URL from the catalog into an absolute URL.
    pub fn content_url_for(&self, url: &str) -> Result<Url> {
        join_content_url(&self.content_url, url)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).or_raise(|| ErrorKind::InvalidUrl(url.to_string()))
}

/// Resolve a (usually relative) page URL against the content base.
///
/// Leading slashes are stripped from relative URLs so that a base with a path
/// prefix (`http://host/prefix/`) is kept, matching plain string
/// concatenation of base and page URL.
fn join_content_url(base: &Url, url: &str) -> Result<Url> {
    if let Ok(absolute) = Url::parse(url) {
        return Ok(absolute);
    }
    base.join(url.trim_start_matches('/')).or_raise(|| ErrorKind::InvalidUrl(url.to_string()))
}

#[async_trait]
impl QueryTransport for HttpTransport {
    #[instrument(skip_all, fields(operation = crate::queries::operation_name(document)))]
    async fn execute(&self, document: &str, variables: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.api_url.clone())
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await
            .or_raise(|| ErrorKind::Network)?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Network)?;
        let body: Value =
            serde_json::from_slice(&body).or_raise(|| ErrorKind::InvalidResponse("body is not JSON".to_string()))?;
        decode_envelope(body)
    }
}

#[async_trait]
impl ContentTransport for HttpTransport {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let url = self.content_url_for(url)?;
        tracing::info!(url = %url, "Downloading page content");
        let response = self.client.get(url).send().await.or_raise(|| ErrorKind::Network)?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        response.bytes().await.or_raise(|| ErrorKind::Network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://127.0.0.1:4567/", "api/v1/manga/3/chapter/1/page/0", "http://127.0.0.1:4567/api/v1/manga/3/chapter/1/page/0")]
    #[case("http://127.0.0.1:4567/", "/api/v1/manga/3/chapter/1/page/0", "http://127.0.0.1:4567/api/v1/manga/3/chapter/1/page/0")]
    #[case("http://host/prefix/", "/api/page/0", "http://host/prefix/api/page/0")]
    #[case("http://host/prefix/", "https://cdn.example.com/img.jpg", "https://cdn.example.com/img.jpg")]
    fn test_join_content_url(#[case] base: &str, #[case] page: &str, #[case] expected: &str) {
        let base = Url::parse(base).unwrap();
        assert_eq!(join_content_url(&base, page).unwrap().as_str(), expected);
    }

    #[test]
    fn test_builder_rejects_invalid_urls() {
        let err = HttpTransport::builder("not a url", "http://127.0.0.1:4567/").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidUrl(_)));
    }

    #[test]
    fn test_builder_rejects_invalid_user_agent() {
        let err = HttpTransport::builder("http://127.0.0.1:4567/api/graphql", "http://127.0.0.1:4567/")
            .unwrap()
            .user_agent("mangadav\n")
            .build()
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Client);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_builder_builds() {
        let transport = HttpTransport::builder("http://127.0.0.1:4567/api/graphql", "http://127.0.0.1:4567/")
            .unwrap()
            .timeout(Duration::from_secs(5))
            .user_agent("test")
            .build()
            .unwrap();
        assert_eq!(transport.api_url.as_str(), "http://127.0.0.1:4567/api/graphql");
        assert_eq!(
            transport.content_url_for("page/1").unwrap().as_str(),
            "http://127.0.0.1:4567/page/1"
        );
    }
}
