//! HTTP transport behind the [`Fetcher`] trait
//!
//! The pipeline only needs two capabilities from the transport: fetch a body,
//! and fetch the hypermedia links of a response. [`HttpFetcher`] provides both
//! on top of `reqwest`; tests and embedders can substitute their own.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::request::RequestParam;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

/// One entry of an RFC 8288 `Link` header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// Target URL as sent by the server
    pub url: String,
    /// Remaining link parameters (`rel`, `type`, ...) with quotes stripped
    pub params: HashMap<String, String>,
}

impl Link {
    /// Value of a query parameter of the link target
    ///
    /// Relative targets are accepted. Returns `None` when the URL cannot be
    /// parsed or lacks the parameter.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let url = match Url::parse(&self.url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost/")
                .and_then(|base| base.join(&self.url))
                .ok()?,
            Err(_) => return None,
        };
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Transport capability consumed by the download pipeline
///
/// Implementations must report any non-2xx response as
/// [`Error::HttpFailed`]. They hold no per-request state, so one instance is
/// shared by every concurrent fetch of a batch.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue the request and return the raw response body
    async fn fetch(&self, request: &RequestParam) -> Result<Vec<u8>>;

    /// Issue the request and return its `Link` relations keyed by `rel`
    ///
    /// Used for page-count discovery, so callers should ask for the smallest
    /// useful page.
    async fn fetch_links(&self, request: &RequestParam) -> Result<HashMap<String, Link>>;
}

/// [`Fetcher`] backed by a `reqwest::Client`
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl HttpFetcher {
    /// Create a fetcher for the given configuration
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base()?,
            credentials: config
                .credentials()
                .map(|(u, p)| (u.to_string(), p.to_string())),
        })
    }

    /// Resolve a request path against the base URL (urljoin semantics)
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send(&self, request: &RequestParam) -> Result<reqwest::Response> {
        let url = self.resolve(&request.path)?;
        debug!(url = %url, method = %request.method, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .query(&request.params);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some((username, password)) = &self.credentials {
            builder = builder.basic_auth(username, Some(password));
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpFailed {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        info!(url = %response.url(), "Successfully downloaded");
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &RequestParam) -> Result<Vec<u8>> {
        let response = self.send(request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_links(&self, request: &RequestParam) -> Result<HashMap<String, Link>> {
        let response = self.send(request).await?;
        let mut links = HashMap::new();
        for value in response.headers().get_all(reqwest::header::LINK) {
            if let Ok(value) = value.to_str() {
                links.extend(parse_link_header(value));
            }
        }
        Ok(links)
    }
}

fn link_regex() -> &'static Regex {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    // literal pattern, cannot fail to compile
    #[allow(clippy::expect_used)]
    LINK_RE.get_or_init(|| Regex::new(r"<([^>]*)>([^<]*)").expect("valid link regex"))
}

/// Parse a `Link` header value into relations keyed by `rel`
///
/// Entries without a `rel` parameter are keyed by their URL. An entry whose
/// `rel` lists several relations (`rel="next last"`) is registered under each.
/// Commas inside `<...>` are preserved, so unencoded query strings survive.
pub fn parse_link_header(value: &str) -> HashMap<String, Link> {
    let mut links = HashMap::new();

    for captures in link_regex().captures_iter(value) {
        let url = captures[1].trim().to_string();
        let params: HashMap<String, String> = captures[2]
            .split(';')
            .filter_map(|part| {
                let part = part.trim().trim_end_matches(',').trim();
                let (key, val) = part.split_once('=')?;
                Some((
                    key.trim().to_ascii_lowercase(),
                    val.trim().trim_matches(|c| c == '"' || c == '\'').to_string(),
                ))
            })
            .collect();

        let link = Link { url, params };
        match link.params.get("rel") {
            Some(rel) => {
                for relation in rel.split_whitespace() {
                    links.insert(relation.to_string(), link.clone());
                }
            }
            None => {
                links.insert(link.url.clone(), link);
            }
        }
    }

    links
}
