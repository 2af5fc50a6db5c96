//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the crawl-wide request timeout
//! - GET requests bound to the crawl's cancellation token
//! - Classifying the response as HTML or not
//!
//! There are no retries: any transport, status or body error is returned to
//! the caller as-is.

use crate::MirrorError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fully buffered response body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Value of the Content-Type header, if any
    pub content_type: Option<String>,

    /// Page body content
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Returns true if the page should be parsed for links
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(content_type) => is_html_content_type(content_type),
            None => super::parser::looks_like_html(&self.body),
        }
    }
}

/// Builds an HTTP client with the given per-request timeout
///
/// `None` disables the timeout.
///
/// # Example
///
/// ```no_run
/// use ripple_mirror::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Some(Duration::from_secs(5))).unwrap();
/// ```
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Issues GET requests for the crawler
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with its own client
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, MirrorError> {
        build_http_client(timeout)
            .map(Self::new)
            .map_err(MirrorError::Client)
    }

    /// Fetches a URL and buffers the whole body
    ///
    /// Cancelling `token` aborts the request and returns
    /// [`MirrorError::Cancelled`].
    pub async fn fetch(
        &self,
        token: &CancellationToken,
        url: &Url,
    ) -> Result<FetchedPage, MirrorError> {
        let request = async {
            let response = self.client.get(url.clone()).send().await?.error_for_status()?;

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let body = response.bytes().await?;

            Ok::<_, reqwest::Error>(FetchedPage {
                content_type,
                body: body.to_vec(),
            })
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(MirrorError::Cancelled),
            result = request => result.map_err(|source| MirrorError::Fetch {
                url: url.to_string(),
                source,
            }),
        }
    }
}

/// Returns true if a Content-Type header names an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
