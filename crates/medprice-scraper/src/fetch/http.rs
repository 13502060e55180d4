//! Plain HTTP page fetcher.
//!
//! Fetches the server-rendered markup with browser-like headers. Client-side
//! rendering is not executed, so [`RenderHints`] are ignored here; use the
//! `webdriver` fetcher for sources that only populate listings in the browser.

use std::time::Duration;

use medprice_core::RenderHints;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;

use super::{PageContent, PageFetcher, PageSession};
use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// Fetches pages over HTTP, one independent client per session.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    timeout_secs: u64,
    user_agent: String,
    /// Additional attempts after the first failure on retriable errors.
    max_retries: u32,
    /// Base delay for exponential back-off: `backoff_base_ms * 2^(n-1)`.
    backoff_base_ms: u64,
}

impl HttpPageFetcher {
    /// Set `max_retries` to `0` to disable retries.
    #[must_use]
    pub fn new(
        timeout_secs: u64,
        user_agent: impl Into<String>,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            timeout_secs,
            user_agent: user_agent.into(),
            max_retries,
            backoff_base_ms,
        }
    }
}

/// Headers a desktop browser sends on a top-level navigation.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Host part of `url`, or the raw input when it does not parse.
pub(crate) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

impl PageFetcher for HttpPageFetcher {
    type Session = HttpPageSession;

    async fn open(&self) -> Result<Self::Session, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(self.user_agent.as_str())
            .default_headers(browser_headers())
            .build()?;
        Ok(HttpPageSession {
            client,
            max_retries: self.max_retries,
            backoff_base_ms: self.backoff_base_ms,
        })
    }
}

/// A session holding its own connection pool.
pub struct HttpPageSession {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpPageSession {
    async fn get_once(&self, url: &str) -> Result<PageContent, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);
            return Err(ScraperError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let html = response.text().await?;
        if html.trim().is_empty() {
            return Err(ScraperError::EmptyPage {
                url: url.to_owned(),
            });
        }

        Ok(PageContent::new(url, html))
    }
}

impl PageSession for HttpPageSession {
    async fn fetch(&mut self, url: &str, _hints: &RenderHints) -> Result<PageContent, ScraperError> {
        if reqwest::Url::parse(url).is_err() {
            return Err(ScraperError::InvalidUrl {
                url: url.to_owned(),
                reason: "not an absolute URL".to_owned(),
            });
        }
        let this = &*self;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || this.get_once(url)).await
    }

    async fn close(self) {
        tracing::trace!("http session closed");
    }
}
