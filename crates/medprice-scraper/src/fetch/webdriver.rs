//! Headless-browser page fetcher over the W3C WebDriver protocol.
//!
//! Each session starts its own Chrome instance through the configured
//! WebDriver server (chromedriver or a Selenium grid), so concurrent tasks
//! never share cookies, tabs, or navigation state.

use std::time::Duration;

use medprice_core::RenderHints;
use thirtyfour::{ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use super::{PageContent, PageFetcher, PageSession};
use crate::error::ScraperError;

#[derive(Debug, Clone)]
pub struct WebDriverPageFetcher {
    server_url: String,
    user_agent: String,
}

impl WebDriverPageFetcher {
    #[must_use]
    pub fn new(server_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            user_agent: user_agent.into(),
        }
    }
}

impl PageFetcher for WebDriverPageFetcher {
    type Session = WebDriverSession;

    async fn open(&self) -> Result<Self::Session, ScraperError> {
        let session_err = |e: thirtyfour::error::WebDriverError| ScraperError::Session(e.to_string());

        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless().map_err(session_err)?;
        caps.set_no_sandbox().map_err(session_err)?;
        caps.set_disable_dev_shm_usage().map_err(session_err)?;
        caps.add_arg(&format!("--user-agent={}", self.user_agent))
            .map_err(session_err)?;

        let driver = WebDriver::new(&self.server_url, caps)
            .await
            .map_err(session_err)?;
        tracing::debug!(server = %self.server_url, "webdriver session opened");
        Ok(WebDriverSession { driver })
    }
}

pub struct WebDriverSession {
    driver: WebDriver,
}

impl PageSession for WebDriverSession {
    async fn fetch(&mut self, url: &str, hints: &RenderHints) -> Result<PageContent, ScraperError> {
        let render_err = |e: thirtyfour::error::WebDriverError| ScraperError::Render(e.to_string());

        self.driver.goto(url).await.map_err(render_err)?;
        tokio::time::sleep(Duration::from_millis(hints.settle_ms)).await;

        if let Some(offset) = hints.scroll_to {
            self.driver
                .execute(format!("window.scrollTo(0, {offset});"), Vec::new())
                .await
                .map_err(render_err)?;
            tokio::time::sleep(Duration::from_millis(hints.post_scroll_settle_ms)).await;
        }

        let html = self.driver.source().await.map_err(render_err)?;
        if html.trim().is_empty() {
            return Err(ScraperError::EmptyPage {
                url: url.to_owned(),
            });
        }
        Ok(PageContent::new(url, html))
    }

    async fn close(self) {
        if let Err(err) = self.driver.quit().await {
            tracing::warn!(error = %err, "failed to quit webdriver session");
        }
    }
}
