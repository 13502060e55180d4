//! Page fetching behind a session-scoped abstraction.
//!
//! A [`PageFetcher`] opens one [`PageSession`] per source task. Sessions are
//! never shared between tasks, and the orchestrator always calls
//! [`PageSession::close`] once it is done with one, whatever the outcome.

pub mod http;
#[cfg(feature = "webdriver")]
pub mod webdriver;

use std::future::Future;

use medprice_core::RenderHints;

use crate::error::ScraperError;

/// A fetched page: the URL it was requested from and its markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub url: String,
    pub html: String,
}

impl PageContent {
    #[must_use]
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Factory for isolated fetch sessions.
pub trait PageFetcher: Send + Sync + 'static {
    type Session: PageSession;

    /// Opens a fresh session owned by the calling task.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Session`] (or a transport error) when the
    /// session cannot be started.
    fn open(&self) -> impl Future<Output = Result<Self::Session, ScraperError>> + Send;
}

/// One task's exclusive browsing context.
pub trait PageSession: Send + 'static {
    /// Loads `url` and returns its rendered markup.
    ///
    /// # Errors
    ///
    /// Returns a [`ScraperError`] for transport, status, or render failures.
    fn fetch(
        &mut self,
        url: &str,
        hints: &RenderHints,
    ) -> impl Future<Output = Result<PageContent, ScraperError>> + Send;

    /// Releases the session. Must not fail; problems are logged.
    fn close(self) -> impl Future<Output = ()> + Send;
}
