use std::path::PathBuf;
use std::time::Duration;

use crate::window::PriceWindow;

/// Which page fetcher backs each source task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherKind {
    /// Plain HTTP GET; no client-side rendering.
    Http,
    /// Headless browser session driven over the `WebDriver` protocol.
    WebDriver,
}

impl std::fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetcherKind::Http => write!(f, "http"),
            FetcherKind::WebDriver => write!(f, "webdriver"),
        }
    }
}

/// How source tasks are scheduled within one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One task per source, all in flight at once.
    Concurrent,
    /// One source at a time with a pacing pause between requests.
    Sequential,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Concurrent => write!(f, "concurrent"),
            ExecutionMode::Sequential => write!(f, "sequential"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub sources_path: Option<PathBuf>,
    pub fetcher: FetcherKind,
    pub webdriver_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub compare_timeout_secs: u64,
    pub execution_mode: ExecutionMode,
    pub inter_request_delay_ms: u64,
    pub price_window: PriceWindow,
    pub min_term_len: usize,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl AppConfig {
    /// Global upper bound on one comparison.
    #[must_use]
    pub fn compare_timeout(&self) -> Duration {
        Duration::from_secs(self.compare_timeout_secs)
    }

    #[must_use]
    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }
}
