use medprice_core::CoreError;
use thiserror::Error;

/// Failure to obtain a page for one source. Never crosses the task
/// boundary; the orchestrator turns it into a `Failed` outcome.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("page fetcher session error: {0}")]
    Session(String),

    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("empty page body from {url}")]
    EmptyPage { url: String },
}

/// Errors surfaced to callers of
/// [`ComparisonService::compare_medicine`](crate::ComparisonService::compare_medicine).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("no results found across {sources} sources; try a generic name or check spelling")]
    NoResults { sources: usize },
}

impl From<CoreError> for CompareError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidSearchTerm { reason } => CompareError::InvalidInput { reason },
            CoreError::NoResults { sources } => CompareError::NoResults { sources },
        }
    }
}
