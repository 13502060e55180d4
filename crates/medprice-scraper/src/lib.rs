pub mod error;
pub mod extract;
pub mod fetch;
pub mod orchestrator;
pub mod price;
pub(crate) mod retry;
pub mod service;

pub use error::{CompareError, ScraperError};
pub use extract::{extract, ExtractionTier};
pub use fetch::http::HttpPageFetcher;
#[cfg(feature = "webdriver")]
pub use fetch::webdriver::WebDriverPageFetcher;
pub use fetch::{PageContent, PageFetcher, PageSession};
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use price::normalize_price;
pub use service::ComparisonService;
