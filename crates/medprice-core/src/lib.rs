pub mod app_config;
pub mod config;
pub mod outcome;
pub mod report;
pub mod search;
pub mod sources;
pub mod window;

pub use app_config::{AppConfig, ExecutionMode, FetcherKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use outcome::{FetchOutcome, OutcomeTag, PriceResult};
pub use report::{aggregate, ComparisonReport, MissingSource};
pub use search::SearchTerm;
pub use sources::{
    default_sources, load_sources, QueryEncoding, RenderHints, SourceSpec, SourcesFile,
};
pub use window::PriceWindow;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[source] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid search term: {reason}")]
    InvalidSearchTerm { reason: String },

    #[error("no results found across {sources} sources")]
    NoResults { sources: usize },
}
