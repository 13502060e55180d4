use rust_decimal::Decimal;

use crate::app_config::{AppConfig, ExecutionMode, FetcherKind};
use crate::search::DEFAULT_MIN_TERM_LEN;
use crate::window::PriceWindow;
use crate::ConfigError;

/// Desktop Chrome user agent; several pharmacy sites serve an empty shell to
/// unknown agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; absent values fall back to defaults.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_decimal = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<Decimal>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let log_level = or_default("MEDPRICE_LOG_LEVEL", "info");
    let sources_path = lookup("MEDPRICE_SOURCES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let fetcher = parse_fetcher(&or_default("MEDPRICE_FETCHER", "http"))?;
    let webdriver_url = or_default("MEDPRICE_WEBDRIVER_URL", "http://localhost:4444");
    let request_timeout_secs = parse_u64("MEDPRICE_REQUEST_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("MEDPRICE_USER_AGENT", DEFAULT_USER_AGENT);

    let compare_timeout_secs = parse_u64("MEDPRICE_COMPARE_TIMEOUT_SECS", "30")?;
    if compare_timeout_secs == 0 {
        return Err(invalid(
            "MEDPRICE_COMPARE_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let execution_mode =
        parse_execution_mode(&or_default("MEDPRICE_EXECUTION_MODE", "concurrent"))?;
    let inter_request_delay_ms = parse_u64("MEDPRICE_INTER_REQUEST_DELAY_MS", "2000")?;

    let price_min = parse_decimal("MEDPRICE_PRICE_MIN", "1")?;
    let price_max = parse_decimal("MEDPRICE_PRICE_MAX", "10000")?;
    let price_window = PriceWindow::new(price_min, price_max)?;

    let min_term_len = parse_usize(
        "MEDPRICE_MIN_TERM_LEN",
        &DEFAULT_MIN_TERM_LEN.to_string(),
    )?;
    let max_retries = parse_u32("MEDPRICE_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("MEDPRICE_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        log_level,
        sources_path,
        fetcher,
        webdriver_url,
        request_timeout_secs,
        user_agent,
        compare_timeout_secs,
        execution_mode,
        inter_request_delay_ms,
        price_window,
        min_term_len,
        max_retries,
        retry_backoff_base_ms,
    })
}

fn parse_fetcher(s: &str) -> Result<FetcherKind, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "http" => Ok(FetcherKind::Http),
        "webdriver" => Ok(FetcherKind::WebDriver),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MEDPRICE_FETCHER".to_string(),
            reason: format!("unknown fetcher \"{other}\"; expected http or webdriver"),
        }),
    }
}

fn parse_execution_mode(s: &str) -> Result<ExecutionMode, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "concurrent" => Ok(ExecutionMode::Concurrent),
        "sequential" => Ok(ExecutionMode::Sequential),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MEDPRICE_EXECUTION_MODE".to_string(),
            reason: format!("unknown mode \"{other}\"; expected concurrent or sequential"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
