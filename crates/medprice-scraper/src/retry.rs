//! Retry with exponential back-off and jitter for page fetches.
//!
//! Only transient failures are retried. A 404 or an empty body will look
//! the same on the next attempt, so those are returned at once.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` if `err` is worth another attempt after a back-off delay.
///
/// Retriable: 429, server-side 5xx, and network-level timeouts or
/// connection failures.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } => true,
        ScraperError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        ScraperError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ScraperError::NotFound { .. }
        | ScraperError::InvalidUrl { .. }
        | ScraperError::Session(_)
        | ScraperError::Render(_)
        | ScraperError::EmptyPage { .. } => false,
    }
}

/// Back-off before retry number `attempt` (1-based), before jitter.
fn base_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_DELAY_MS)
}

/// Final sleep before the next attempt. A server-provided `Retry-After` is a
/// floor under the jittered back-off; both stay under the 30 s cap.
fn next_delay_ms(err: &ScraperError, jittered_ms: u64) -> u64 {
    let floor_ms = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    jittered_ms.max(floor_ms).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt |
/// |---------|---------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter |
/// | 2       | 500 ms × 2¹ ± 25 % jitter |
/// | 3       | 500 ms × 2² ± 25 % jitter |
///
/// A 429 waits at least its `Retry-After` seconds. Delay is capped at 30 s.
/// The caller's overall timeout still bounds the
/// total time spent here.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_delay_ms(backoff_base_ms, attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = next_delay_ms(&err, jittered);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
