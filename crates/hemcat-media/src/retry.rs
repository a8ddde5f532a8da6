//! Retry with exponential back-off for media-store requests.
//!
//! Transient failures (timeouts, dropped connections, 429, 5xx) are retried a
//! bounded number of times. Everything else, notably 404, is returned on the
//! first attempt so a missing image costs one request.

use std::future::Future;
use std::time::Duration;

use crate::error::MediaError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`MediaError::Http`] for timeouts, connect failures and 5xx.
/// - [`MediaError::RateLimited`]: HTTP 429.
/// - [`MediaError::UnexpectedStatus`] with a 5xx status.
///
/// **Not retriable:** 404, other 4xx, malformed bodies, missing credentials,
/// pagination guard, invalid URLs.
pub(crate) fn is_retriable(err: &MediaError) -> bool {
    match err {
        MediaError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        MediaError::RateLimited { .. } => true,
        MediaError::UnexpectedStatus { status, .. } => *status >= 500,
        MediaError::Deserialize { .. }
        | MediaError::NotFound { .. }
        | MediaError::PaginationLimit { .. }
        | MediaError::MissingCredentials(_)
        | MediaError::InvalidUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt   |
/// |---------|-----------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter   |
/// | 2       | 500 ms × 2¹ ± 25 % jitter   |
///
/// Delay is capped at 30 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, MediaError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MediaError>>,
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
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient media-store error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
