//! Exponential backoff for transient payload fetch failures.

use std::future::Future;
use std::time::Duration;

use crate::error::LoadError;

/// Network failures, HTTP 429, and HTTP 5xx are worth another attempt;
/// everything else (4xx, file errors, bad JSON) is not.
fn is_retriable(err: &LoadError) -> bool {
    match err {
        LoadError::Http(_) => true,
        LoadError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        LoadError::Io { .. }
        | LoadError::Write { .. }
        | LoadError::Deserialize { .. }
        | LoadError::Serialize { .. } => false,
    }
}

/// Runs `operation`, sleeping `backoff_base_secs * 2^attempt` seconds between
/// attempts, for at most `max_retries` retries after the first try.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, LoadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LoadError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient load error; retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
