//! Bounded retry with exponential backoff for HTTP calls.

use std::future::Future;
use std::time::Duration;

use crate::error::{RagError, Result};

const BASE_BACKOFF_SECS: u64 = 1;
/// Shift cap keeping `BASE_BACKOFF_SECS << attempt` well inside u64.
const MAX_BACKOFF_SHIFT: u32 = 16;

/// Exponential backoff, capped so arbitrarily large attempt counts
/// cannot overflow the shift.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(BASE_BACKOFF_SECS << attempt.min(MAX_BACKOFF_SHIFT))
}

/// Parse the `Retry-After` header as seconds, falling back to exponential backoff.
fn retry_delay(response: &reqwest::Response, attempt: u32) -> Duration {
    if let Some(secs) = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
    {
        return Duration::from_secs(secs);
    }
    backoff_delay(attempt)
}

fn is_transient(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Send an HTTP request, retrying up to `max_retries` times on 429 and 5xx.
///
/// `f` builds and sends the request; `err` wraps a failure message into the
/// caller's error variant. Non-transient statuses are returned to the caller
/// for its own error-body handling.
pub(crate) async fn send_with_retry<F, Fut, E>(
    max_retries: u32,
    mut f: F,
    err: E,
) -> Result<reqwest::Response>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<reqwest::Response, reqwest::Error>>,
    E: Fn(String) -> RagError,
{
    let mut last_status = None;
    for attempt in 0..=max_retries {
        let response = f().await.map_err(|e| err(format!("request failed: {e}")))?;
        let status = response.status();

        if is_transient(status) && attempt < max_retries {
            let delay = retry_delay(&response, attempt);
            tracing::warn!(
                %status,
                attempt = attempt + 1,
                max_retries,
                delay_secs = delay.as_secs(),
                "transient API failure, retrying"
            );
            tokio::time::sleep(delay).await;
            last_status = Some(status);
            continue;
        }

        return Ok(response);
    }

    // Unreachable in practice: the final iteration always returns.
    Err(err(format!(
        "retries exhausted after {max_retries} attempts (last status: {:?})",
        last_status
    )))
}
