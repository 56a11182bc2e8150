//! Bounded exponential-backoff retry around a single API call.
//!
//! A call that keeps failing does not raise: once the retry budget is spent
//! the wrapper returns an [`ApiResponse`] holding the last error, with zero
//! time and zero credits, so a fan-out can keep the rest of its batch.

use std::future::Future;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::Instant;

use crate::error::SearchError;

/// Outcome of a retry-wrapped call plus its usage metadata.
#[derive(Debug)]
pub struct ApiResponse {
    /// The payload, or the error from the final attempt.
    pub outcome: Result<Value, SearchError>,
    /// Seconds spent on the successful attempt only. 0.0 on failure.
    pub response_time: f64,
    /// Credits reported in the payload's `usage.credits`. 0 on failure.
    pub credits: u64,
}

impl ApiResponse {
    fn success(data: Value, response_time: f64) -> Self {
        let credits = extract_credits(&data);
        Self {
            outcome: Ok(data),
            response_time,
            credits,
        }
    }

    fn failure(err: SearchError) -> Self {
        Self {
            outcome: Err(err),
            response_time: 0.0,
            credits: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The error message, if every attempt failed.
    pub fn error_message(&self) -> Option<String> {
        self.outcome.as_ref().err().map(ToString::to_string)
    }

    /// The payload, or a `{"results": [], "error": ...}` sentinel on failure.
    pub fn into_data(self) -> Value {
        match self.outcome {
            Ok(data) => data,
            Err(err) => json!({ "results": [], "error": err.to_string() }),
        }
    }
}

/// Read `usage.credits` from a payload, defaulting to 0.
///
/// Whole non-negative floats such as `1.0` are accepted as integers.
pub fn extract_credits(data: &Value) -> u64 {
    data.get("usage")
        .and_then(|usage| usage.get("credits"))
        .and_then(|credits| {
            credits.as_u64().or_else(|| {
                credits
                    .as_f64()
                    .filter(|c| *c >= 0.0 && c.fract() == 0.0 && *c <= u64::MAX as f64)
                    .map(|c| c as u64)
            })
        })
        .unwrap_or(0)
}

/// Delay before retry number `attempt + 1`: `2^attempt` seconds.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Run `call`, retrying up to `max_retries` more times on any error.
///
/// Attempt `n` (starting at 0) that fails is followed by a sleep of
/// [`backoff_delay`]`(n)`. Only the duration of the successful attempt is
/// reported.
pub async fn call_with_retry<F, Fut>(max_retries: u32, mut call: F) -> ApiResponse
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, SearchError>>,
{
    let mut attempt: u32 = 0;
    loop {
        let started = Instant::now();
        match call().await {
            Ok(data) => {
                let elapsed = started.elapsed().as_secs_f64();
                tracing::debug!(attempt, elapsed, "API call succeeded");
                return ApiResponse::success(data, elapsed);
            }
            Err(err) if attempt < max_retries => {
                let wait = backoff_delay(attempt);
                tracing::warn!(
                    attempt,
                    wait_secs = wait.as_secs(),
                    error = %err,
                    "API call failed, retrying"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::warn!(attempts = attempt + 1, error = %err, "API call failed, giving up");
                return ApiResponse::failure(err);
            }
        }
    }
}
