//! Retry/backoff/timeout/cancellation protocol for outbound calls.
//!
//! Every external call runs through `call_with_retry`: a per-attempt
//! timeout, exponential backoff between attempts (doubling from the base
//! delay, capped), a fixed attempt ceiling, and a cancellation token
//! checked at every suspension point. Exactly one terminal outcome per
//! invocation; timers are dropped with the call.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Service returned status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        retryable: bool,
    },

    /// Response arrived but does not match the expected schema.
    #[error("Malformed response: {0}")]
    Shape(String),

    #[error("Call cancelled")]
    Cancelled,
}

impl CallError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        CallError::Status {
            status,
            message: message.into(),
            retryable: status == 429 || (500..600).contains(&status),
        }
    }

    /// Timeouts, network failures, 429 and 5xx retry; everything else is
    /// terminal on first sight. Cancellation is never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            CallError::Timeout(_) => true,
            CallError::Network(_) => true,
            CallError::Status { retryable, .. } => *retryable,
            CallError::Shape(_) => false,
            CallError::Cancelled => false,
        }
    }
}

/// Backoff and ceiling configuration for one endpoint.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Budget for a single attempt, not the whole call.
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            attempt_timeout,
        }
    }

    /// Delay before retry number `retry` (0-based): base, 2x, 4x... capped.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Per-invocation retry bookkeeping; discarded on return.
struct RetryState {
    attempt: u32,
    max_attempts: u32,
    last_error: Option<CallError>,
}

/// Drives `attempt_fn` to a single terminal outcome under `policy`.
///
/// The token aborts the in-flight attempt and any pending backoff sleep
/// immediately, surfacing `CallError::Cancelled`.
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    operation: &str,
    mut attempt_fn: F,
) -> Result<T, CallError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CallError>>,
{
    let mut state = RetryState {
        attempt: 0,
        max_attempts: policy.max_attempts,
        last_error: None,
    };

    while state.attempt < state.max_attempts {
        if state.attempt > 0 {
            let delay = policy.delay_for_retry(state.attempt - 1);
            warn!(
                "{operation}: attempt {}/{} failed, retrying in {}ms",
                state.attempt,
                state.max_attempts,
                delay.as_millis()
            );
            tokio::select! {
                _ = token.cancelled() => return Err(CallError::Cancelled),
                _ = sleep(delay) => {}
            }
        }
        state.attempt += 1;

        if token.is_cancelled() {
            return Err(CallError::Cancelled);
        }

        let outcome = tokio::select! {
            _ = token.cancelled() => return Err(CallError::Cancelled),
            result = timeout(policy.attempt_timeout, attempt_fn()) => match result {
                Ok(inner) => inner,
                Err(_) => Err(CallError::Timeout(policy.attempt_timeout)),
            },
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(CallError::Cancelled) => return Err(CallError::Cancelled),
            Err(e) if e.is_retryable() => state.last_error = Some(e),
            Err(e) => return Err(e),
        }
    }

    Err(state
        .last_error
        .unwrap_or_else(|| CallError::status(503, "retries exhausted")))
}
