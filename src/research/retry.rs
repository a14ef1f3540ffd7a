//! Exponential backoff around fallible agent calls.
//!
//! [`retry_with_backoff`] never propagates the operation's error: after
//! the last attempt fails it returns `None`, which callers treat as
//! "this step produced nothing".

use std::future::Future;
use std::time::Duration;

use crate::error::AgentError;

/// Default upper bound on a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Default growth factor between consecutive delays.
pub const DEFAULT_EXPONENTIAL_BASE: f64 = 2.0;

/// Attempt budget and delay curve for one call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per failed attempt.
    pub exponential_base: f64,
}

impl RetryPolicy {
    /// Planning: 3 attempts starting at 1s.
    pub const PLANNING: Self = Self::new(3, Duration::from_secs(1));

    /// Per-search: 2 attempts starting at 500ms. Individual search failures
    /// are tolerated by the fan-out, so fewer retries are spent here.
    pub const SEARCH: Self = Self::new(2, Duration::from_millis(500));

    /// Writing: 3 attempts starting at 1s.
    pub const WRITING: Self = Self::new(3, Duration::from_secs(1));

    /// Creates a policy with the default cap and growth factor.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay: DEFAULT_MAX_DELAY,
            exponential_base: DEFAULT_EXPONENTIAL_BASE,
        }
    }

    /// Overrides the delay cap.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Overrides the growth factor.
    #[must_use]
    pub const fn with_exponential_base(mut self, base: f64) -> Self {
        self.exponential_base = base;
        self
    }

    /// Delay to wait after the given failed attempt (1-indexed).
    ///
    /// `min(base_delay * exponential_base^(attempt - 1), max_delay)`
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.exponential_base.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }
}

/// Runs `operation` until it succeeds or the policy's attempts run out.
///
/// Sleeps [`RetryPolicy::delay_for`] between attempts but never after the
/// final one. Every failure is logged with its attempt index and error
/// kind; exhaustion is logged once more and yields `None`.
pub async fn retry_with_backoff<T, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AgentError>>,
{
    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation = label, attempt, "succeeded after retry");
                }
                return Some(value);
            }
            Err(e) => {
                tracing::warn!(
                    operation = label,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error_kind = e.kind(),
                    error = %e,
                    "attempt failed"
                );
                if attempt < policy.max_attempts {
                    let delay = policy.delay_for(attempt);
                    tracing::debug!(
                        operation = label,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    tracing::error!(
        operation = label,
        max_attempts = policy.max_attempts,
        "all attempts exhausted"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    type Attempt = std::future::Ready<Result<&'static str, AgentError>>;

    fn flaky(failures: u32, calls: &Arc<AtomicU32>) -> impl FnMut() -> Attempt {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n <= failures {
                Err(AgentError::ApiRequest {
                    message: format!("failure {n}"),
                    status: Some(500),
                })
            } else {
                Ok("done")
            })
        }
    }

    #[test]
    fn test_delay_curve() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(10));
    }

    #[test]
    fn test_delay_never_overflows() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1));
        assert_eq!(policy.delay_for(u32::MAX), DEFAULT_MAX_DELAY);
    }

    #[test]
    fn test_presets() {
        assert_eq!(RetryPolicy::PLANNING.max_attempts, 3);
        assert_eq!(RetryPolicy::SEARCH.max_attempts, 2);
        assert_eq!(RetryPolicy::SEARCH.base_delay, Duration::from_millis(500));
        assert_eq!(RetryPolicy::WRITING.base_delay, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let policy = RetryPolicy::new(3, Duration::from_secs(1));

        let result = retry_with_backoff("test", &policy, flaky(2, &calls)).await;

        assert_eq!(result, Some("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // slept 1s + 2s between the three attempts
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_none() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let policy = RetryPolicy::new(2, Duration::from_secs(1));

        let result = retry_with_backoff("test", &policy, flaky(2, &calls)).await;

        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // no sleep after the final attempt
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1100));
    }

    #[tokio::test]
    async fn test_first_attempt_success_does_not_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = retry_with_backoff("test", &RetryPolicy::SEARCH, flaky(0, &calls)).await;
        assert_eq!(result, Some("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_never_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let result = retry_with_backoff("test", &policy, flaky(0, &calls)).await;
        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
