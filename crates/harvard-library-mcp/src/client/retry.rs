//! Bounded retry with exponential backoff and jitter.
//!
//! [`RetryPolicy::execute`] is an iterative loop over a per-call
//! [`RetryContext`]: run the attempt, classify the error, compute the next
//! delay, and either sleep or give up. Cancelling the returned future at any
//! suspension point (attempt or backoff sleep) ends the operation.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use crate::config::api;
use crate::error::{ClientError, ClientResult, ErrorKind};

/// Retry and backoff settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per logical operation, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each later one.
    pub base_delay: Duration,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
    /// Total time budget across attempts and delays.
    pub max_elapsed: Duration,
    /// Add up to half the exponential delay as random jitter.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: api::RETRY_MAX_ATTEMPTS,
            base_delay: api::RETRY_BASE_DELAY,
            max_delay: api::RETRY_MAX_DELAY,
            max_elapsed: api::RETRY_MAX_ELAPSED,
            jitter: true,
        }
    }
}

/// Transient state of one logical operation.
#[derive(Debug)]
pub struct RetryContext {
    /// Attempts started so far.
    pub attempt: u32,
    /// When the operation began.
    pub started: Instant,
    /// Kind of the most recent failure.
    pub last_error: Option<ErrorKind>,
}

impl RetryContext {
    fn new() -> Self {
        Self { attempt: 0, started: Instant::now(), last_error: None }
    }

    /// Time spent so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Exponential delay before retry number `attempt` (1-based), without jitter.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1 << exponent).min(self.max_delay)
    }

    /// Delay to wait after failed attempt number `attempt` with error `err`.
    ///
    /// A retry-after hint from the upstream wins when it is longer than the
    /// computed backoff.
    #[must_use]
    pub fn next_delay(&self, attempt: u32, err: &ClientError) -> Duration {
        let exp = self.backoff(attempt);
        let computed = if self.jitter { (exp + jitter(exp)).min(self.max_delay) } else { exp };

        match err.retry_after() {
            Some(hint) => hint.max(computed),
            None => computed,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or the budget runs out.
    ///
    /// Every call to `op` is one upstream attempt and must do its own rate
    /// accounting.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error unchanged, or
    /// [`ClientError::RetriesExhausted`] wrapping the last transient error.
    pub async fn execute<F, Fut, T>(&self, mut op: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut ctx = RetryContext::new();

        loop {
            ctx.attempt += 1;

            let err = match op().await {
                Ok(value) => {
                    if ctx.attempt > 1 {
                        tracing::info!(
                            attempt = ctx.attempt,
                            elapsed_ms = ctx.elapsed().as_millis() as u64,
                            "Upstream call succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            ctx.last_error = Some(err.kind());

            if !err.is_retryable() {
                tracing::debug!(attempt = ctx.attempt, error = %err, "Non-retryable upstream error");
                return Err(err);
            }

            let delay = self.next_delay(ctx.attempt, &err);
            let elapsed = ctx.elapsed();
            let remaining = self.max_elapsed.saturating_sub(elapsed);

            if ctx.attempt >= self.max_attempts || delay > remaining {
                tracing::warn!(
                    attempts = ctx.attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %err,
                    "Retry budget exhausted"
                );
                return Err(ClientError::RetriesExhausted {
                    attempts: ctx.attempt,
                    elapsed,
                    last: Box::new(err),
                });
            }

            tracing::warn!(
                attempt = ctx.attempt,
                delay_ms = delay.as_millis() as u64,
                status = err.status(),
                error = %err,
                "Transient upstream error, backing off"
            );

            tokio::time::sleep(delay).await;
        }
    }
}

/// Uniform jitter in `[0, exp / 2)`.
fn jitter(exp: Duration) -> Duration {
    let half_ms = (exp.as_millis() / 2) as u64;
    if half_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..half_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_elapsed: Duration::from_secs(120),
            jitter: false,
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let p = policy();
        assert_eq!(p.backoff(1), Duration::from_secs(1));
        assert_eq!(p.backoff(2), Duration::from_secs(2));
        assert_eq!(p.backoff(3), Duration::from_secs(4));
        assert_eq!(p.backoff(6), Duration::from_secs(30));
        assert_eq!(p.backoff(60), Duration::from_secs(30));
    }

    #[test]
    fn test_jitter_stays_within_half() {
        let p = RetryPolicy { jitter: true, ..policy() };
        for _ in 0..200 {
            let d = p.next_delay(2, &ClientError::server(503, "x"));
            assert!(d >= Duration::from_secs(2));
            assert!(d < Duration::from_secs(3));
        }
    }

    #[test]
    fn test_retry_after_overrides_smaller_backoff() {
        let p = policy();
        let err = ClientError::rate_limited(Some(2));
        assert_eq!(p.next_delay(1, &err), Duration::from_secs(2));

        let err = ClientError::rate_limited(Some(1));
        assert_eq!(p.next_delay(3, &err), Duration::from_secs(4));
    }

    #[test]
    fn test_huge_retry_after_does_not_overflow() {
        let p = policy();
        let err = ClientError::RateLimited { retry_after: Some(Duration::from_secs(u64::MAX)) };
        assert_eq!(p.next_delay(2, &err), Duration::from_secs(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hint_beyond_budget_exhausts_without_sleeping() {
        let mut calls = 0u32;
        let started = Instant::now();
        let result: ClientResult<()> = policy()
            .execute(|| {
                calls += 1;
                let err = if calls == 1 {
                    ClientError::server(503, "busy")
                } else {
                    ClientError::RateLimited { retry_after: Some(Duration::from_secs(u64::MAX)) }
                };
                async move { Err(err) }
            })
            .await;

        match result {
            Err(ClientError::RetriesExhausted { attempts, last, .. }) => {
                assert_eq!(attempts, 2);
                assert_eq!(last.status(), Some(429));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_millis(1050), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_single_attempt() {
        let mut calls = 0u32;
        let result: ClientResult<()> = policy()
            .execute(|| {
                calls += 1;
                async { Err(ClientError::not_found("x")) }
            })
            .await;

        assert!(matches!(result, Err(ClientError::Rejected { status: 404, .. })));
        assert_eq!(calls, 1);
    }
}
