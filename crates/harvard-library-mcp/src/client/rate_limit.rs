//! Process-wide outbound request budget.
//!
//! A token bucket over `governor`: tokens refill continuously at the
//! configured rate up to the burst ceiling, and every upstream attempt
//! debits exactly one.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// Shared token bucket gating every outbound request.
///
/// Construct one per process and hand it to each [`CatalogClient`](super::CatalogClient)
/// as an `Arc<RateBudget>`.
pub struct RateBudget {
    limiter: DefaultDirectRateLimiter,
    requests_per_second: NonZeroU32,
    burst_size: NonZeroU32,
}

impl RateBudget {
    /// Create a budget allowing `requests_per_second` sustained and `burst_size` at once.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either value is zero.
    pub fn new(requests_per_second: u32, burst_size: u32) -> ClientResult<Self> {
        let rps = NonZeroU32::new(requests_per_second)
            .ok_or_else(|| ClientError::validation("requests_per_second", "must be at least 1"))?;
        let burst = NonZeroU32::new(burst_size)
            .ok_or_else(|| ClientError::validation("burst_size", "must be at least 1"))?;

        let quota = Quota::per_second(rps).allow_burst(burst);

        tracing::debug!(
            requests_per_second = rps.get(),
            burst_size = burst.get(),
            "Rate budget initialized"
        );

        Ok(Self { limiter: RateLimiter::direct(quota), requests_per_second: rps, burst_size: burst })
    }

    /// Create a budget from the rate settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured rate or burst is zero.
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(config.requests_per_second, config.burst_size)
    }

    /// Wait until one request is permitted, then consume its token.
    ///
    /// The wait suspends rather than spins. Dropping the returned future
    /// before it resolves abandons the wait without consuming a token.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Like [`acquire`](Self::acquire), but give up after `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] if no token became available in time.
    /// No token is consumed in that case.
    pub async fn acquire_within(&self, deadline: Duration) -> ClientResult<()> {
        tokio::time::timeout(deadline, self.acquire()).await.map_err(|_| {
            tracing::debug!(deadline_ms = deadline.as_millis() as u64, "Rate budget wait abandoned");
            ClientError::Cancelled
        })
    }

    /// Consume a token only if one is available right now.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Sustained rate ceiling.
    #[must_use]
    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second.get()
    }

    /// Burst ceiling.
    #[must_use]
    pub fn burst_size(&self) -> u32 {
        self.burst_size.get()
    }
}

impl std::fmt::Debug for RateBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateBudget")
            .field("requests_per_second", &self.requests_per_second)
            .field("burst_size", &self.burst_size)
            .finish()
    }
}
