//! Configuration for the Harvard Library MCP server.

use std::time::Duration;

use crate::client::retry::RetryPolicy;
use crate::error::{ClientError, ClientResult};

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Harvard LibraryCloud Item API.
    pub const BASE_URL: &str = "https://api.lib.harvard.edu/v2";

    /// Search endpoint, relative to the base URL.
    pub const SEARCH_ENDPOINT: &str = "search.json";

    /// Record endpoint prefix, relative to the base URL.
    pub const ITEMS_ENDPOINT: &str = "items";

    /// Per-attempt request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Sustained request rate ceiling.
    pub const REQUESTS_PER_SECOND: u32 = 10;

    /// Requests allowed immediately after an idle period.
    pub const BURST_SIZE: u32 = 20;

    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Largest page size ever requested upstream.
    pub const MAX_LIMIT: u32 = 100;

    /// First retry delay.
    pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

    /// Ceiling on any single retry delay.
    pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

    /// Attempts per logical operation, including the first.
    pub const RETRY_MAX_ATTEMPTS: u32 = 4;

    /// Total time budget for one logical operation, attempts and delays included.
    pub const RETRY_MAX_ELAPSED: Duration = Duration::from_secs(60);

    /// Largest Retry-After hint taken at face value, in seconds.
    pub const RETRY_AFTER_CAP_SECS: u64 = 3600;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// User agent sent with every request.
    pub const USER_AGENT: &str = concat!("harvard-library-mcp/", env!("CARGO_PKG_VERSION"));
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the catalog API (overridable for mock servers).
    pub base_url: String,

    /// User agent header.
    pub user_agent: String,

    /// Per-attempt request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Sustained requests per second.
    pub requests_per_second: u32,

    /// Burst ceiling.
    pub burst_size: u32,

    /// Page size used when the caller gives none.
    pub default_limit: u32,

    /// Page size clamp.
    pub max_limit: u32,

    /// Retry and backoff policy.
    pub retry: RetryPolicy,
}

impl Config {
    /// Create a configuration with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            user_agent: api::USER_AGENT.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            requests_per_second: api::REQUESTS_PER_SECOND,
            burst_size: api::BURST_SIZE,
            default_limit: api::DEFAULT_LIMIT,
            max_limit: api::MAX_LIMIT,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a test configuration pointed at a mock server.
    ///
    /// The rate budget is generous and backoff delays are in milliseconds
    /// so retry paths run quickly.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            requests_per_second: 1000,
            burst_size: 1000,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(5),
                max_delay: Duration::from_millis(50),
                max_elapsed: Duration::from_secs(10),
                jitter: false,
            },
            ..Self::new()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed, or the result is invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Ok(url) = std::env::var("HARVARD_API_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(agent) = std::env::var("HARVARD_API_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = env_parse::<u64>("HARVARD_API_TIMEOUT")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(rps) = env_parse::<u32>("RATE_LIMIT_REQUESTS_PER_SECOND")? {
            config.requests_per_second = rps;
        }
        if let Some(burst) = env_parse::<u32>("RATE_LIMIT_BURST_SIZE")? {
            config.burst_size = burst;
        }
        if let Some(max) = env_parse::<u32>("MAX_RESULTS_LIMIT")? {
            config.max_limit = max;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the client cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first bad setting.
    pub fn validate(&self) -> ClientResult<()> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ClientError::validation("base_url", "not a valid absolute URL"));
        }
        if self.requests_per_second == 0 {
            return Err(ClientError::validation("requests_per_second", "must be at least 1"));
        }
        if self.burst_size == 0 {
            return Err(ClientError::validation("burst_size", "must be at least 1"));
        }
        if self.max_limit == 0 {
            return Err(ClientError::validation("max_limit", "must be at least 1"));
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::validation("request_timeout", "must be non-zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ClientError::validation("retry.max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{name}={raw:?} is invalid: {e}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_are_contractual() {
        let config = Config::default();
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.burst_size, 20);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.base_url, api::BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_testing_strips_trailing_slash() {
        let config = Config::for_testing("http://127.0.0.1:9000/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_rate() {
        let config = Config { requests_per_second: 0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { burst_size: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let config = Config { base_url: "api.lib.harvard.edu".to_string(), ..Config::default() };
        assert!(config.validate().is_err());
    }
}
