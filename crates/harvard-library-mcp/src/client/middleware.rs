//! Middleware for the HTTP client.
//!
//! [`RateLimitMiddleware`] sits in the `reqwest_middleware` stack so every
//! request that leaves the client, retries included, first takes a token
//! from the shared [`RateBudget`].

use std::sync::Arc;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};

use super::rate_limit::RateBudget;

/// Debits one token from the shared budget before each outbound request.
#[derive(Debug, Clone)]
pub struct RateLimitMiddleware {
    budget: Arc<RateBudget>,
}

impl RateLimitMiddleware {
    /// Wrap a shared budget.
    #[must_use]
    pub fn new(budget: Arc<RateBudget>) -> Self {
        Self { budget }
    }
}

#[async_trait::async_trait]
impl Middleware for RateLimitMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        self.budget.acquire().await;
        tracing::debug!(method = %req.method(), url = %req.url(), "Dispatching upstream request");
        next.run(req, extensions).await
    }
}
