//! Harvard Library catalog API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - A shared token-bucket budget applied to every attempt through middleware
//! - Bounded retry with exponential backoff and jitter
//! - Normalization of JSON and MODS XML bodies into [`CatalogRecord`]s

mod middleware;
pub mod rate_limit;
pub mod retry;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use url::Url;

pub use self::middleware::RateLimitMiddleware;
pub use self::rate_limit::RateBudget;
pub use self::retry::{RetryContext, RetryPolicy};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{CatalogQuery, CatalogRecord, RecordFormat, SearchResult, validate_record_id};
use crate::normalize::{self, Payload, PayloadKind};

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 300;

/// Body and declared content type of one successful response.
#[derive(Debug)]
struct RawBody {
    body: String,
    content_type: Option<String>,
}

/// Harvard Library catalog client.
#[derive(Clone)]
pub struct CatalogClient {
    /// HTTP client with the rate-limit middleware.
    http: ClientWithMiddleware,

    /// Shared request budget.
    budget: Arc<RateBudget>,

    /// API root without trailing slash.
    base_url: String,

    retry: RetryPolicy,
    request_timeout: Duration,
    default_limit: u32,
    max_limit: u32,
}

impl CatalogClient {
    /// Create a client with its own rate budget.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let budget = Arc::new(RateBudget::from_config(&config)?);
        Self::with_budget(config, budget)
    }

    /// Create a client that draws on an existing budget.
    ///
    /// Every client sharing `budget` is held to one combined rate.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or HTTP client initialization fails.
    pub fn with_budget(config: Config, budget: Arc<RateBudget>) -> anyhow::Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, application/xml;q=0.9"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let http = ClientBuilder::new(client)
            .with(RateLimitMiddleware::new(Arc::clone(&budget)))
            .build();

        Ok(Self {
            http,
            budget,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
            request_timeout: config.request_timeout,
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        })
    }

    /// The shared request budget.
    #[must_use]
    pub fn budget(&self) -> &Arc<RateBudget> {
        &self.budget
    }

    /// API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upstream URL and parameters for a search. Same query, same request.
    #[must_use]
    pub fn search_request(&self, query: &CatalogQuery) -> (String, Vec<(String, String)>) {
        let url = format!("{}/{}", self.base_url, api::SEARCH_ENDPOINT);
        (url, query.to_params(self.default_limit, self.max_limit))
    }

    /// Upstream URL for one record. `id` must already be validated.
    #[must_use]
    pub fn record_url(&self, id: &str, format: RecordFormat) -> String {
        format!("{}/{}/{}.{}", self.base_url, api::ITEMS_ENDPOINT, id, format.extension())
    }

    /// Run a search.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty query (no request is made),
    /// or any upstream, retry or parse error.
    pub async fn search(&self, query: &CatalogQuery) -> ClientResult<SearchResult> {
        if query.field_count() == 0 {
            return Err(ClientError::validation("query", "at least one search field must be set"));
        }

        let (url, params) = self.search_request(query);
        let limit = query.effective_limit(self.default_limit, self.max_limit);

        let mut diagnostics = Vec::new();
        if let Some(requested) = query.limit().filter(|l| *l > limit) {
            diagnostics.push(format!("limit {requested} clamped to {limit}"));
        }

        tracing::debug!(url = %url, fields = query.field_count(), limit, offset = query.offset(), "Catalog search");

        let raw = self.fetch(&url, &params).await?;
        let payload = Payload::new(&raw.body, raw.content_type.as_deref(), PayloadKind::Json)?;
        let page = normalize::normalize_search(payload)?;
        diagnostics.extend(page.diagnostics);

        let has_more = SearchResult::more_after(query.offset(), page.records.len(), page.total_count);

        Ok(SearchResult {
            records: page.records,
            total_count: page.total_count,
            limit,
            offset: query.offset(),
            has_more,
            filters_applied: query.applied_filters(),
            diagnostics,
        })
    }

    /// Fetch one record through the JSON endpoint.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed id (no request is made),
    /// or any upstream, retry or parse error.
    pub async fn get_record(&self, id: &str) -> ClientResult<CatalogRecord> {
        self.get_record_as(id, RecordFormat::Json).await
    }

    /// Fetch one record through the chosen representation.
    ///
    /// A JSON body that only references its MODS document gets that document
    /// fetched too, through the same rate-limited and retried path. If that
    /// second fetch fails the record is returned with a diagnostic.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed id (no request is made),
    /// or any upstream, retry or parse error on the primary fetch.
    pub async fn get_record_as(&self, id: &str, format: RecordFormat) -> ClientResult<CatalogRecord> {
        let id = validate_record_id(id)?;
        let url = self.record_url(id, format);

        tracing::debug!(url = %url, "Catalog record fetch");

        let fallback = match format {
            RecordFormat::Json => PayloadKind::Json,
            RecordFormat::Mods => PayloadKind::Mods,
        };
        let raw = self.fetch(&url, &[]).await?;
        let draft = normalize::normalize_record(Payload::new(&raw.body, raw.content_type.as_deref(), fallback)?)?;

        let mut record = draft.record;
        if let Some(mods_url) = draft.mods_ref {
            self.resolve_mods(&mut record, &mods_url).await;
        }
        if record.id.is_empty() || record.id.starts_with("sha256:") {
            record.id = id.to_string();
        }
        Ok(record)
    }

    async fn resolve_mods(&self, record: &mut CatalogRecord, reference: &str) {
        let url = match self.resolve_reference(reference) {
            Ok(url) => url,
            Err(note) => {
                tracing::warn!(reference, "MODS reference not followed: {note}");
                record.diagnostics.push(format!("MODS reference {reference} not followed: {note}"));
                return;
            }
        };

        match self.fetch(url.as_str(), &[]).await {
            Ok(raw) => match normalize::mods::record_from_xml(&raw.body) {
                Ok(parsed) => normalize::json::merge_inline_mods(record, parsed),
                Err(e) => record.diagnostics.push(format!("referenced MODS unreadable: {e}")),
            },
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Referenced MODS fetch failed");
                record.diagnostics.push(format!("referenced MODS not fetched: {e}"));
            }
        }
    }

    /// Resolve a MODS reference against the API root, refusing other hosts.
    fn resolve_reference(&self, reference: &str) -> Result<Url, String> {
        let base = Url::parse(&format!("{}/", self.base_url)).map_err(|e| e.to_string())?;
        let url = base.join(reference).map_err(|e| e.to_string())?;
        if url.host_str() != base.host_str() || url.port_or_known_default() != base.port_or_known_default() {
            return Err(format!("host {} is not the catalog API host", url.host_str().unwrap_or("?")));
        }
        Ok(url)
    }

    /// One logical GET: retried, each attempt rate-limited by the middleware.
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> ClientResult<RawBody> {
        self.retry.execute(|| self.fetch_once(url, params)).await
    }

    async fn fetch_once(&self, url: &str, params: &[(String, String)]) -> ClientResult<RawBody> {
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.classify(e.into()))?;

        let response = self.handle_response(response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| self.classify(ClientError::Transport(e)))?;

        Ok(RawBody { body, content_type })
    }

    fn classify(&self, err: ClientError) -> ClientError {
        match err {
            ClientError::Transport(e) if e.is_timeout() => ClientError::Timeout(self.request_timeout),
            other => other,
        }
    }

    /// Handle API response status codes.
    async fn handle_response(&self, response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        tracing::debug!(status = status.as_u16(), url = %response.url(), "Upstream error status");

        match status.as_u16() {
            429 => {
                let retry_after =
                    response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()).and_then(parse_retry_after);

                Err(ClientError::rate_limited(retry_after))
            }
            code @ 500..=599 => Err(ClientError::server(code, error_body(response).await)),
            404 => {
                let url = response.url().path().to_string();
                Err(ClientError::not_found(url))
            }
            code => Err(ClientError::rejected(code, error_body(response).await)),
        }
    }
}

/// Seconds to wait from a `Retry-After` value, either delta-seconds or an
/// HTTP date. Capped at [`api::RETRY_AFTER_CAP_SECS`]; a date in the past
/// means no wait.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<u64> {
    let value = value.trim();
    let secs = match value.parse::<u64>() {
        Ok(secs) => secs,
        Err(_) => {
            let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
            let wait = at.signed_duration_since(Utc::now());
            // Round partial seconds up so the hint is never undershot.
            let secs = wait.num_seconds() + i64::from(wait.subsec_nanos() > 0);
            u64::try_from(secs).unwrap_or(0)
        }
    };
    Some(secs.min(api::RETRY_AFTER_CAP_SECS))
}

async fn error_body(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    let text = text.trim();
    if text.len() <= MAX_ERROR_BODY {
        return text.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Run `fut` under a caller deadline.
///
/// Expiry drops the operation wherever it is suspended (waiting on the rate
/// budget, in flight, or backing off) and reports [`ClientError::Cancelled`].
/// A token is only spent once its wait has completed.
///
/// # Errors
///
/// Returns [`ClientError::Cancelled`] on expiry, otherwise whatever `fut` returns.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(deadline_ms = deadline.as_millis() as u64, "Caller deadline fired");
            Err(ClientError::Cancelled)
        }
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .field("budget", &self.budget)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryField;

    fn client() -> CatalogClient {
        CatalogClient::new(Config::for_testing("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn test_parse_retry_after_forms() {
        assert_eq!(parse_retry_after(" 7 "), Some(7));
        assert_eq!(parse_retry_after("18446744073709551615"), Some(api::RETRY_AFTER_CAP_SECS));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), Some(0));
        assert_eq!(parse_retry_after("soon"), None);

        let later = (Utc::now() + chrono::TimeDelta::seconds(120)).format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let secs = parse_retry_after(&later).unwrap();
        assert!((119..=121).contains(&secs), "got {secs}");
    }

    #[test]
    fn test_search_request_is_deterministic() {
        let c = client();
        let q = CatalogQuery::builder()
            .field(QueryField::Title, "Leaves of grass")
            .field(QueryField::Author, "Whitman")
            .build()
            .unwrap();

        let (url, params) = c.search_request(&q);
        assert_eq!(url, "http://127.0.0.1:9/search.json");
        assert_eq!(c.search_request(&q), (url, params));
    }

    #[test]
    fn test_record_url() {
        let c = client();
        assert_eq!(c.record_url("990001", RecordFormat::Json), "http://127.0.0.1:9/items/990001.json");
        assert_eq!(c.record_url("990001", RecordFormat::Mods), "http://127.0.0.1:9/items/990001.xml");
    }

    #[test]
    fn test_foreign_mods_reference_refused() {
        let c = client();
        assert!(c.resolve_reference("items/1.xml").is_ok());
        assert!(c.resolve_reference("http://127.0.0.1:9/items/1.xml").is_ok());
        assert!(c.resolve_reference("http://evil.example/items/1.xml").is_err());
    }

    #[tokio::test]
    async fn test_with_deadline_cancels() {
        let result: ClientResult<()> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }
}
