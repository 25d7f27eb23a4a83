//! Error types for the Harvard Library MCP server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Every client error maps onto one [`ErrorKind`], which is what callers see.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Caller-visible error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed caller input. Never sent upstream.
    Validation,
    /// Network failure, timeout, HTTP 429 or 5xx.
    TransientUpstream,
    /// HTTP 4xx other than 429.
    UpstreamRejected,
    /// Response body could not be parsed at all.
    TotalParse,
    /// Caller deadline fired while waiting or in flight.
    Cancellation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::TransientUpstream => "transient_upstream",
            Self::UpstreamRejected => "upstream_rejected",
            Self::TotalParse => "total_parse",
            Self::Cancellation => "cancellation",
        };
        f.write_str(s)
    }
}

/// Errors from the catalog client and normalizer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Invalid caller input, rejected before any request is built.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Offending input field
        field: String,
        /// What was wrong with it
        message: String,
    },

    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(reqwest_middleware::Error),

    /// Single attempt exceeded the per-attempt timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Throttled by the catalog API (429 response)
    #[error("Rate limited by catalog API{}", retry_hint(.retry_after))]
    RateLimited {
        /// Retry-After hint, when the response carried one
        retry_after: Option<Duration>,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Request rejected by the catalog API (4xx other than 429)
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Response body could not be parsed at all
    #[error("Failed to parse {content_type} response: {message}")]
    Parse {
        /// Declared content type of the body
        content_type: String,
        /// Parser error message
        message: String,
    },

    /// Caller deadline fired
    #[error("Operation cancelled: deadline exceeded")]
    Cancelled,

    /// Retry budget exhausted; wraps the last transient error
    #[error("Gave up after {attempts} attempts in {elapsed:?}: {last}")]
    RetriesExhausted {
        /// Attempts made, including the first
        attempts: u32,
        /// Time spent across all attempts and delays
        elapsed: Duration,
        /// Error from the final attempt
        last: Box<ClientError>,
    },
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    retry_after.map(|d| format!(", retry after {d:?}")).unwrap_or_default()
}

impl From<reqwest_middleware::Error> for ClientError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => Self::Transport(e),
            other => Self::Middleware(other),
        }
    }
}

impl ClientError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create a rate limited error with an optional retry-after in seconds.
    #[must_use]
    pub fn rate_limited(seconds: Option<u64>) -> Self {
        Self::RateLimited { retry_after: seconds.map(Duration::from_secs) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::Rejected { status: 404, message: format!("not found: {}", resource.into()) }
    }

    /// Create a rejected-request error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected { status, message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Create a total parse failure.
    #[must_use]
    pub fn parse(content_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse { content_type: content_type.into(), message: message.into() }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Transport(_)
            | Self::Middleware(_)
            | Self::Timeout(_)
            | Self::RateLimited { .. }
            | Self::Server { .. }
            | Self::RetriesExhausted { .. } => ErrorKind::TransientUpstream,
            Self::Rejected { .. } => ErrorKind::UpstreamRejected,
            Self::Parse { .. } => ErrorKind::TotalParse,
            Self::Cancelled => ErrorKind::Cancellation,
        }
    }

    /// Upstream HTTP status, where one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Server { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Returns true if another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. } => true,
            Self::Transport(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from the API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal tool logic error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Error classification, if this error maps onto one.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Client(e) => Some(e.kind()),
            // Malformed tool arguments are caller input errors too.
            Self::Validation { .. } | Self::Serialization(_) => Some(ErrorKind::Validation),
            Self::Internal(_) => None,
        }
    }

    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::RateLimited { retry_after: Some(d) }) => {
                format!("Rate limited by the Harvard Library API. Please wait {d:?} before retrying.")
            }
            Self::Client(ClientError::Rejected { status: 404, message }) => {
                format!("{message}. Please check the record ID is correct.")
            }
            Self::Client(ClientError::Validation { field, message })
            | Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }

    /// Structured form placed in the JSON-RPC error `data` member.
    #[must_use]
    pub fn to_structured(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "kind": self.kind().map_or_else(|| "internal".to_string(), |k| k.to_string()),
            "message": self.to_user_message(),
        });
        if let Self::Client(e) = self {
            if let Some(status) = e.status() {
                obj["status"] = serde_json::json!(status);
            }
        }
        obj
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::rate_limited(Some(60)).is_retryable());
        assert!(ClientError::rate_limited(None).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(10)).is_retryable());
        assert!(ClientError::server(503, "Unavailable").is_retryable());

        assert!(!ClientError::not_found("990001").is_retryable());
        assert!(!ClientError::rejected(400, "bad query").is_retryable());
        assert!(!ClientError::validation("query", "empty").is_retryable());
        assert!(!ClientError::parse("application/xml", "eof").is_retryable());
        assert!(!ClientError::Cancelled.is_retryable());
    }

    #[test]
    fn test_client_error_kinds() {
        assert_eq!(ClientError::validation("id", "bad").kind(), ErrorKind::Validation);
        assert_eq!(ClientError::rate_limited(None).kind(), ErrorKind::TransientUpstream);
        assert_eq!(ClientError::server(500, "x").kind(), ErrorKind::TransientUpstream);
        assert_eq!(ClientError::not_found("x").kind(), ErrorKind::UpstreamRejected);
        assert_eq!(ClientError::parse("text/xml", "x").kind(), ErrorKind::TotalParse);
        assert_eq!(ClientError::Cancelled.kind(), ErrorKind::Cancellation);
    }

    #[test]
    fn test_retries_exhausted_keeps_last_status() {
        let err = ClientError::RetriesExhausted {
            attempts: 4,
            elapsed: Duration::from_secs(7),
            last: Box::new(ClientError::server(502, "Bad Gateway")),
        };
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.kind(), ErrorKind::TransientUpstream);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("4 attempts"));
    }

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(Some(2));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
        assert!(err.to_string().contains("retry after"));

        assert_eq!(ClientError::rate_limited(None).retry_after(), None);
        assert_eq!(ClientError::not_found("record").retry_after(), None);
    }

    #[test]
    fn test_tool_error_structured() {
        let err = ToolError::Client(ClientError::rejected(400, "bad request"));
        let value = err.to_structured();
        assert_eq!(value["kind"], "upstream_rejected");
        assert_eq!(value["status"], 400);

        let err = ToolError::validation("start_date", "must not be after end_date");
        let value = err.to_structured();
        assert_eq!(value["kind"], "validation");
        assert!(value.get("status").is_none());
        assert!(value["message"].as_str().unwrap().contains("start_date"));
    }
}
