//! Error types for content API access.

use std::time::Duration;

/// Error from a single content API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response (connection failure, timeout, etc).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Server asked us to slow down (HTTP 429).
    #[error("rate limited by content API")]
    RateLimited {
        /// Delay requested by the server, if any.
        retry_after: Option<Duration>,
    },

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Response body could not be decoded.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether repeating the same request may succeed.
    ///
    /// Rate limits, transport failures, request timeouts and server-side
    /// errors are transient. Client errors and undecodable bodies are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status == 408 || *status >= 500,
            Self::Json(_) => false,
        }
    }

    /// Server-provided minimum delay before retrying.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// A request failed for good, either on a permanent error or after
/// exhausting the retry budget.
///
/// Carries the node and cursor the request was made for, so a failed build
/// points at the part of the tree that could not be read.
#[derive(Debug, thiserror::Error)]
#[error(
    "failed to fetch node {node_id} (cursor: {}) after {attempts} attempt(s)",
    .cursor.as_deref().unwrap_or("start")
)]
pub struct FetchError {
    /// Node whose data was being requested.
    pub node_id: String,
    /// Pagination cursor of the failing request (`None` for the first page).
    pub cursor: Option<String>,
    /// Number of requests made, including the failing one.
    pub attempts: u32,
    /// Error returned by the last attempt.
    #[source]
    pub source: ApiError,
}
