//! HTTP content API client.
//!
//! Sync client for a Notion-style REST API authenticated with a bearer token.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info};
use ureq::Agent;
use ureq::http::Response;

use crate::api::ContentApi;
use crate::error::ApiError;
use crate::types::{ChildrenPage, RawPage};

/// Default HTTP timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Content API client over HTTP.
pub struct HttpContentApi {
    agent: Agent,
    base_url: String,
    token: String,
    api_version: String,
}

impl HttpContentApi {
    /// Create a client.
    ///
    /// # Arguments
    /// * `base_url` - API base URL, e.g. `https://api.notion.com`
    /// * `token` - Integration token sent as a bearer token
    /// * `api_version` - Value of the `Notion-Version` header
    /// * `timeout` - Per-request timeout, `None` for the default
    #[must_use]
    pub fn new(base_url: &str, token: &str, api_version: &str, timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout.unwrap_or(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            api_version: api_version.to_owned(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl ContentApi for HttpContentApi {
    fn get_node(&self, id: &str) -> Result<RawPage, ApiError> {
        let url = format!("{}/pages/{}", self.api_url(), id);
        debug!("GET {}", url);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization())
            .header("Notion-Version", &self.api_version)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        read_json(response)
    }

    fn get_children(
        &self,
        id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<ChildrenPage, ApiError> {
        let url = format!("{}/blocks/{}/children", self.api_url(), id);
        info!(
            "Getting children of {} (cursor: {})",
            id,
            cursor.unwrap_or("start")
        );

        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization())
            .header("Notion-Version", &self.api_version)
            .header("Accept", "application/json")
            .query("page_size", page_size.to_string());
        if let Some(cursor) = cursor {
            request = request.query("start_cursor", cursor);
        }

        let response = request
            .call()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        read_json(response)
    }
}

/// Decode a response body, mapping error statuses to [`ApiError`].
fn read_json<T: DeserializeOwned>(response: Response<ureq::Body>) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|value| value.to_str().ok())
        .and_then(parse_retry_after);
    let mut body_reader = response.into_body();

    if status >= 400 {
        let body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(error_for_status(status, body, retry_after));
    }

    let body = body_reader
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    Ok(serde_json::from_str(&body)?)
}

/// Map an error status to an [`ApiError`].
pub(crate) fn error_for_status(status: u16, body: String, retry_after: Option<Duration>) -> ApiError {
    if status == 429 {
        ApiError::RateLimited { retry_after }
    } else {
        ApiError::Status { status, body }
    }
}

/// Parse a `Retry-After` header given in whole seconds.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
