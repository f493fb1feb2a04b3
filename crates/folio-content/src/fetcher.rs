//! Paginated child fetching with retry and backoff.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::ContentApi;
use crate::error::{ApiError, FetchError};
use crate::retry::{BackoffGate, RetryPolicy};
use crate::types::{RawNode, RawPage};

/// Default number of children requested per page.
const DEFAULT_PAGE_SIZE: u32 = 100;

/// Walks cursor-paginated child listings into complete, ordered sequences.
///
/// Transient failures are retried on the same cursor with exponential
/// backoff; permanent failures and exhausted retries surface as
/// [`FetchError`]. Nothing is cached between calls.
pub struct PaginatedFetcher {
    api: Arc<dyn ContentApi>,
    policy: RetryPolicy,
    gate: Arc<BackoffGate>,
    page_size: u32,
}

impl PaginatedFetcher {
    /// Create a fetcher with the default retry policy and a private backoff gate.
    #[must_use]
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            api,
            policy: RetryPolicy::default(),
            gate: Arc::new(BackoffGate::new()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the number of children requested per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Share a backoff gate with other fetchers.
    #[must_use]
    pub fn with_backoff_gate(mut self, gate: Arc<BackoffGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Retry policy in use.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch every child of `node_id`, in source order.
    ///
    /// Follows `next_cursor` until the API reports no more results and
    /// concatenates the pages in the order they were returned.
    pub fn fetch_all_children(&self, node_id: &str) -> Result<Vec<RawNode>, FetchError> {
        let mut children = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.with_retry(node_id, cursor.as_deref(), || {
                self.api
                    .get_children(node_id, cursor.as_deref(), self.page_size)
            })?;
            pages += 1;
            children.extend(page.results);

            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    warn!(
                        node_id,
                        "Content API reported more children without a cursor, stopping"
                    );
                    break;
                }
            }
        }

        debug!(node_id, pages, count = children.len(), "Fetched children");
        Ok(children)
    }

    /// Fetch page metadata for `node_id`.
    pub fn fetch_node(&self, node_id: &str) -> Result<RawPage, FetchError> {
        info!("Getting page {}", node_id);
        self.with_retry(node_id, None, || self.api.get_node(node_id))
    }

    /// Run `request` until it succeeds, fails permanently, or runs out of attempts.
    fn with_retry<T>(
        &self,
        node_id: &str,
        cursor: Option<&str>,
        mut request: impl FnMut() -> Result<T, ApiError>,
    ) -> Result<T, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.gate.wait();

            match request() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    let hint = err
                        .retry_after()
                        .map_or(Duration::ZERO, |hint| hint.min(self.policy.max_delay));
                    let delay = self.policy.delay_for(attempt).max(hint);
                    warn!(
                        node_id,
                        cursor,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Transient content API failure, backing off"
                    );
                    self.gate.defer(delay);
                }
                Err(err) => {
                    return Err(FetchError {
                        node_id: node_id.to_owned(),
                        cursor: cursor.map(str::to_owned),
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }
}
