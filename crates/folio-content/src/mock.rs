//! Mock content API for testing.
//!
//! Provides [`MockContentApi`] for exercising fetching and tree assembly
//! without network access.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::api::ContentApi;
use crate::error::ApiError;
use crate::types::{ChildrenPage, RawNode, RawPage};

/// Failure a mock request can be scripted to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// HTTP 429 without a `Retry-After` hint.
    RateLimited,
    /// HTTP 429 with a `Retry-After` hint.
    RateLimitedFor(Duration),
    /// HTTP 503.
    ServerError,
    /// Request timed out.
    Timeout,
    /// HTTP 404.
    NotFound,
    /// HTTP 400.
    BadRequest,
}

impl MockFailure {
    fn to_error(self) -> ApiError {
        match self {
            Self::RateLimited => ApiError::RateLimited { retry_after: None },
            Self::RateLimitedFor(delay) => ApiError::RateLimited {
                retry_after: Some(delay),
            },
            Self::ServerError => ApiError::Status {
                status: 503,
                body: "service unavailable".to_owned(),
            },
            Self::Timeout => ApiError::Transport("timed out".to_owned()),
            Self::NotFound => ApiError::Status {
                status: 404,
                body: "object_not_found".to_owned(),
            },
            Self::BadRequest => ApiError::Status {
                status: 400,
                body: "validation_error".to_owned(),
            },
        }
    }
}

/// Scripted failure behaviour for one node.
#[derive(Debug, Clone, Copy)]
enum Script {
    /// Fail the next `remaining` requests, then succeed.
    Times { failure: MockFailure, remaining: usize },
    /// Succeed `ok` more times, then fail forever.
    After { failure: MockFailure, ok: usize },
    /// Fail every request.
    Always(MockFailure),
}

/// In-memory content API.
///
/// Use the builder methods to describe the content tree and scripted
/// failures. Failures registered for a node apply to both metadata and
/// children requests of that node. Children of unknown nodes are empty;
/// metadata of unknown nodes is a 404.
///
/// # Example
///
/// ```ignore
/// use folio_content::{MockContentApi, RawNode, RawPage};
///
/// let api = MockContentApi::new()
///     .with_page(RawPage::new("root").with_title("Home"))
///     .with_children("root", vec![RawNode::child_page("p1", "About")])
///     .with_page(RawPage::new("p1").with_text_property("slug", "about"));
/// ```
#[derive(Debug, Default)]
pub struct MockContentApi {
    pages: HashMap<String, RawPage>,
    children: HashMap<String, Vec<RawNode>>,
    latency: HashMap<String, Duration>,
    batch_size: Option<usize>,
    scripts: Mutex<HashMap<String, Script>>,
    node_requests: Mutex<HashMap<String, usize>>,
    children_requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl MockContentApi {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register page metadata.
    #[must_use]
    pub fn with_page(mut self, page: RawPage) -> Self {
        self.pages.insert(page.id.clone(), page);
        self
    }

    /// Register the children of a node, in source order.
    #[must_use]
    pub fn with_children(mut self, id: impl Into<String>, children: Vec<RawNode>) -> Self {
        self.children.insert(id.into(), children);
        self
    }

    /// Cap every children page at `size` entries, whatever the caller asks for.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size.max(1));
        self
    }

    /// Delay every children request for `id`.
    #[must_use]
    pub fn with_latency(mut self, id: impl Into<String>, latency: Duration) -> Self {
        self.latency.insert(id.into(), latency);
        self
    }

    /// Fail the next `times` requests for `id`.
    #[must_use]
    pub fn fail_times(self, id: impl Into<String>, failure: MockFailure, times: usize) -> Self {
        self.script(
            id,
            Script::Times {
                failure,
                remaining: times,
            },
        )
    }

    /// Let `ok` requests for `id` succeed, then fail every later one.
    #[must_use]
    pub fn fail_after(self, id: impl Into<String>, ok: usize, failure: MockFailure) -> Self {
        self.script(id, Script::After { failure, ok })
    }

    /// Fail every request for `id`.
    #[must_use]
    pub fn fail_always(self, id: impl Into<String>, failure: MockFailure) -> Self {
        self.script(id, Script::Always(failure))
    }

    /// Number of metadata requests made for `id`.
    pub fn node_requests(&self, id: &str) -> usize {
        count(&self.node_requests, id)
    }

    /// Number of children requests made for `id`.
    pub fn children_requests(&self, id: &str) -> usize {
        self.children_request_times(id).len()
    }

    /// When each children request for `id` arrived, before any latency.
    pub fn children_request_times(&self, id: &str) -> Vec<Instant> {
        self.children_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    fn script(self, id: impl Into<String>, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), script);
        self
    }

    /// Consume one scripted outcome for `id`.
    fn scripted_failure(&self, id: &str) -> Option<ApiError> {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let script = scripts.get_mut(id)?;
        match script {
            Script::Times { failure, remaining } if *remaining > 0 => {
                *remaining -= 1;
                Some(failure.to_error())
            }
            Script::Times { .. } => None,
            Script::After { ok, .. } if *ok > 0 => {
                *ok -= 1;
                None
            }
            Script::After { failure, .. } | Script::Always(failure) => Some(failure.to_error()),
        }
    }
}

fn count(counter: &Mutex<HashMap<String, usize>>, id: &str) -> usize {
    counter
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(id)
        .copied()
        .unwrap_or_default()
}

fn record(counter: &Mutex<HashMap<String, usize>>, id: &str) {
    *counter
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(id.to_owned())
        .or_default() += 1;
}

impl ContentApi for MockContentApi {
    fn get_node(&self, id: &str) -> Result<RawPage, ApiError> {
        record(&self.node_requests, id);
        if let Some(err) = self.scripted_failure(id) {
            return Err(err);
        }
        self.pages.get(id).cloned().ok_or_else(|| ApiError::Status {
            status: 404,
            body: format!("Could not find page with ID: {id}"),
        })
    }

    fn get_children(
        &self,
        id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<ChildrenPage, ApiError> {
        self.children_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.to_owned())
            .or_default()
            .push(Instant::now());
        if let Some(latency) = self.latency.get(id) {
            std::thread::sleep(*latency);
        }
        if let Some(err) = self.scripted_failure(id) {
            return Err(err);
        }

        let all = self.children.get(id).map(Vec::as_slice).unwrap_or_default();
        let start = match cursor {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| ApiError::Status {
                status: 400,
                body: format!("invalid start_cursor: {cursor}"),
            })?,
            None => 0,
        };
        let requested = usize::try_from(page_size).unwrap_or(usize::MAX).max(1);
        let size = self.batch_size.map_or(requested, |batch| batch.min(requested));
        let start = start.min(all.len());
        let end = (start + size).min(all.len());
        let has_more = end < all.len();

        Ok(ChildrenPage {
            results: all[start..end].to_vec(),
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }
}
