//! Content API trait.
//!
//! Abstracts the remote "pages and blocks" service so tree assembly can run
//! against the HTTP client in production and an in-memory mock in tests.

use crate::error::ApiError;
use crate::types::{ChildrenPage, RawPage};

/// Read access to a hierarchical pages-and-blocks content service.
///
/// Implementations perform exactly one remote request per call and never
/// retry; retry and backoff live in [`PaginatedFetcher`](crate::PaginatedFetcher).
pub trait ContentApi: Send + Sync {
    /// Fetch page metadata (title and properties) by node ID.
    fn get_node(&self, id: &str) -> Result<RawPage, ApiError>;

    /// Fetch one page of a node's immediate children.
    ///
    /// # Arguments
    ///
    /// * `id` - Parent node ID
    /// * `cursor` - Cursor returned by the previous page, `None` for the first page
    /// * `page_size` - Maximum number of children to return
    fn get_children(
        &self,
        id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<ChildrenPage, ApiError>;
}
