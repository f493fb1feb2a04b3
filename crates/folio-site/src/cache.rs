//! Per-build fetch cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use folio_content::{RawNode, RawPage};

/// Child listings and page metadata fetched during one build, keyed by node ID.
///
/// Nodes referenced from more than one place are fetched once. The cache
/// lives as long as the caller keeps it; nothing is shared across builds
/// unless the caller passes the same cache twice.
#[derive(Debug, Default)]
pub struct FetchCache {
    children: Mutex<HashMap<String, Arc<Vec<RawNode>>>>,
    pages: Mutex<HashMap<String, Arc<RawPage>>>,
}

impl FetchCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached children of `id`.
    pub fn children(&self, id: &str) -> Option<Arc<Vec<RawNode>>> {
        self.children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(Arc::clone)
    }

    pub fn insert_children(&self, id: &str, children: Arc<Vec<RawNode>>) {
        self.children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_owned(), children);
    }

    /// Cached metadata of page `id`.
    pub fn page(&self, id: &str) -> Option<Arc<RawPage>> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(Arc::clone)
    }

    pub fn insert_page(&self, id: &str, page: Arc<RawPage>) {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_owned(), page);
    }

    /// Number of cached child listings and pages.
    pub fn entry_counts(&self) -> (usize, usize) {
        let children = self
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        let pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner).len();
        (children, pages)
    }
}
