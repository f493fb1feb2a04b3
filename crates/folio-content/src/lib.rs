//! Content source access for Folio.
//!
//! This crate talks to a hierarchical pages-and-blocks content service and
//! turns its cursor-paginated child listings into complete, ordered
//! sequences.
//!
//! # Architecture
//!
//! - [`ContentApi`] trait with one method per remote request
//! - [`HttpContentApi`] implementation over a Notion-style REST API
//! - [`PaginatedFetcher`] drains cursors and retries transient failures
//!   according to a [`RetryPolicy`], pausing on a shared [`BackoffGate`]
//! - [`MockContentApi`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_content::{HttpContentApi, PaginatedFetcher};
//!
//! let api = HttpContentApi::new("https://api.notion.com", token, "2022-06-28", None);
//! let fetcher = PaginatedFetcher::new(Arc::new(api));
//! let children = fetcher.fetch_all_children(root_id)?;
//! ```

mod api;
mod client;
pub mod error;
mod fetcher;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod retry;
mod types;

pub use api::ContentApi;
pub use client::HttpContentApi;
pub use error::{ApiError, FetchError};
pub use fetcher::PaginatedFetcher;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockContentApi, MockFailure};
pub use retry::{BackoffGate, RetryPolicy};
pub use types::{ChildPageInfo, ChildrenPage, RawNode, RawPage, plain_text, text_span};
