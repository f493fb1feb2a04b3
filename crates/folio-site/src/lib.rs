//! Site structure for Folio.
//!
//! Assembles the remote content tree into a [`SiteMap`] of [`Page`]s
//! addressed by slug.
//!
//! # Architecture
//!
//! - [`TreeAssembler`]: walks the tree from a root page, assembling sibling
//!   subtrees in parallel while preserving source order
//! - [`FetchCache`]: per-build cache of child listings and page metadata
//! - [`SiteMap`]: breadth-first, last-writer-wins slug registry
//! - [`normalize_slug`] / [`slug_from_title`]: slug derivation
//!
//! Fetch failures abort the build with an [`AssemblyError`]. Problems that
//! only affect one node are recorded as [`BuildWarning`]s and the build
//! carries on.

mod assembler;
mod cache;
mod error;
mod page;
mod site_map;
mod slug;

pub use assembler::TreeAssembler;
pub use cache::FetchCache;
pub use error::{AssemblyError, BuildWarning};
pub use page::Page;
pub use site_map::SiteMap;
pub use slug::{derive_slug, normalize_slug, slug_from_title};
