//! Assembled pages.

use std::sync::Arc;

use folio_renderer::Block;
use serde::{Serialize, Serializer};

/// A page with its content blocks and direct subpages.
///
/// Immutable once assembled. Subpages are shared, so a page reachable from
/// several parents is one allocation per parent branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub blocks: Vec<Block>,
    /// Subpages in source order. Serialized as their slugs.
    #[serde(serialize_with = "serialize_slugs")]
    pub child_pages: Vec<Arc<Page>>,
}

impl Page {
    /// Total number of blocks, nested ones included.
    pub fn block_count(&self) -> usize {
        fn count(blocks: &[Block]) -> usize {
            blocks.iter().map(|b| 1 + count(&b.children)).sum()
        }
        count(&self.blocks)
    }
}

fn serialize_slugs<S: Serializer>(pages: &[Arc<Page>], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(pages.iter().map(|page| page.slug.as_str()))
}
