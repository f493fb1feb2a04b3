//! Build errors and warnings.

use std::fmt;

use folio_content::FetchError;

/// A build failed; no site map is produced.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// Root page metadata could not be fetched.
    #[error("root page {root_id} is unavailable")]
    RootUnavailable {
        root_id: String,
        #[source]
        source: FetchError,
    },

    /// A fetch below the root failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A node appears among its own ancestors.
    #[error("cycle detected: node {node_id} is its own ancestor")]
    CycleDetected { node_id: String },

    /// Worker pool could not be started.
    #[error("failed to start worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Non-fatal problem found while building a site map.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// A block node was missing fields or had an unknown or undecodable
    /// type, and was replaced by an unsupported block.
    MalformedNode {
        node_id: String,
        parent_id: String,
        reason: String,
    },
    /// Two pages resolved to the same slug; the later one was kept.
    SlugConflict {
        slug: String,
        replaced_id: String,
        kept_id: String,
    },
    /// A child page had no usable slug and was left out with its subtree.
    PageSkipped { page_id: String, parent_id: String },
    /// The root page had no usable slug and was registered as `index`.
    RootSlugDefaulted { page_id: String, slug: String },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedNode {
                node_id,
                parent_id,
                reason,
            } => write!(
                f,
                "node {node_id} under {parent_id} rendered as unsupported: {reason}"
            ),
            Self::SlugConflict {
                slug,
                replaced_id,
                kept_id,
            } => write!(
                f,
                "slug '{slug}' used by pages {replaced_id} and {kept_id}, keeping {kept_id}"
            ),
            Self::PageSkipped { page_id, parent_id } => write!(
                f,
                "page {page_id} under {parent_id} has no slug or title, skipped with its subpages"
            ),
            Self::RootSlugDefaulted { page_id, slug } => {
                write!(f, "root page {page_id} has no slug or title, using '{slug}'")
            }
        }
    }
}

impl BuildWarning {
    /// Log the warning.
    pub(crate) fn emit(&self) {
        tracing::warn!(warning = %self, "Build warning");
    }
}
