//! Content tree assembly.
//!
//! Walks the remote page tree from a root page, fetching every child listing
//! through a [`PaginatedFetcher`], and turns raw nodes into [`Page`]s and
//! [`Block`]s. Sibling subtrees are assembled in parallel on a dedicated
//! rayon pool; results are always collected by source position.

use std::sync::Arc;

use folio_content::{ContentApi, FetchError, PaginatedFetcher, RawNode, RawPage, RetryPolicy};
use folio_renderer::{Block, BlockKind};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cache::FetchCache;
use crate::error::{AssemblyError, BuildWarning};
use crate::page::Page;
use crate::site_map::SiteMap;
use crate::slug::derive_slug;

/// Default number of worker threads.
const DEFAULT_CONCURRENCY: usize = 3;

/// Default page property holding the declared slug.
const DEFAULT_SLUG_PROPERTY: &str = "slug";

/// Slug of a root page that has neither a declared slug nor a usable title.
const ROOT_FALLBACK_SLUG: &str = "index";

/// Builds a [`SiteMap`] from a root page.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use folio_content::HttpContentApi;
/// use folio_site::TreeAssembler;
///
/// let api = HttpContentApi::new("https://api.notion.com", token, "2022-06-28", None);
/// let site = TreeAssembler::new(Arc::new(api))
///     .with_concurrency(4)
///     .build_site_map(root_id)?;
/// ```
pub struct TreeAssembler {
    fetcher: PaginatedFetcher,
    concurrency: usize,
    slug_property: String,
}

impl TreeAssembler {
    #[must_use]
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            fetcher: PaginatedFetcher::new(api),
            concurrency: DEFAULT_CONCURRENCY,
            slug_property: DEFAULT_SLUG_PROPERTY.to_owned(),
        }
    }

    /// Bound on concurrent requests. `1` assembles sequentially.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.fetcher = self.fetcher.with_retry_policy(policy);
        self
    }

    /// Number of children requested per listing page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.fetcher = self.fetcher.with_page_size(page_size);
        self
    }

    /// Page property to read declared slugs from.
    #[must_use]
    pub fn with_slug_property(mut self, name: impl Into<String>) -> Self {
        self.slug_property = name.into();
        self
    }

    /// Assemble the tree under `root_id` with a fresh fetch cache.
    pub fn build_site_map(&self, root_id: &str) -> Result<SiteMap, AssemblyError> {
        self.build_site_map_with_cache(root_id, &FetchCache::new())
    }

    /// Assemble the tree under `root_id`, reusing fetches recorded in `cache`.
    ///
    /// Any fetch failure fails the whole build; no partial site map is
    /// returned.
    pub fn build_site_map_with_cache(
        &self,
        root_id: &str,
        cache: &FetchCache,
    ) -> Result<SiteMap, AssemblyError> {
        info!(root_id, concurrency = self.concurrency, "Assembling site");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .thread_name(|i| format!("folio-fetch-{i}"))
            .build()?;
        let build = Build {
            assembler: self,
            cache,
        };
        let (root, warnings) = pool.install(|| build.root(root_id))?;

        let site_map = SiteMap::from_root(Arc::new(root), warnings);
        info!(
            pages = site_map.len(),
            warnings = site_map.warnings().len(),
            "Site assembled"
        );
        Ok(site_map)
    }
}

/// Pages, blocks and warnings produced by a run of sibling nodes.
#[derive(Default)]
struct Assembled {
    blocks: Vec<Block>,
    pages: Vec<Arc<Page>>,
    warnings: Vec<BuildWarning>,
}

impl Assembled {
    fn warn(&mut self, warning: BuildWarning) {
        warning.emit();
        self.warnings.push(warning);
    }

    fn append(&mut self, other: Self) {
        self.blocks.extend(other.blocks);
        self.pages.extend(other.pages);
        self.warnings.extend(other.warnings);
    }
}

/// State of one build.
struct Build<'a> {
    assembler: &'a TreeAssembler,
    cache: &'a FetchCache,
}

impl Build<'_> {
    fn root(&self, root_id: &str) -> Result<(Page, Vec<BuildWarning>), AssemblyError> {
        let raw = self
            .page(root_id)
            .map_err(|source| AssemblyError::RootUnavailable {
                root_id: root_id.to_owned(),
                source,
            })?;

        let mut warnings = Vec::new();
        let title = raw.title();
        let declared = raw.text_property(&self.assembler.slug_property);
        let slug = derive_slug(declared.as_deref(), title.as_deref()).unwrap_or_else(|| {
            let warning = BuildWarning::RootSlugDefaulted {
                page_id: root_id.to_owned(),
                slug: ROOT_FALLBACK_SLUG.to_owned(),
            };
            warning.emit();
            warnings.push(warning);
            ROOT_FALLBACK_SLUG.to_owned()
        });

        let page = self.page_tree(root_id, slug, title.unwrap_or_default(), &[], &mut warnings)?;
        Ok((page, warnings))
    }

    /// Assemble page `id` and everything below it.
    fn page_tree(
        &self,
        id: &str,
        slug: String,
        title: String,
        ancestors: &[&str],
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<Page, AssemblyError> {
        debug!(id, slug = %slug, "Assembling page");
        let mut chain = ancestors.to_vec();
        chain.push(id);

        let children = self.children(id, &chain)?;
        warnings.extend(children.warnings);

        Ok(Page {
            id: id.to_owned(),
            slug,
            title,
            blocks: children.blocks,
            child_pages: children.pages,
        })
    }

    /// Assemble every child of `parent_id`, in source order.
    fn children(&self, parent_id: &str, chain: &[&str]) -> Result<Assembled, AssemblyError> {
        let nodes = self.child_nodes(parent_id)?;
        let results: Vec<Assembled> = nodes
            .par_iter()
            .map(|node| self.child(parent_id, node, chain))
            .collect::<Result<_, _>>()?;

        let mut assembled = Assembled::default();
        for result in results {
            assembled.append(result);
        }
        Ok(assembled)
    }

    fn child(
        &self,
        parent_id: &str,
        node: &RawNode,
        chain: &[&str],
    ) -> Result<Assembled, AssemblyError> {
        let mut out = Assembled::default();

        let missing = node.missing_fields();
        if !missing.is_empty() {
            out.warn(BuildWarning::MalformedNode {
                node_id: node.id.clone(),
                parent_id: parent_id.to_owned(),
                reason: format!("missing {}", missing.join(", ")),
            });
            out.blocks
                .push(Block::new(node.id.clone(), BlockKind::unsupported(&node.node_type)));
            return Ok(out);
        }

        if chain.contains(&node.id.as_str()) {
            return Err(AssemblyError::CycleDetected {
                node_id: node.id.clone(),
            });
        }

        if node.is_page() {
            self.child_page(parent_id, node, chain, &mut out)?;
        } else {
            self.block(parent_id, node, chain, &mut out)?;
        }
        Ok(out)
    }

    fn child_page(
        &self,
        parent_id: &str,
        node: &RawNode,
        chain: &[&str],
        out: &mut Assembled,
    ) -> Result<(), AssemblyError> {
        let raw = self.page(&node.id)?;
        let title = raw
            .title()
            .or_else(|| node.child_page_title().map(str::to_owned));
        let declared = raw.text_property(&self.assembler.slug_property);

        match derive_slug(declared.as_deref(), title.as_deref()) {
            Some(slug) => {
                let page = self.page_tree(
                    &node.id,
                    slug,
                    title.unwrap_or_default(),
                    chain,
                    &mut out.warnings,
                )?;
                out.pages.push(Arc::new(page));
            }
            None => out.warn(BuildWarning::PageSkipped {
                page_id: node.id.clone(),
                parent_id: parent_id.to_owned(),
            }),
        }
        Ok(())
    }

    fn block(
        &self,
        parent_id: &str,
        node: &RawNode,
        chain: &[&str],
        out: &mut Assembled,
    ) -> Result<(), AssemblyError> {
        let kind = match BlockKind::from_payload(&node.node_type, node.payload()) {
            Ok(BlockKind::Unsupported { tag }) => {
                out.warn(BuildWarning::MalformedNode {
                    node_id: node.id.clone(),
                    parent_id: parent_id.to_owned(),
                    reason: format!("unsupported block type '{tag}'"),
                });
                BlockKind::Unsupported { tag }
            }
            Ok(kind) => kind,
            Err(err) => {
                out.warn(BuildWarning::MalformedNode {
                    node_id: node.id.clone(),
                    parent_id: parent_id.to_owned(),
                    reason: err.to_string(),
                });
                BlockKind::unsupported(&node.node_type)
            }
        };

        let mut block = Block::new(node.id.clone(), kind);
        block.has_children = node.has_children;

        if node.has_children {
            let mut chain = chain.to_vec();
            chain.push(&node.id);
            let nested = self.children(&node.id, &chain)?;
            // Pages nested in blocks belong to the enclosing page.
            out.pages.extend(nested.pages);
            out.warnings.extend(nested.warnings);
            if !matches!(block.kind, BlockKind::Unsupported { .. }) {
                block.children = nested.blocks;
            }
        }

        out.blocks.push(block);
        Ok(())
    }

    fn child_nodes(&self, id: &str) -> Result<Arc<Vec<RawNode>>, FetchError> {
        if let Some(children) = self.cache.children(id) {
            return Ok(children);
        }
        let children = Arc::new(self.assembler.fetcher.fetch_all_children(id)?);
        self.cache.insert_children(id, Arc::clone(&children));
        Ok(children)
    }

    fn page(&self, id: &str) -> Result<Arc<RawPage>, FetchError> {
        if let Some(page) = self.cache.page(id) {
            return Ok(page);
        }
        let page = Arc::new(self.assembler.fetcher.fetch_node(id)?);
        self.cache.insert_page(id, Arc::clone(&page));
        Ok(page)
    }
}
