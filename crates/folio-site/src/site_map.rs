//! Slug-addressed page registry.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;

use crate::error::BuildWarning;
use crate::page::Page;

/// Every page of a build, addressed by slug.
///
/// Built once per build by registering pages breadth-first from the root,
/// children in source order. When two pages share a slug the later one
/// replaces the earlier in place and a [`BuildWarning::SlugConflict`] is
/// recorded. Iteration follows registration order.
#[derive(Debug, Serialize)]
pub struct SiteMap {
    root_slug: String,
    pages: Vec<Arc<Page>>,
    warnings: Vec<BuildWarning>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    root: Arc<Page>,
}

impl SiteMap {
    /// Register `root` and every page below it.
    pub(crate) fn from_root(root: Arc<Page>, mut warnings: Vec<BuildWarning>) -> Self {
        let mut map = Self {
            root_slug: root.slug.clone(),
            pages: Vec::new(),
            warnings: Vec::new(),
            index: HashMap::new(),
            root: Arc::clone(&root),
        };

        let mut queue = VecDeque::from([root]);
        while let Some(page) = queue.pop_front() {
            queue.extend(page.child_pages.iter().map(Arc::clone));
            if let Some(warning) = map.register(page) {
                warning.emit();
                warnings.push(warning);
            }
        }

        map.warnings = warnings;
        map
    }

    /// Insert a page, replacing any earlier page with the same slug.
    fn register(&mut self, page: Arc<Page>) -> Option<BuildWarning> {
        if let Some(&slot) = self.index.get(&page.slug) {
            let existing = std::mem::replace(&mut self.pages[slot], Arc::clone(&page));
            return (existing.id != page.id).then(|| BuildWarning::SlugConflict {
                slug: page.slug.clone(),
                replaced_id: existing.id.clone(),
                kept_id: page.id.clone(),
            });
        }
        self.index.insert(page.slug.clone(), self.pages.len());
        self.pages.push(page);
        None
    }

    /// Page registered under `slug`.
    pub fn get(&self, slug: &str) -> Option<&Arc<Page>> {
        self.index.get(slug).map(|&slot| &self.pages[slot])
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    /// Slug the root page was registered under.
    pub fn root_slug(&self) -> &str {
        &self.root_slug
    }

    /// The assembled root page, even if a later page took over its slug.
    pub fn root(&self) -> &Arc<Page> {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in registration order.
    pub fn pages(&self) -> impl Iterator<Item = &Arc<Page>> {
        self.pages.iter()
    }

    /// Slugs in registration order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.slug.as_str())
    }

    /// Warnings recorded during the build.
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(id: &str, slug: &str, children: Vec<Arc<Page>>) -> Arc<Page> {
        Arc::new(Page {
            id: id.to_owned(),
            slug: slug.to_owned(),
            title: id.to_owned(),
            blocks: Vec::new(),
            child_pages: children,
        })
    }

    #[test]
    fn test_breadth_first_registration() {
        let deep = page("deep", "deep", vec![]);
        let a = page("a", "a", vec![deep]);
        let b = page("b", "b", vec![]);
        let map = SiteMap::from_root(page("root", "home", vec![a, b]), Vec::new());

        assert_eq!(map.slugs().collect::<Vec<_>>(), vec!["home", "a", "b", "deep"]);
        assert_eq!(map.root_slug(), "home");
        assert!(map.warnings().is_empty());
    }

    #[test]
    fn test_later_page_wins_slug() {
        let first = page("A", "about", vec![]);
        let second = page("B", "about", vec![]);
        let map = SiteMap::from_root(page("root", "home", vec![first, second]), Vec::new());

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("about").unwrap().id, "B");
        assert_eq!(
            map.warnings(),
            &[BuildWarning::SlugConflict {
                slug: "about".to_owned(),
                replaced_id: "A".to_owned(),
                kept_id: "B".to_owned(),
            }]
        );
    }

    #[test]
    fn test_deeper_page_wins_over_shallower() {
        let deep = page("deep", "about", vec![]);
        let shallow = page("shallow", "about", vec![deep]);
        let map = SiteMap::from_root(page("root", "home", vec![shallow]), Vec::new());
        assert_eq!(map.get("about").unwrap().id, "deep");
    }

    #[test]
    fn test_child_can_take_root_slug() {
        let child = page("c", "home", vec![]);
        let map = SiteMap::from_root(page("root", "home", vec![child]), Vec::new());
        assert_eq!(map.get("home").unwrap().id, "c");
        assert_eq!(map.root().id, "root");
    }

    #[test]
    fn test_shared_page_is_not_a_conflict() {
        let shared = page("s", "shared", vec![]);
        let a = page("a", "a", vec![Arc::clone(&shared)]);
        let b = page("b", "b", vec![shared]);
        let map = SiteMap::from_root(page("root", "home", vec![a, b]), Vec::new());
        assert_eq!(map.len(), 4);
        assert!(map.warnings().is_empty());
    }

    #[test]
    fn test_serializes_in_registration_order() {
        let map = SiteMap::from_root(
            page("root", "home", vec![page("a", "a", vec![])]),
            Vec::new(),
        );
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["root_slug"], "home");
        assert_eq!(json["pages"][0]["child_pages"], serde_json::json!(["a"]));
        assert_eq!(json["pages"][1]["id"], "a");
    }
}
