//! End-to-end tree assembly against the mock content API.

use std::sync::Arc;
use std::time::Duration;

use folio_content::{ContentApi, MockContentApi, MockFailure, RawNode, RawPage, RetryPolicy, text_span};
use folio_renderer::{BlockKind, BlockRendererRegistry, RenderNode};
use folio_site::{AssemblyError, BuildWarning, TreeAssembler};
use pretty_assertions::assert_eq;
use serde_json::json;

fn paragraph(id: &str, text: &str) -> RawNode {
    RawNode::block(id, "paragraph", json!({ "rich_text": [text_span(text)] }))
}

fn assembler(api: &Arc<MockContentApi>) -> TreeAssembler {
    TreeAssembler::new(Arc::clone(api) as Arc<dyn ContentApi>)
        .with_retry_policy(RetryPolicy::immediate(3))
}

#[test]
fn test_home_and_about_scenario() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children(
                "root",
                vec![RawNode::child_page("p1", "About"), paragraph("b1", "Hi")],
            )
            .with_page(RawPage::new("p1").with_text_property("slug", "about")),
    );

    let site = assembler(&api).build_site_map("root").unwrap();

    let about = site.get("about").unwrap();
    assert_eq!(about.id, "p1");
    assert_eq!(about.title, "About");
    assert!(about.blocks.is_empty());
    assert!(about.child_pages.is_empty());

    let root = site.get(site.root_slug()).unwrap();
    assert_eq!(root.id, "root");
    assert_eq!(root.blocks.len(), 1);
    assert_eq!(root.child_pages.len(), 1);

    let nodes = BlockRendererRegistry::new().render_blocks(&root.blocks);
    let [RenderNode::Paragraph { content, .. }] = nodes.as_slice() else {
        panic!("expected one paragraph, got {nodes:?}");
    };
    let [RenderNode::Text(leaf)] = content.as_slice() else {
        panic!("expected one text node, got {content:?}");
    };
    assert_eq!(leaf.text, "Hi");
    assert!(site.warnings().is_empty());
}

#[test]
fn test_child_order_is_source_order_for_any_concurrency() {
    let ids: Vec<String> = (0..6).map(|i| format!("p{i}")).collect();
    let mut mock = MockContentApi::new().with_page(RawPage::new("root").with_title("Home"));
    let mut children = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        children.push(RawNode::child_page(id, id));
        if i % 2 == 0 {
            children.push(paragraph(&format!("b{i}"), id));
        }
        // Earlier siblings finish later.
        let delay = Duration::from_millis(5 * (6 - i as u64));
        mock = mock
            .with_page(RawPage::new(id))
            .with_latency(id, delay)
            .with_children(id, vec![paragraph(&format!("{id}-a"), "a"), paragraph(&format!("{id}-b"), "b")]);
    }
    let api = Arc::new(mock.with_children("root", children));

    for concurrency in [1, 2, 4, 8] {
        let site = assembler(&api)
            .with_concurrency(concurrency)
            .build_site_map("root")
            .unwrap();
        let root = site.root();

        let page_ids: Vec<&str> = root.child_pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(page_ids, ids, "concurrency {concurrency}");

        let block_ids: Vec<&str> = root.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(block_ids, vec!["b0", "b2", "b4"], "concurrency {concurrency}");

        for page in &root.child_pages {
            let nested: Vec<String> = page.blocks.iter().map(|b| b.id.clone()).collect();
            assert_eq!(nested, vec![format!("{}-a", page.id), format!("{}-b", page.id)]);
        }

        let slugs: Vec<&str> = site.slugs().collect();
        assert_eq!(slugs, vec!["home", "p0", "p1", "p2", "p3", "p4", "p5"]);
    }
}

#[test]
fn test_paginated_children_are_complete() {
    let nodes: Vec<RawNode> = (0..9).map(|i| paragraph(&format!("b{i}"), "x")).collect();
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children("root", nodes)
            .with_batch_size(4),
    );
    let site = assembler(&api).build_site_map("root").unwrap();
    let ids: Vec<&str> = site.root().blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["b0", "b1", "b2", "b3", "b4", "b5", "b6", "b7", "b8"]
    );
    assert_eq!(api.children_requests("root"), 3);
}

#[test]
fn test_unknown_block_type_keeps_siblings() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children(
                "root",
                vec![
                    paragraph("a", "before"),
                    RawNode::block("x", "embed", json!({ "url": "https://example.com" })),
                    paragraph("b", "after"),
                ],
            ),
    );
    let site = assembler(&api).build_site_map("root").unwrap();
    let blocks = &site.root().blocks;

    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1].kind, BlockKind::unsupported("embed"));
    assert!(matches!(blocks[0].kind, BlockKind::Paragraph { .. }));
    assert!(matches!(blocks[2].kind, BlockKind::Paragraph { .. }));
    assert!(matches!(
        &site.warnings()[..],
        [BuildWarning::MalformedNode { node_id, .. }] if node_id == "x"
    ));

    let nodes = BlockRendererRegistry::new().render_blocks(blocks);
    assert_eq!(nodes[1], RenderNode::Empty);
}

#[test]
fn test_slug_collision_keeps_later_page() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children(
                "root",
                vec![RawNode::child_page("A", "First"), RawNode::child_page("B", "Second")],
            )
            .with_page(RawPage::new("A").with_text_property("slug", "about"))
            .with_page(RawPage::new("B").with_text_property("slug", "About")),
    );
    let site = assembler(&api).build_site_map("root").unwrap();

    assert_eq!(site.get("about").unwrap().id, "B");
    assert_eq!(site.len(), 2);
    assert_eq!(
        site.warnings(),
        &[BuildWarning::SlugConflict {
            slug: "about".to_owned(),
            replaced_id: "A".to_owned(),
            kept_id: "B".to_owned(),
        }]
    );
}

#[test]
fn test_page_without_slug_or_title_is_skipped_with_subtree() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children(
                "root",
                vec![RawNode::child_page("ghost", ""), paragraph("b", "kept")],
            )
            .with_page(RawPage::new("ghost"))
            .with_children("ghost", vec![RawNode::child_page("inner", "Inner")])
            .with_page(RawPage::new("inner")),
    );
    let site = assembler(&api).build_site_map("root").unwrap();

    assert_eq!(site.len(), 1);
    assert!(!site.contains("inner"));
    assert_eq!(site.root().blocks.len(), 1);
    assert_eq!(api.children_requests("ghost"), 0);
    assert_eq!(
        site.warnings(),
        &[BuildWarning::PageSkipped {
            page_id: "ghost".to_owned(),
            parent_id: "root".to_owned(),
        }]
    );
}

#[test]
fn test_persistent_transient_failure_stops_after_max_attempts() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children(
                "root",
                vec![
                    RawNode::block("list", "bulleted_list_item", json!({ "rich_text": [] }))
                        .with_children(true),
                ],
            )
            .fail_always("list", MockFailure::RateLimited),
    );
    let err = assembler(&api).build_site_map("root").unwrap_err();

    let AssemblyError::Fetch(fetch) = err else {
        panic!("expected fetch error, got {err:?}");
    };
    assert_eq!(fetch.node_id, "list");
    assert_eq!(fetch.attempts, 3);
    assert_eq!(api.children_requests("list"), 3);
}

#[test]
fn test_transient_failures_recover() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children("root", vec![paragraph("a", "A")])
            .fail_times("root", MockFailure::ServerError, 2),
    );
    let site = assembler(&api).build_site_map("root").unwrap();
    assert_eq!(site.root().blocks.len(), 1);
}

#[test]
fn test_root_unavailable() {
    let api = Arc::new(MockContentApi::new());
    let err = assembler(&api).build_site_map("missing").unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::RootUnavailable { ref root_id, .. } if root_id == "missing"
    ));
    assert_eq!(api.children_requests("missing"), 0);
}

#[test]
fn test_cycle_is_detected() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children("root", vec![RawNode::child_page("p1", "Loop")])
            .with_page(RawPage::new("p1"))
            .with_children("p1", vec![RawNode::child_page("root", "Home")]),
    );
    let err = assembler(&api).build_site_map("root").unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::CycleDetected { ref node_id } if node_id == "root"
    ));
}

#[test]
fn test_shared_page_is_not_a_cycle() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children(
                "root",
                vec![RawNode::child_page("a", "A"), RawNode::child_page("b", "B")],
            )
            .with_page(RawPage::new("a"))
            .with_page(RawPage::new("b"))
            .with_page(RawPage::new("shared"))
            .with_children("a", vec![RawNode::child_page("shared", "Shared")])
            .with_children("b", vec![RawNode::child_page("shared", "Shared")]),
    );
    let site = assembler(&api)
        .with_concurrency(1)
        .build_site_map("root")
        .unwrap();

    assert_eq!(site.slugs().collect::<Vec<_>>(), vec!["home", "a", "b", "shared"]);
    assert!(site.warnings().is_empty());
    assert_eq!(api.node_requests("shared"), 1);
}

#[test]
fn test_rate_limit_on_one_branch_pauses_siblings() {
    let api = Arc::new(
        MockContentApi::new()
            .with_page(RawPage::new("root").with_title("Home"))
            .with_children(
                "root",
                vec![
                    paragraph("a", "A").with_children(true),
                    paragraph("b", "B").with_children(true),
                ],
            )
            .with_children("a", vec![paragraph("a1", "A1")])
            .with_children("b", vec![paragraph("b1", "B1"), paragraph("b2", "B2")])
            .with_batch_size(1)
            .with_latency("b", Duration::from_millis(50))
            .fail_times("a", MockFailure::RateLimitedFor(Duration::from_millis(300)), 1),
    );

    let site = TreeAssembler::new(Arc::clone(&api) as Arc<dyn ContentApi>)
        .with_concurrency(2)
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::ZERO,
            max_delay: Duration::from_secs(1),
        })
        .build_site_map("root")
        .unwrap();

    let root = site.root();
    assert_eq!(root.blocks[0].children.len(), 1);
    assert_eq!(root.blocks[1].children.len(), 2);

    // The second page of "b" waits out the pause set by the 429 on "a".
    let a_started = api.children_request_times("a")[0];
    let b_times = api.children_request_times("b");
    assert_eq!(b_times.len(), 2);
    assert!(b_times[1].duration_since(a_started) >= Duration::from_millis(250));
}
