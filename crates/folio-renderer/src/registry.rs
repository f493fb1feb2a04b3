//! Block type dispatch.

use crate::document::{Block, BlockKind, MAX_TABLE_COLUMNS, RichTextSpan};
use crate::node::RenderNode;
use crate::rich_text::RichTextRenderer;

/// Maps every block variant to its render tree.
///
/// Dispatch is one exhaustive match, so a new [`BlockKind`] variant does not
/// compile until it gets a render arm here. [`BlockKind::Unsupported`]
/// renders as [`RenderNode::Empty`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRendererRegistry {
    text: RichTextRenderer,
}

impl BlockRendererRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a single block. A numbered item rendered on its own is item 1.
    #[must_use]
    pub fn render(&self, block: &Block) -> RenderNode {
        self.render_at(block, 1)
    }

    /// Render sibling blocks, one node per block.
    ///
    /// Numbered list items count from 1 across adjacent siblings; any other
    /// block in between restarts the count.
    #[must_use]
    pub fn render_blocks(&self, blocks: &[Block]) -> Vec<RenderNode> {
        let mut position = 0;
        blocks
            .iter()
            .map(|block| {
                if matches!(block.kind, BlockKind::NumberedListItem { .. }) {
                    position += 1;
                } else {
                    position = 0;
                }
                self.render_at(block, position.max(1))
            })
            .collect()
    }

    fn render_at(&self, block: &Block, position: u32) -> RenderNode {
        match &block.kind {
            BlockKind::Paragraph { rich_text } => RenderNode::Paragraph {
                content: self.text.render(rich_text),
                children: self.render_blocks(&block.children),
            },
            BlockKind::Heading1 { rich_text } => self.heading(1, rich_text, &block.children),
            BlockKind::Heading2 { rich_text } => self.heading(2, rich_text, &block.children),
            BlockKind::Heading3 { rich_text } => self.heading(3, rich_text, &block.children),
            BlockKind::BulletedListItem { rich_text } => RenderNode::BulletedItem {
                content: self.text.render(rich_text),
                children: self.render_blocks(&block.children),
            },
            BlockKind::NumberedListItem { rich_text } => RenderNode::NumberedItem {
                position,
                content: self.text.render(rich_text),
                children: self.render_blocks(&block.children),
            },
            BlockKind::ToDo { rich_text, checked } => RenderNode::ToDo {
                checked: *checked,
                content: self.text.render(rich_text),
                children: self.render_blocks(&block.children),
            },
            BlockKind::Quote { rich_text } => RenderNode::Quote {
                content: self.text.render(rich_text),
                children: self.render_blocks(&block.children),
            },
            BlockKind::Code {
                language,
                rich_text,
                caption,
            } => RenderNode::Code {
                language: language.clone(),
                content: self.text.render_code(rich_text),
                caption: self.text.render(caption),
            },
            BlockKind::Image { url, caption } => RenderNode::Image {
                url: url.clone(),
                caption: self.text.render(caption),
            },
            BlockKind::Divider => RenderNode::Divider,
            BlockKind::Table {
                column_count,
                has_column_header,
                has_row_header,
            } => {
                let width = (*column_count).min(MAX_TABLE_COLUMNS);
                RenderNode::Table {
                    column_count: width,
                    has_column_header: *has_column_header,
                    has_row_header: *has_row_header,
                    rows: block
                        .children
                        .iter()
                        .filter_map(|child| match &child.kind {
                            BlockKind::TableRow { cells } => Some(self.row(cells, width)),
                            _ => None,
                        })
                        .collect(),
                }
            }
            BlockKind::TableRow { cells } => RenderNode::Table {
                column_count: cells.len(),
                has_column_header: false,
                has_row_header: false,
                rows: vec![self.row(cells, cells.len())],
            },
            BlockKind::Unsupported { .. } => RenderNode::Empty,
        }
    }

    fn heading(&self, level: u8, rich_text: &[RichTextSpan], children: &[Block]) -> RenderNode {
        RenderNode::Heading {
            level,
            content: self.text.render(rich_text),
            children: self.render_blocks(children),
        }
    }

    /// Exactly `width` cells: short rows padded, long rows truncated.
    fn row(&self, cells: &[Vec<RichTextSpan>], width: usize) -> Vec<Vec<RenderNode>> {
        let mut row: Vec<Vec<RenderNode>> = cells
            .iter()
            .take(width)
            .map(|cell| self.text.render(cell))
            .collect();
        row.resize_with(width, Vec::new);
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TextLeaf;
    use pretty_assertions::assert_eq;

    fn numbered(id: &str) -> Block {
        Block::new(
            id,
            BlockKind::NumberedListItem {
                rich_text: vec![RichTextSpan::plain(id)],
            },
        )
    }

    fn paragraph(text: &str) -> Block {
        Block::new(
            "p",
            BlockKind::Paragraph {
                rich_text: vec![RichTextSpan::plain(text)],
            },
        )
    }

    fn positions(nodes: &[RenderNode]) -> Vec<Option<u32>> {
        nodes
            .iter()
            .map(|node| match node {
                RenderNode::NumberedItem { position, .. } => Some(*position),
                _ => None,
            })
            .collect()
    }

    fn row(cells: &[&str]) -> Block {
        Block::new(
            "r",
            BlockKind::TableRow {
                cells: cells
                    .iter()
                    .map(|c| vec![RichTextSpan::plain(*c)])
                    .collect(),
            },
        )
    }

    #[test]
    fn test_paragraph_single_text_node() {
        let node = BlockRendererRegistry::new().render(&paragraph("Hi"));
        assert_eq!(
            node,
            RenderNode::Paragraph {
                content: vec![RenderNode::Text(TextLeaf {
                    text: "Hi".to_owned(),
                    annotations: crate::Annotations::empty(),
                    color: crate::Color::Default,
                    link: None,
                })],
                children: vec![],
            }
        );
    }

    #[test]
    fn test_empty_heading_still_renders() {
        let block = Block::new("h", BlockKind::Heading2 { rich_text: vec![] });
        let nodes = BlockRendererRegistry::new().render_blocks(&[block]);
        assert_eq!(
            nodes,
            vec![RenderNode::Heading {
                level: 2,
                content: vec![],
                children: vec![],
            }]
        );
    }

    #[test]
    fn test_heading_and_paragraph_keep_children() {
        let heading = Block::new(
            "h",
            BlockKind::Heading1 {
                rich_text: vec![RichTextSpan::plain("toggle")],
            },
        )
        .with_children(vec![paragraph("nested")]);
        let registry = BlockRendererRegistry::new();

        let RenderNode::Heading { children, .. } = registry.render(&heading) else {
            panic!("expected a heading");
        };
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].plain_text(), "nested");

        let outer = paragraph("parent").with_children(vec![paragraph("nested")]);
        assert_eq!(registry.render(&outer).plain_text(), "parentnested");
    }

    #[test]
    fn test_table_width_is_bounded() {
        let table = Block::new(
            "t",
            BlockKind::Table {
                column_count: usize::MAX,
                has_column_header: false,
                has_row_header: false,
            },
        )
        .with_children(vec![Block::new(
            "r",
            BlockKind::TableRow {
                cells: vec![vec![RichTextSpan::plain("a")]],
            },
        )]);

        let RenderNode::Table {
            column_count, rows, ..
        } = BlockRendererRegistry::new().render(&table)
        else {
            panic!("expected a table");
        };
        assert_eq!(column_count, MAX_TABLE_COLUMNS);
        assert_eq!(rows[0].len(), MAX_TABLE_COLUMNS);
    }

    #[test]
    fn test_numbering_resets_between_runs() {
        let blocks = vec![
            numbered("a"),
            numbered("b"),
            paragraph("break"),
            numbered("c"),
            numbered("d"),
            numbered("e"),
        ];
        let nodes = BlockRendererRegistry::new().render_blocks(&blocks);
        assert_eq!(
            positions(&nodes),
            vec![Some(1), Some(2), None, Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn test_nested_numbering_is_independent() {
        let parent = numbered("a").with_children(vec![numbered("a1"), numbered("a2")]);
        let nodes = BlockRendererRegistry::new().render_blocks(&[numbered("z"), parent]);
        let RenderNode::NumberedItem {
            position, children, ..
        } = &nodes[1]
        else {
            panic!("expected numbered item");
        };
        assert_eq!(*position, 2);
        assert_eq!(positions(children), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_unsupported_renders_empty_and_keeps_siblings() {
        let blocks = vec![
            paragraph("before"),
            Block::new("u", BlockKind::unsupported("synced_block")),
            paragraph("after"),
        ];
        let nodes = BlockRendererRegistry::new().render_blocks(&blocks);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1], RenderNode::Empty);
        assert_eq!(nodes[0].plain_text(), "before");
        assert_eq!(nodes[2].plain_text(), "after");
    }

    #[test]
    fn test_table_is_rectangular() {
        let table = Block::new(
            "t",
            BlockKind::Table {
                column_count: 2,
                has_column_header: true,
                has_row_header: false,
            },
        )
        .with_children(vec![
            row(&["a"]),
            Block::new("d", BlockKind::Divider),
            row(&["b", "c", "overflow"]),
        ]);
        let RenderNode::Table {
            rows,
            column_count,
            has_column_header,
            ..
        } = BlockRendererRegistry::new().render(&table)
        else {
            panic!("expected table");
        };
        assert_eq!(column_count, 2);
        assert!(has_column_header);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 2));
        assert!(rows[0][1].is_empty());
        assert_eq!(rows[1][1][0].plain_text(), "c");
    }

    #[test]
    fn test_stray_row_renders_as_one_row_grid() {
        let node = BlockRendererRegistry::new().render(&row(&["x", "y", "z"]));
        let RenderNode::Table {
            rows, column_count, ..
        } = node
        else {
            panic!("expected table");
        };
        assert_eq!(column_count, 3);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_code_block() {
        let block = Block::new(
            "c",
            BlockKind::Code {
                language: "rust".to_owned(),
                rich_text: vec![
                    RichTextSpan::plain("fn main() {}").with_annotations(crate::Annotations::BOLD),
                ],
                caption: vec![],
            },
        );
        let RenderNode::Code {
            language, content, ..
        } = BlockRendererRegistry::new().render(&block)
        else {
            panic!("expected code");
        };
        assert_eq!(language, "rust");
        let RenderNode::Text(leaf) = &content[0] else {
            panic!("expected text leaf");
        };
        assert!(leaf.annotations.is_empty());
    }

    #[test]
    fn test_quote_and_todo_render_children() {
        let quote = Block::new(
            "q",
            BlockKind::Quote {
                rich_text: vec![RichTextSpan::plain("quoted")],
            },
        )
        .with_children(vec![paragraph("inner")]);
        assert_eq!(
            BlockRendererRegistry::new().render(&quote).plain_text(),
            "quotedinner"
        );

        let todo = Block::new(
            "t",
            BlockKind::ToDo {
                rich_text: vec![RichTextSpan::plain("ship")],
                checked: true,
            },
        );
        assert!(matches!(
            BlockRendererRegistry::new().render(&todo),
            RenderNode::ToDo { checked: true, .. }
        ));
    }
}
