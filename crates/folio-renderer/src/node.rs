//! Backend-independent render tree.

use crate::document::{Annotations, Color};

/// A styled run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextLeaf {
    pub text: String,
    pub annotations: Annotations,
    pub color: Color,
    pub link: Option<String>,
}

/// One rendered element.
///
/// `content` holds text leaves; `children` holds nested blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum RenderNode {
    Text(TextLeaf),
    Paragraph {
        content: Vec<RenderNode>,
        children: Vec<RenderNode>,
    },
    /// Toggle headings keep their nested blocks in `children`.
    Heading {
        level: u8,
        content: Vec<RenderNode>,
        children: Vec<RenderNode>,
    },
    BulletedItem {
        content: Vec<RenderNode>,
        children: Vec<RenderNode>,
    },
    NumberedItem {
        /// 1-based position within the run of adjacent numbered items.
        position: u32,
        content: Vec<RenderNode>,
        children: Vec<RenderNode>,
    },
    ToDo {
        checked: bool,
        content: Vec<RenderNode>,
        children: Vec<RenderNode>,
    },
    Quote {
        content: Vec<RenderNode>,
        children: Vec<RenderNode>,
    },
    Code {
        language: String,
        content: Vec<RenderNode>,
        caption: Vec<RenderNode>,
    },
    Image {
        url: String,
        caption: Vec<RenderNode>,
    },
    Divider,
    /// Rectangular grid: every row has exactly `column_count` cells.
    Table {
        column_count: usize,
        has_column_header: bool,
        has_row_header: bool,
        rows: Vec<Vec<Vec<RenderNode>>>,
    },
    /// Renders nothing.
    Empty,
}

impl RenderNode {
    /// Plain text of this node and everything below it.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let collect = |nodes: &[RenderNode], out: &mut String| {
            for node in nodes {
                node.collect_text(out);
            }
        };
        match self {
            Self::Text(leaf) => out.push_str(&leaf.text),
            Self::Paragraph { content, children }
            | Self::Heading {
                content, children, ..
            }
            | Self::BulletedItem { content, children }
            | Self::NumberedItem {
                content, children, ..
            }
            | Self::ToDo {
                content, children, ..
            }
            | Self::Quote { content, children } => {
                collect(content, out);
                collect(children, out);
            }
            Self::Code { content, .. } => collect(content, out),
            Self::Image { caption, .. } => collect(caption, out),
            Self::Table { rows, .. } => {
                for cell in rows.iter().flatten() {
                    collect(cell, out);
                }
            }
            Self::Divider | Self::Empty => {}
        }
    }
}
