//! Rich text span rendering.

use crate::document::{Annotations, Color, RichTextSpan};
use crate::node::{RenderNode, TextLeaf};

/// Turns rich text spans into text leaves.
///
/// One leaf per span, in order, with no merging or splitting. Spans with
/// empty text and no link are dropped; an empty span with a link still
/// renders as a zero-width anchor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RichTextRenderer;

impl RichTextRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Render spans with their full formatting.
    #[must_use]
    pub fn render(&self, spans: &[RichTextSpan]) -> Vec<RenderNode> {
        spans
            .iter()
            .filter(|span| !is_degenerate(span))
            .map(|span| {
                RenderNode::Text(TextLeaf {
                    text: span.text.clone(),
                    annotations: span.annotations,
                    color: span.color,
                    link: span.link.clone(),
                })
            })
            .collect()
    }

    /// Render spans as code: only the code flag survives, links and colours
    /// are dropped.
    #[must_use]
    pub fn render_code(&self, spans: &[RichTextSpan]) -> Vec<RenderNode> {
        spans
            .iter()
            .filter(|span| !span.text.is_empty())
            .map(|span| {
                RenderNode::Text(TextLeaf {
                    text: span.text.clone(),
                    annotations: span.annotations & Annotations::CODE,
                    color: Color::Default,
                    link: None,
                })
            })
            .collect()
    }
}

fn is_degenerate(span: &RichTextSpan) -> bool {
    span.text.is_empty() && span.link.is_none()
}
