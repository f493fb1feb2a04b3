//! HTML backend for render trees.
//!
//! Produces semantic HTML5 output suitable for web display.

use std::fmt::Write;

use crate::document::{Annotations, Color};
use crate::node::{RenderNode, TextLeaf};

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render sibling nodes to HTML.
///
/// Adjacent list items of the same kind are grouped into one `<ul>` or
/// `<ol>`; a numbered run starts at the position of its first item.
#[must_use]
pub fn render_html(nodes: &[RenderNode]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bulleted,
    Numbered,
    ToDo,
}

impl ListKind {
    fn of(node: &RenderNode) -> Option<Self> {
        match node {
            RenderNode::BulletedItem { .. } => Some(Self::Bulleted),
            RenderNode::NumberedItem { .. } => Some(Self::Numbered),
            RenderNode::ToDo { .. } => Some(Self::ToDo),
            _ => None,
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            Self::Bulleted | Self::ToDo => "</ul>",
            Self::Numbered => "</ol>",
        }
    }
}

fn write_nodes(nodes: &[RenderNode], out: &mut String) {
    let mut open: Option<ListKind> = None;
    for node in nodes {
        let kind = ListKind::of(node);
        if open != kind
            && let Some(list) = open.take()
        {
            out.push_str(list.close_tag());
        }
        if open.is_none() {
            match (kind, node) {
                (Some(ListKind::Bulleted), _) => out.push_str("<ul>"),
                (Some(ListKind::ToDo), _) => out.push_str(r#"<ul class="todo-list">"#),
                (Some(ListKind::Numbered), RenderNode::NumberedItem { position, .. }) => {
                    if *position == 1 {
                        out.push_str("<ol>");
                    } else {
                        let _ = write!(out, r#"<ol start="{position}">"#);
                    }
                }
                _ => {}
            }
            open = kind;
        }
        write_node(node, out);
    }
    if let Some(list) = open {
        out.push_str(list.close_tag());
    }
}

fn write_node(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::Text(leaf) => write_leaf(leaf, out),
        RenderNode::Paragraph { content, children } => {
            out.push_str("<p>");
            write_nodes(content, out);
            out.push_str("</p>");
            write_indented(children, out);
        }
        RenderNode::Heading {
            level,
            content,
            children,
        } => {
            let _ = write!(out, "<h{level}>");
            write_nodes(content, out);
            let _ = write!(out, "</h{level}>");
            write_indented(children, out);
        }
        RenderNode::BulletedItem { content, children }
        | RenderNode::NumberedItem {
            content, children, ..
        } => {
            out.push_str("<li>");
            write_nodes(content, out);
            write_nodes(children, out);
            out.push_str("</li>");
        }
        RenderNode::ToDo {
            checked,
            content,
            children,
        } => {
            out.push_str(r#"<li><input type="checkbox" disabled"#);
            if *checked {
                out.push_str(" checked");
            }
            out.push_str("> ");
            write_nodes(content, out);
            write_nodes(children, out);
            out.push_str("</li>");
        }
        RenderNode::Quote { content, children } => {
            out.push_str("<blockquote>");
            write_nodes(content, out);
            write_nodes(children, out);
            out.push_str("</blockquote>");
        }
        RenderNode::Code {
            language,
            content,
            caption,
        } => {
            let _ = write!(
                out,
                r#"<pre><code class="language-{}">"#,
                escape_html(language)
            );
            for text in content {
                if let RenderNode::Text(leaf) = text {
                    out.push_str(&escape_html(&leaf.text));
                }
            }
            out.push_str("</code></pre>");
            if !caption.is_empty() {
                out.push_str(r#"<p class="code-caption">"#);
                write_nodes(caption, out);
                out.push_str("</p>");
            }
        }
        RenderNode::Image { url, caption } => {
            let alt: String = caption.iter().map(RenderNode::plain_text).collect();
            let _ = write!(
                out,
                r#"<figure><img src="{}" alt="{}">"#,
                escape_html(url),
                escape_html(&alt)
            );
            if !caption.is_empty() {
                out.push_str("<figcaption>");
                write_nodes(caption, out);
                out.push_str("</figcaption>");
            }
            out.push_str("</figure>");
        }
        RenderNode::Divider => out.push_str("<hr>"),
        RenderNode::Table {
            has_column_header,
            has_row_header,
            rows,
            ..
        } => {
            out.push_str("<table><tbody>");
            for (r, row) in rows.iter().enumerate() {
                out.push_str("<tr>");
                for (c, cell) in row.iter().enumerate() {
                    let header = (*has_column_header && r == 0) || (*has_row_header && c == 0);
                    let tag = if header { "th" } else { "td" };
                    let _ = write!(out, "<{tag}>");
                    write_nodes(cell, out);
                    let _ = write!(out, "</{tag}>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table>");
        }
        RenderNode::Empty => {}
    }
}

/// Nested blocks of a paragraph or heading, which cannot hold them inline.
fn write_indented(children: &[RenderNode], out: &mut String) {
    if children.is_empty() {
        return;
    }
    out.push_str(r#"<div class="indented">"#);
    write_nodes(children, out);
    out.push_str("</div>");
}

fn write_leaf(leaf: &TextLeaf, out: &mut String) {
    let mut html = escape_html(&leaf.text);
    for (flag, tag) in [
        (Annotations::CODE, "code"),
        (Annotations::UNDERLINE, "u"),
        (Annotations::STRIKETHROUGH, "s"),
        (Annotations::ITALIC, "em"),
        (Annotations::BOLD, "strong"),
    ] {
        if leaf.annotations.contains(flag) {
            html = format!("<{tag}>{html}</{tag}>");
        }
    }
    if leaf.color != Color::Default {
        html = format!(
            r#"<span class="color-{}">{html}</span>"#,
            leaf.color.as_tag().replace('_', "-")
        );
    }
    if let Some(link) = &leaf.link {
        html = format!(r#"<a href="{}">{html}</a>"#, escape_html(link));
    }
    out.push_str(&html);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, BlockKind, RichTextSpan};
    use crate::registry::BlockRendererRegistry;
    use pretty_assertions::assert_eq;

    fn render_blocks(blocks: &[Block]) -> String {
        render_html(&BlockRendererRegistry::new().render_blocks(blocks))
    }

    fn text_block(kind: fn(Vec<RichTextSpan>) -> BlockKind, text: &str) -> Block {
        Block::new("b", kind(vec![RichTextSpan::plain(text)]))
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_paragraph_with_formatting() {
        let block = Block::new(
            "p",
            BlockKind::Paragraph {
                rich_text: vec![
                    RichTextSpan::plain("Read "),
                    RichTextSpan::plain("docs")
                        .with_annotations(Annotations::BOLD | Annotations::ITALIC)
                        .with_link("https://example.com/?a=1&b=2"),
                    RichTextSpan::plain("!").with_color(Color::RedBackground),
                ],
            },
        );
        assert_eq!(
            render_blocks(&[block]),
            concat!(
                "<p>Read ",
                r#"<a href="https://example.com/?a=1&amp;b=2"><strong><em>docs</em></strong></a>"#,
                r#"<span class="color-red-background">!</span></p>"#
            )
        );
    }

    #[test]
    fn test_nested_blocks_under_paragraph_and_heading() {
        let blocks = vec![
            text_block(|rich_text| BlockKind::Paragraph { rich_text }, "parent")
                .with_children(vec![text_block(
                    |rich_text| BlockKind::Paragraph { rich_text },
                    "nested",
                )]),
            text_block(|rich_text| BlockKind::Heading2 { rich_text }, "toggle").with_children(
                vec![text_block(
                    |rich_text| BlockKind::BulletedListItem { rich_text },
                    "inside",
                )],
            ),
        ];
        assert_eq!(
            render_blocks(&blocks),
            concat!(
                r#"<p>parent</p><div class="indented"><p>nested</p></div>"#,
                r#"<h2>toggle</h2><div class="indented"><ul><li>inside</li></ul></div>"#
            )
        );
    }

    #[test]
    fn test_list_items_are_grouped() {
        let blocks = vec![
            text_block(|rich_text| BlockKind::BulletedListItem { rich_text }, "a"),
            text_block(|rich_text| BlockKind::BulletedListItem { rich_text }, "b"),
            text_block(|rich_text| BlockKind::NumberedListItem { rich_text }, "one"),
            text_block(|rich_text| BlockKind::NumberedListItem { rich_text }, "two"),
            text_block(|rich_text| BlockKind::Paragraph { rich_text }, "end"),
        ];
        assert_eq!(
            render_blocks(&blocks),
            "<ul><li>a</li><li>b</li></ul><ol><li>one</li><li>two</li></ol><p>end</p>"
        );
    }

    #[test]
    fn test_empty_heading() {
        let block = Block::new("h", BlockKind::Heading2 { rich_text: vec![] });
        assert_eq!(render_blocks(&[block]), "<h2></h2>");
    }

    #[test]
    fn test_code_block_is_escaped() {
        let block = Block::new(
            "c",
            BlockKind::Code {
                language: "html".to_owned(),
                rich_text: vec![RichTextSpan::plain("<b>")],
                caption: vec![],
            },
        );
        assert_eq!(
            render_blocks(&[block]),
            r#"<pre><code class="language-html">&lt;b&gt;</code></pre>"#
        );
    }

    #[test]
    fn test_table_headers() {
        let row = |a: &str, b: &str| {
            Block::new(
                "r",
                BlockKind::TableRow {
                    cells: vec![vec![RichTextSpan::plain(a)], vec![RichTextSpan::plain(b)]],
                },
            )
        };
        let table = Block::new(
            "t",
            BlockKind::Table {
                column_count: 2,
                has_column_header: true,
                has_row_header: false,
            },
        )
        .with_children(vec![row("Name", "Role"), row("Ada", "Eng")]);
        assert_eq!(
            render_blocks(&[table]),
            concat!(
                "<table><tbody>",
                "<tr><th>Name</th><th>Role</th></tr>",
                "<tr><td>Ada</td><td>Eng</td></tr>",
                "</tbody></table>"
            )
        );
    }

    #[test]
    fn test_image_and_unsupported() {
        let blocks = vec![
            Block::new(
                "i",
                BlockKind::Image {
                    url: "https://img/x.png".to_owned(),
                    caption: vec![RichTextSpan::plain("A cat")],
                },
            ),
            Block::new("u", BlockKind::unsupported("embed")),
            Block::new("d", BlockKind::Divider),
        ];
        assert_eq!(
            render_blocks(&blocks),
            r#"<figure><img src="https://img/x.png" alt="A cat"><figcaption>A cat</figcaption></figure><hr>"#
        );
    }

    #[test]
    fn test_todo_list() {
        let block = Block::new(
            "t",
            BlockKind::ToDo {
                rich_text: vec![RichTextSpan::plain("ship")],
                checked: true,
            },
        );
        assert_eq!(
            render_blocks(&[block]),
            r#"<ul class="todo-list"><li><input type="checkbox" disabled checked> ship</li></ul>"#
        );
    }
}
