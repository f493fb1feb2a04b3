//! HTML page template for static site generation.

use std::fmt::Write;

use folio_renderer::{BlockRendererRegistry, escape_html, render_html};
use folio_site::Page;

/// Render a complete static HTML page.
///
/// The page body is the rendered block content followed by links to the
/// page's direct subpages. Links are root-relative (`/<slug>/`).
pub(crate) fn render_page(page: &Page, registry: &BlockRendererRegistry) -> String {
    let mut html = String::with_capacity(4096);
    let title = escape_html(&page.title);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str("</head>\n<body>\n<main>\n");

    if !page.title.is_empty() {
        let _ = writeln!(html, "<h1 class=\"page-title\">{title}</h1>");
    }

    html.push_str("<article>");
    html.push_str(&render_html(&registry.render_blocks(&page.blocks)));
    html.push_str("</article>\n");

    if !page.child_pages.is_empty() {
        html.push_str("<nav class=\"child-pages\">\n<ul>\n");
        for child in &page.child_pages {
            let label = if child.title.is_empty() {
                &child.slug
            } else {
                &child.title
            };
            let _ = writeln!(
                html,
                "<li><a href=\"/{}/\">{}</a></li>",
                escape_html(&child.slug),
                escape_html(label)
            );
        }
        html.push_str("</ul>\n</nav>\n");
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}
