//! HTML page shell for built pages.

use std::fmt::Write;

use garden_plugins::companion::{CSS_FILENAME, JS_FILENAME};
use garden_renderer::escape_html;

/// Directory (relative to the output root) holding the companion assets.
pub(crate) const ASSETS_DIR: &str = "_garden";

/// Data for rendering one page.
pub(crate) struct PageData<'a> {
    pub title: &'a str,
    pub tags: &'a [String],
    pub html_content: &'a str,
    /// Relative prefix from the page to the output root (`""`, `"../"`, ...).
    pub root_prefix: &'a str,
}

/// Render a complete page linking the companion assets.
pub(crate) fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(page.html_content.len() + 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(page.title));
    if !page.tags.is_empty() {
        let _ = writeln!(
            html,
            "<meta name=\"keywords\" content=\"{}\">",
            escape_html(&page.tags.join(", "))
        );
    }
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{}{ASSETS_DIR}/{CSS_FILENAME}\">",
        page.root_prefix
    );
    let _ = writeln!(
        html,
        "<script defer src=\"{}{ASSETS_DIR}/{JS_FILENAME}\"></script>",
        page.root_prefix
    );
    html.push_str("</head>\n<body>\n<main class=\"garden-page\">\n<article>\n");
    html.push_str(page.html_content);
    html.push_str("\n</article>\n</main>\n</body>\n</html>\n");
    html
}

/// Relative prefix from a page at `rel_path` back to the output root.
pub(crate) fn root_prefix(rel_path: &std::path::Path) -> String {
    let depth = rel_path.components().count().saturating_sub(1);
    "../".repeat(depth)
}
