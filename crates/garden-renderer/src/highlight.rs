//! Syntax highlighting for code shown in embeds.

use std::sync::LazyLock;

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::escape::escape_html;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME_NAME: &str = "InspiredGitHub";

fn theme() -> Option<&'static Theme> {
    THEME_SET
        .themes
        .get(THEME_NAME)
        .or_else(|| THEME_SET.themes.values().next())
}

/// Highlight `source` as `language` and return a `<pre>` block.
///
/// Unknown languages (and highlighter failures) fall back to
/// `<pre><code class="language-LANG">` with escaped source.
#[must_use]
pub fn highlight_code(language: &str, source: &str) -> String {
    let syntax = SYNTAX_SET.find_syntax_by_token(language);
    if let (Some(syntax), Some(theme)) = (syntax, theme()) {
        match highlighted_html_for_string(source, &SYNTAX_SET, syntax, theme) {
            Ok(html) => return html,
            Err(e) => tracing::debug!(language, error = %e, "Highlighting failed"),
        }
    }
    plain_code(language, source)
}

fn plain_code(language: &str, source: &str) -> String {
    if language.is_empty() {
        format!("<pre><code>{}</code></pre>", escape_html(source))
    } else {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_html(language),
            escape_html(source)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_language_is_highlighted() {
        let html = highlight_code("python", "print(\"hi\")\n");
        assert!(html.starts_with("<pre"));
        assert!(html.contains("<span"));
        assert!(html.contains("print"));
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let html = highlight_code("not-a-language", "a < b");
        assert_eq!(
            html,
            "<pre><code class=\"language-not-a-language\">a &lt; b</code></pre>"
        );
    }

    #[test]
    fn test_highlighted_output_escapes_source() {
        let html = highlight_code("python", "x = '<script>'\n");
        assert!(!html.contains("<script>"));
    }
}
