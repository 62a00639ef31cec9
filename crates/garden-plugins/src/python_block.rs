//! Runnable Python code blocks.
//!
//! Fenced blocks tagged with the run marker become an interactive block:
//!
//! ````markdown
//! ```python-run title="Squares"
//! print([i * i for i in range(5)])
//! ```
//! ````
//!
//! The source is passed to `copyCode` and `runPythonCode` in the companion
//! script as a JavaScript template literal inside an `onclick` attribute.

use garden_renderer::{
    Document, FencedCode, Rewrite, Transform, TransformContext, escape_attr, escape_html,
    highlight::highlight_code,
};

use crate::random_hex;

/// Default fence language that marks a runnable block.
pub const DEFAULT_MARKER: &str = "python-run";

const ID_SUFFIX_LEN: usize = 6;
const DEFAULT_LABEL: &str = "Python";

/// Replaces marked fenced blocks with interactive Python blocks.
#[derive(Clone, Debug)]
pub struct PythonBlocks {
    marker: String,
}

impl PythonBlocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_owned(),
        }
    }

    /// Set the fence language that marks runnable blocks.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }
}

impl Default for PythonBlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for PythonBlocks {
    fn name(&self) -> &'static str {
        "python-blocks"
    }

    fn apply(&self, document: &mut Document, ctx: &mut TransformContext) -> usize {
        document.rewrite(|node| {
            let Some(code) = FencedCode::from_node(node).filter(|c| c.language == self.marker)
            else {
                return Rewrite::Keep;
            };
            let index = ctx.next_block_index();
            let id = ctx.unique_id(|| format!("py-{index}-{}", random_hex(ID_SUFFIX_LEN)));
            let label = code
                .attrs
                .get("title")
                .map_or(DEFAULT_LABEL, String::as_str);
            Rewrite::Block(render_block(&id, label, &code.source))
        })
    }
}

/// Escape code for a JavaScript template literal.
///
/// Backslashes are escaped first so the escapes added for backticks and
/// dollar signs are not doubled.
#[must_use]
pub fn escape_template_literal(code: &str) -> String {
    code.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace('$', "\\$")
}

fn render_block(id: &str, label: &str, source: &str) -> String {
    let literal = escape_attr(&escape_template_literal(source));
    format!(
        concat!(
            r#"<div class="python-block" id="{id}" data-python-block="{id}">"#,
            r#"<div class="python-toolbar"><span class="python-label">{label}</span>"#,
            r#"<button type="button" class="python-copy" onclick="copyCode(`{literal}`)">Copy</button>"#,
            r#"<button type="button" class="python-run" onclick="runPythonCode(`{literal}`, document.getElementById('{id}-output'))">Run</button>"#,
            "</div>",
            r#"<div class="python-editor">{code}</div>"#,
            r#"<details class="python-output-region"><summary>Output</summary>"#,
            r#"<pre id="{id}-output" class="python-output"></pre></details>"#,
            "</div>\n",
        ),
        id = id,
        label = escape_html(label),
        literal = literal,
        code = highlight_code("python", source),
    )
}
