//! Notebook to HTML.

use std::fmt::Write;
use std::sync::LazyLock;

use garden_renderer::{escape_html, highlight::highlight_code, markdown_to_html};
use regex::Regex;
use serde_json::{Map, Value};

use super::model::{Cell, Notebook, Output, join_text};

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid ANSI pattern"));

/// Render a notebook as an embed block.
///
/// Cells are rendered in order, one `notebook-cell` block each. Code cells
/// are labelled `In [n]:` with `n` counting code cells from 1.
#[must_use]
pub fn render_notebook(name: &str, notebook: &Notebook) -> String {
    let name = escape_html(name);
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="notebook-embed" data-notebook="{name}"><div class="notebook-header">{name}</div><div class="notebook-content">"#
    );

    let language = notebook.language();
    let mut code_count = 0;
    for cell in &notebook.cells {
        match cell {
            Cell::Markdown { source } => {
                let _ = write!(
                    html,
                    r#"<div class="notebook-cell markdown-cell">{}</div>"#,
                    markdown_to_html(source)
                );
            }
            Cell::Code { source, outputs } => {
                code_count += 1;
                render_code_cell(&mut html, code_count, language, source, outputs);
            }
            Cell::Raw { source } => {
                let _ = write!(
                    html,
                    r#"<div class="notebook-cell raw-cell"><pre>{}</pre></div>"#,
                    escape_html(source)
                );
            }
            Cell::Unknown => html.push_str(r#"<div class="notebook-cell unknown-cell"></div>"#),
        }
    }

    html.push_str("</div></div>");
    html
}

fn render_code_cell(html: &mut String, n: usize, language: &str, source: &str, outputs: &[Value]) {
    let _ = write!(
        html,
        concat!(
            r#"<div class="notebook-cell code-cell">"#,
            r#"<div class="cell-input"><div class="input-label">In [{n}]:</div>"#,
            r#"<div class="input-code">{code}</div></div>"#,
        ),
        n = n,
        code = highlight_code(language, source),
    );

    if !outputs.is_empty() {
        html.push_str(r#"<div class="cell-outputs">"#);
        for output in outputs {
            render_output(html, n, &Output::from_value(output));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
}

fn render_output(html: &mut String, n: usize, output: &Output) {
    match output {
        Output::Stream { name, text } => {
            let _ = write!(
                html,
                r#"<div class="cell-output"><pre class="output-stream stream-{}">{}</pre></div>"#,
                escape_html(name),
                escape_html(text)
            );
        }
        Output::ExecuteResult { data } => match render_mime_bundle(data) {
            Some(body) => {
                let _ = write!(
                    html,
                    r#"<div class="cell-output"><div class="output-label">Out [{n}]:</div><div class="output-result">{body}</div></div>"#
                );
            }
            None => render_unknown(html, &bundle_value(data)),
        },
        Output::DisplayData { data } => match render_mime_bundle(data) {
            Some(body) => {
                let _ = write!(
                    html,
                    r#"<div class="cell-output"><div class="output-display">{body}</div></div>"#
                );
            }
            None => render_unknown(html, &bundle_value(data)),
        },
        Output::Error {
            ename,
            evalue,
            traceback,
        } => {
            let traceback = strip_ansi(&traceback.join("\n"));
            let _ = write!(
                html,
                concat!(
                    r#"<div class="cell-output output-error">"#,
                    r#"<pre class="output-error-header">{}: {}</pre>"#,
                    r#"<pre class="output-traceback">{}</pre></div>"#,
                ),
                escape_html(ename),
                escape_html(&strip_ansi(evalue)),
                escape_html(&traceback),
            );
        }
        Output::Unknown(value) => render_unknown(html, value),
    }
}

/// Pick the richest supported representation: HTML, then PNG, then text.
///
/// `text/html` is trusted and inserted verbatim.
fn render_mime_bundle(data: &Map<String, Value>) -> Option<String> {
    if let Some(markup) = data.get("text/html").and_then(join_text) {
        return Some(format!(r#"<div class="output-html">{markup}</div>"#));
    }
    if let Some(png) = data.get("image/png").and_then(join_text) {
        let png: String = png.chars().filter(|c| !c.is_whitespace()).collect();
        return Some(format!(
            r#"<img class="output-image" src="data:image/png;base64,{}" alt="output">"#,
            escape_html(&png)
        ));
    }
    let text = data.get("text/plain").and_then(join_text)?;
    Some(format!(
        r#"<pre class="output-text">{}</pre>"#,
        escape_html(&text)
    ))
}

fn bundle_value(data: &Map<String, Value>) -> Value {
    Value::Object(data.clone())
}

fn render_unknown(html: &mut String, value: &Value) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let _ = write!(
        html,
        r#"<div class="cell-output"><pre class="output-unknown">{}</pre></div>"#,
        escape_html(&pretty)
    );
}

fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}
