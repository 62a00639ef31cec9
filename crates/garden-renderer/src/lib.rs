//! Markdown document tree and transform pipeline for Garden.
//!
//! This crate parses markdown into a [`Document`]: a tree of [`Node`]s built
//! from pulldown-cmark events, plus the file path and its front matter.
//! [`Transform`] implementations rewrite matching nodes into raw HTML
//! fragments, and a [`Pipeline`] runs them in order before emitting HTML.
//!
//! # Architecture
//!
//! - [`Document::rewrite`] visits the tree depth-first and replaces each
//!   matched node with exactly one fragment node, so every parent keeps the
//!   same number of children.
//! - [`TransformContext`] carries per-document state (block counter, issued
//!   DOM ids, diagnostics). A fresh context is created for every file.
//! - Failures inside transforms are reported as [`Diagnostic`]s rather than
//!   errors; the original node is left in place.
//!
//! # Example
//!
//! ```
//! use garden_renderer::{Document, Pipeline, Rewrite, Transform, TransformContext};
//!
//! struct Shout;
//!
//! impl Transform for Shout {
//!     fn name(&self) -> &'static str {
//!         "shout"
//!     }
//!
//!     fn apply(&self, document: &mut Document, _ctx: &mut TransformContext) -> usize {
//!         document.rewrite(|node| {
//!             if node.is_image() {
//!                 Rewrite::Inline("<b>IMAGE</b>".to_owned())
//!             } else {
//!                 Rewrite::Keep
//!             }
//!         })
//!     }
//! }
//!
//! let pipeline = Pipeline::new().with_transform(Shout);
//! let document = Document::parse("page.md", "See ![x](x.png)");
//! let mut ctx = TransformContext::new(".");
//! let result = pipeline.render(document, &mut ctx);
//! assert_eq!(result.html, "<p>See <b>IMAGE</b></p>\n");
//! ```

mod code_block;
mod document;
mod escape;
mod front_matter;
pub mod highlight;
mod pipeline;
mod transform;

pub use code_block::{FencedCode, parse_fence_info};
pub use document::{Document, Node, Rewrite, markdown_to_html, parser_options};
pub use escape::{escape_attr, escape_html};
pub use front_matter::FrontMatter;
pub use pipeline::{Pipeline, RenderResult};
pub use transform::{Diagnostic, DiagnosticKind, Transform, TransformContext};
