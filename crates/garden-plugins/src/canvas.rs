//! Canvas embedding.
//!
//! Links and images pointing at a canvas file (`[Board](board.canvas)`) are
//! replaced with a container carrying the canvas JSON for client-side
//! rendering:
//!
//! ```html
//! <div class="canvas-embed" data-canvas-name="board" data-canvas="{...}"></div>
//! ```
//!
//! Unresolvable targets leave the node untouched and record a diagnostic.

use std::path::Path;
use std::sync::Arc;

use garden_renderer::{
    Diagnostic, DiagnosticKind, Document, Node, Rewrite, Transform, TransformContext, escape_attr,
    escape_html,
};

use crate::resolve::{
    FsSource, LookupContext, ResolverChain, ResourceSource, is_remote, target_path,
};

const PLUGIN: &str = "canvas";

/// Extensions matched when none are configured.
const DEFAULT_EXTENSIONS: [&str; 2] = ["canvas", "json"];

/// Replaces links and images to canvas files with an embed container.
pub struct CanvasEmbed {
    extensions: Vec<String>,
    chain: ResolverChain,
    source: Arc<dyn ResourceSource>,
}

impl CanvasEmbed {
    /// Create the plugin with the `canvas` and `json` extensions, the default
    /// lookup order and filesystem access.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_owned()).collect(),
            chain: ResolverChain::with_media(),
            source: Arc::new(FsSource),
        }
    }

    /// Set the file extensions (without leading dot) treated as canvases.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the lookup order.
    #[must_use]
    pub fn with_chain(mut self, chain: ResolverChain) -> Self {
        self.chain = chain;
        self
    }

    /// Read canvases from `source` instead of the filesystem.
    #[must_use]
    pub fn with_source(mut self, source: impl ResourceSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Whether `target` names a canvas file.
    #[must_use]
    pub fn matches(&self, target: &str) -> bool {
        if is_remote(target) {
            return false;
        }
        let Some((_, extension)) = target_path(target).rsplit_once('.') else {
            return false;
        };
        self.extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(extension))
    }

    fn load(&self, path: &Path) -> Option<serde_json::Value> {
        let bytes = self.source.read(path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping unparsable canvas");
                None
            }
        }
    }
}

impl Default for CanvasEmbed {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for CanvasEmbed {
    fn name(&self) -> &'static str {
        PLUGIN
    }

    fn apply(&self, document: &mut Document, ctx: &mut TransformContext) -> usize {
        let document_dir = document.dir().to_path_buf();
        let content_root = ctx.content_root().to_path_buf();
        let media_dir = ctx.media_dir().to_path_buf();
        let lookup = LookupContext {
            document_dir: &document_dir,
            content_root: &content_root,
            media_dir: &media_dir,
        };

        document.rewrite(|node| {
            let Some(target) = canvas_target(self, node) else {
                return Rewrite::Keep;
            };

            match self.chain.resolve_with(&lookup, target, |path| self.load(path)) {
                Some((path, canvas)) => {
                    tracing::debug!(target = %target, path = %path.display(), "Embedding canvas");
                    Rewrite::Embed(render_canvas(&canvas_name(&path), &canvas))
                }
                None => {
                    ctx.report(Diagnostic::new(
                        PLUGIN,
                        target,
                        DiagnosticKind::Unresolved,
                        "no readable canvas at any candidate path",
                    ));
                    Rewrite::Keep
                }
            }
        })
    }
}

fn canvas_target<'a>(plugin: &CanvasEmbed, node: &'a Node) -> Option<&'a str> {
    if !(node.is_link() || node.is_image()) {
        return None;
    }
    node.destination().filter(|target| plugin.matches(target))
}

fn canvas_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Render the embed container for a parsed canvas.
#[must_use]
pub fn render_canvas(name: &str, canvas: &serde_json::Value) -> String {
    format!(
        r#"<div class="canvas-embed" data-canvas-name="{}" data-canvas="{}"></div>"#,
        escape_html(name),
        escape_attr(&canvas.to_string()),
    )
}
