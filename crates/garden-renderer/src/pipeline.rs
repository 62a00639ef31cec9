//! Ordered transform pipeline and HTML emission.

use crate::document::Document;
use crate::front_matter::FrontMatter;
use crate::transform::{Diagnostic, Transform, TransformContext};

/// Output of rendering one document.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML body.
    pub html: String,
    /// Page title: front matter `title`, else first H1, else file stem.
    pub title: String,
    /// Parsed front matter.
    pub front_matter: FrontMatter,
    /// Embeds skipped during the transform passes.
    pub diagnostics: Vec<Diagnostic>,
}

/// Ordered list of transforms applied before HTML emission.
#[derive(Default)]
pub struct Pipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform. Transforms run in insertion order.
    #[must_use]
    pub fn with_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Names of the registered transforms, in order.
    #[must_use]
    pub fn transform_names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Run every transform over `document`.
    ///
    /// Returns the total number of replaced nodes.
    pub fn apply(&self, document: &mut Document, ctx: &mut TransformContext) -> usize {
        self.transforms
            .iter()
            .map(|transform| {
                let replaced = transform.apply(document, ctx);
                tracing::debug!(
                    transform = transform.name(),
                    path = %document.path().display(),
                    replaced,
                    "Applied transform"
                );
                replaced
            })
            .sum()
    }

    /// Transform `document` and emit HTML.
    pub fn render(&self, mut document: Document, ctx: &mut TransformContext) -> RenderResult {
        self.apply(&mut document, ctx);

        let title = document
            .front_matter()
            .title
            .clone()
            .or_else(|| document.first_heading())
            .unwrap_or_else(|| {
                document
                    .path()
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
        let front_matter = document.front_matter().clone();

        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, document.into_events().into_iter());

        RenderResult {
            html,
            title,
            front_matter,
            diagnostics: ctx.take_diagnostics(),
        }
    }

    /// Parse and render markdown in one step.
    pub fn render_markdown(
        &self,
        path: impl Into<std::path::PathBuf>,
        markdown: &str,
        ctx: &mut TransformContext,
    ) -> RenderResult {
        self.render(Document::parse(path, markdown), ctx)
    }
}
