//! Transform trait and per-document context.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::document::Document;

/// A pass that rewrites nodes of a [`Document`].
///
/// Transforms hold only configuration. All per-document state lives in the
/// [`TransformContext`] passed to [`apply`](Self::apply), so one instance can
/// serve many documents concurrently.
pub trait Transform: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Rewrite matching nodes. Returns the number of replaced nodes.
    fn apply(&self, document: &mut Document, ctx: &mut TransformContext) -> usize;
}

/// Why an embed was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// No candidate location held the resource.
    Unresolved,
    /// The resource was found but could not be parsed.
    Malformed,
    /// The resource is remote and could not be obtained.
    Unavailable,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unresolved => "unresolved",
            Self::Malformed => "malformed",
            Self::Unavailable => "unavailable",
        })
    }
}

/// A skipped embed, reported instead of failing the render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the transform that skipped the node.
    pub plugin: &'static str,
    /// Link or image target as written in the source.
    pub target: String,
    /// Failure category.
    pub kind: DiagnosticKind,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(
        plugin: &'static str,
        target: impl Into<String>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            plugin,
            target: target.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.plugin, self.kind, self.target, self.message
        )
    }
}

/// State for transforming one document.
///
/// Create a fresh context per file: the block counter restarts at zero and
/// DOM ids only need to be unique within one page.
#[derive(Debug)]
pub struct TransformContext {
    content_root: PathBuf,
    media_dir: PathBuf,
    block_counter: usize,
    issued_ids: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl TransformContext {
    /// Create a context for a document under `content_root`.
    ///
    /// The media directory defaults to `{content_root}/media`.
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        let content_root = content_root.into();
        let media_dir = content_root.join("media");
        Self {
            content_root,
            media_dir,
            block_counter: 0,
            issued_ids: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Override the media directory.
    #[must_use]
    pub fn with_media_dir(mut self, media_dir: impl Into<PathBuf>) -> Self {
        self.media_dir = media_dir.into();
        self
    }

    #[must_use]
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    #[must_use]
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Return the current block index and advance the counter.
    pub fn next_block_index(&mut self) -> usize {
        let index = self.block_counter;
        self.block_counter += 1;
        index
    }

    /// Issue a DOM id that has not been issued for this document yet.
    ///
    /// Calls `generate` until it yields an unused id.
    pub fn unique_id(&mut self, mut generate: impl FnMut() -> String) -> String {
        loop {
            let id = generate();
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
            tracing::debug!(id = %id, "DOM id collision, regenerating");
        }
    }

    /// Record a skipped embed and log it.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            plugin = diagnostic.plugin,
            target = %diagnostic.target,
            kind = %diagnostic.kind,
            error = %diagnostic.message,
            "Embed skipped"
        );
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_dir_defaults_under_root() {
        let ctx = TransformContext::new("content");
        assert_eq!(ctx.content_root(), Path::new("content"));
        assert_eq!(ctx.media_dir(), Path::new("content/media"));
    }

    #[test]
    fn test_with_media_dir() {
        let ctx = TransformContext::new("content").with_media_dir("assets");
        assert_eq!(ctx.media_dir(), Path::new("assets"));
    }

    #[test]
    fn test_block_counter_starts_at_zero() {
        let mut ctx = TransformContext::new(".");
        assert_eq!(ctx.next_block_index(), 0);
        assert_eq!(ctx.next_block_index(), 1);
        assert_eq!(ctx.next_block_index(), 2);
    }

    #[test]
    fn test_block_counter_is_per_context() {
        let mut first = TransformContext::new(".");
        first.next_block_index();
        first.next_block_index();

        let mut second = TransformContext::new(".");
        assert_eq!(second.next_block_index(), 0);
    }

    #[test]
    fn test_unique_id_regenerates_on_collision() {
        let mut ctx = TransformContext::new(".");
        let mut candidates = vec!["b", "a", "a"];
        let mut next = move || candidates.pop().unwrap_or_default().to_owned();

        assert_eq!(ctx.unique_id(&mut next), "a");
        assert_eq!(ctx.unique_id(&mut next), "b");
    }

    #[test]
    fn test_report_and_take_diagnostics() {
        let mut ctx = TransformContext::new(".");
        ctx.report(Diagnostic::new(
            "canvas",
            "board.canvas",
            DiagnosticKind::Unresolved,
            "no candidate path exists",
        ));

        assert_eq!(ctx.diagnostics().len(), 1);
        let taken = ctx.take_diagnostics();
        assert_eq!(taken[0].kind, DiagnosticKind::Unresolved);
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::new(
            "notebook",
            "nb.ipynb",
            DiagnosticKind::Malformed,
            "expected value at line 1",
        );
        assert_eq!(
            diagnostic.to_string(),
            "[notebook] malformed nb.ipynb: expected value at line 1"
        );
    }
}
