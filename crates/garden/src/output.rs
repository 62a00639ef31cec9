//! Colored terminal output on stderr, keeping stdout free for `garden render`.

use std::path::Path;

use console::{Style, Term};
use garden_renderer::Diagnostic;

use crate::site::BuildSummary;

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    err: Style,
    plugin: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            err: Style::new().red().bold(),
            plugin: Style::new().cyan(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.ok.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.err.apply_to(msg).to_string());
    }

    /// Print an embed diagnostic, prefixed with the page when known.
    pub(crate) fn diagnostic(&self, page: Option<&Path>, diagnostic: &Diagnostic) {
        let location = page.map(|p| format!("{}: ", p.display())).unwrap_or_default();
        self.line(&format!(
            "{}{} {}",
            location,
            self.plugin.apply_to(format!("[{}]", diagnostic.plugin)),
            self.warn.apply_to(format!(
                "{} {}: {}",
                diagnostic.kind, diagnostic.target, diagnostic.message
            )),
        ));
    }

    /// Print the end-of-build counts.
    pub(crate) fn summary(&self, summary: &BuildSummary) {
        self.success(&format!(
            "Built {} page(s), skipped {} unpublished, copied {} asset(s)",
            summary.pages_written, summary.skipped, summary.assets_copied
        ));
        let issues = summary.diagnostics.len();
        if issues > 0 {
            let msg = format!("{issues} embed issue(s) reported");
            self.line(&self.warn.apply_to(msg).to_string());
        }
    }
}
