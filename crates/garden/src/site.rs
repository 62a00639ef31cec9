//! Static site build.
//!
//! Pages are rendered in parallel, each with its own transform context, so
//! block ids and diagnostics never leak between documents.

use std::fs;
use std::path::{Path, PathBuf};

use garden_config::Config;
use garden_renderer::{Diagnostic, Pipeline, RenderResult};
use rayon::prelude::*;

use crate::plugins;
use crate::scanner::{ContentEntry, EntryKind, Scanner};
use crate::template::{self, ASSETS_DIR, PageData};

/// Error during site build.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BuildError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}

impl BuildError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Diagnostic tagged with the page that produced it.
#[derive(Debug)]
pub(crate) struct PageDiagnostic {
    pub page: PathBuf,
    pub diagnostic: Diagnostic,
}

/// Counts reported after a build.
#[derive(Debug, Default)]
pub(crate) struct BuildSummary {
    pub pages_written: usize,
    /// Pages with `draft: true` or `publish: false`.
    pub skipped: usize,
    pub assets_copied: usize,
    pub diagnostics: Vec<PageDiagnostic>,
}

enum PageOutcome {
    Written(Vec<Diagnostic>),
    Skipped,
}

/// Renders every page under the configured source directory.
pub(crate) struct SiteBuilder<'a> {
    config: &'a Config,
    pipeline: Pipeline,
}

impl<'a> SiteBuilder<'a> {
    pub(crate) fn new(config: &'a Config, pipeline: Pipeline) -> Self {
        Self { config, pipeline }
    }

    /// Render a single markdown file without writing anything.
    pub(crate) fn render_file(&self, path: &Path) -> Result<RenderResult, BuildError> {
        let markdown = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let mut ctx = plugins::new_context(self.config);
        Ok(self.pipeline.render_markdown(path, &markdown, &mut ctx))
    }

    /// Build the site into the configured output directory.
    pub(crate) fn build(&self) -> Result<BuildSummary, BuildError> {
        let source_dir = &self.config.content_resolved.source_dir;
        let output_dir = &self.config.content_resolved.output_dir;
        if !source_dir.is_dir() {
            return Err(BuildError::SourceNotFound(source_dir.clone()));
        }

        let entries = Scanner::new(source_dir.clone())
            .exclude(output_dir.clone())
            .scan();
        let (pages, assets): (Vec<ContentEntry>, Vec<ContentEntry>) = entries
            .into_iter()
            .partition(|entry| entry.kind == EntryKind::Page);
        tracing::info!(pages = pages.len(), assets = assets.len(), "Scanned content");

        fs::create_dir_all(output_dir).map_err(|e| BuildError::io(output_dir, e))?;

        let outcomes = pages
            .par_iter()
            .map(|entry| {
                self.build_page(entry, output_dir)
                    .map(|outcome| (entry.rel_path.clone(), outcome))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut summary = BuildSummary::default();
        for (page, outcome) in outcomes {
            match outcome {
                PageOutcome::Written(diagnostics) => {
                    summary.pages_written += 1;
                    summary
                        .diagnostics
                        .extend(diagnostics.into_iter().map(|diagnostic| PageDiagnostic {
                            page: page.clone(),
                            diagnostic,
                        }));
                }
                PageOutcome::Skipped => summary.skipped += 1,
            }
        }

        for entry in &assets {
            copy_asset(entry, output_dir)?;
            summary.assets_copied += 1;
        }

        let assets_dir = output_dir.join(ASSETS_DIR);
        garden_plugins::companion::write_assets(&assets_dir)
            .map_err(|e| BuildError::io(&assets_dir, e))?;

        Ok(summary)
    }

    fn build_page(&self, entry: &ContentEntry, output_dir: &Path) -> Result<PageOutcome, BuildError> {
        let result = self.render_file(&entry.source_path)?;
        if !result.front_matter.is_published() {
            tracing::debug!(page = %entry.rel_path.display(), "Skipping unpublished page");
            return Ok(PageOutcome::Skipped);
        }

        let root_prefix = template::root_prefix(&entry.rel_path);
        let html = template::render_page(&PageData {
            title: &result.title,
            tags: &result.front_matter.tags,
            html_content: &result.html,
            root_prefix: &root_prefix,
        });

        let dest = output_dir.join(&entry.rel_path).with_extension("html");
        write_file(&dest, html.as_bytes())?;
        tracing::debug!(page = %entry.rel_path.display(), "Wrote page");
        Ok(PageOutcome::Written(result.diagnostics))
    }
}

fn copy_asset(entry: &ContentEntry, output_dir: &Path) -> Result<(), BuildError> {
    let dest = output_dir.join(&entry.rel_path);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::copy(&entry.source_path, &dest).map_err(|e| BuildError::io(&entry.source_path, e))?;
    Ok(())
}

fn write_file(dest: &Path, contents: &[u8]) -> Result<(), BuildError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(dest, contents).map_err(|e| BuildError::io(dest, e))
}
