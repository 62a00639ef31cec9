//! Jupyter notebook embedding.
//!
//! Links to `.ipynb` files are replaced with the rendered notebook. Local
//! notebooks are looked up like canvases (next to the page, then under the
//! content root). Remote notebooks go through a [`NotebookFetcher`] and are
//! cached in the `notebooks` bucket for a freshness window.
//!
//! Remote downloading is not implemented: the default [`StubFetcher`] always
//! misses, so remote links stay links unless a fresh cache entry exists.

mod model;
mod render;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use garden_cache::{Cache, CacheBucket, DEFAULT_MAX_AGE, NullCache};
use garden_renderer::{Diagnostic, DiagnosticKind, Document, Rewrite, Transform, TransformContext};
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};

use crate::resolve::{
    FsSource, LookupContext, ResolverChain, ResourceSource, is_remote, target_path,
};

pub use model::{Cell, Notebook, Output};
pub use render::render_notebook;

const PLUGIN: &str = "notebook";

/// Cache bucket holding downloaded notebooks.
pub const CACHE_BUCKET: &str = "notebooks";

/// Error loading a notebook.
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    /// The notebook JSON could not be parsed.
    #[error("invalid notebook JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// No local file matched the link target.
    #[error("notebook not found")]
    NotFound,
    /// A remote notebook is neither cached nor downloadable.
    #[error("remote notebook unavailable")]
    Unavailable,
}

impl NotebookError {
    fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Parse(_) => DiagnosticKind::Malformed,
            Self::NotFound => DiagnosticKind::Unresolved,
            Self::Unavailable => DiagnosticKind::Unavailable,
        }
    }
}

/// Downloads remote notebooks.
pub trait NotebookFetcher: Send + Sync {
    /// Fetch the notebook at `url`. `None` means unavailable.
    fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

/// Fetcher that never downloads anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubFetcher;

impl NotebookFetcher for StubFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        tracing::info!(url, "Remote notebook download is not implemented");
        None
    }
}

/// Cache key for a remote notebook URL.
///
/// URL-safe unpadded base64 of the SHA-256 digest of the URL, plus `.json`.
#[must_use]
pub fn cache_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}.json", BASE64_URL_SAFE_NO_PAD.encode(&digest[..]))
}

/// Replaces links to notebooks with the rendered notebook.
pub struct NotebookEmbed {
    download_remote: bool,
    max_age: Duration,
    chain: ResolverChain,
    source: Arc<dyn ResourceSource>,
    fetcher: Arc<dyn NotebookFetcher>,
    cache: Box<dyn CacheBucket>,
}

impl NotebookEmbed {
    /// Create the plugin with remote download enabled, no cache and the stub
    /// fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            download_remote: true,
            max_age: DEFAULT_MAX_AGE,
            chain: ResolverChain::local(),
            source: Arc::new(FsSource),
            fetcher: Arc::new(StubFetcher),
            cache: NullCache.bucket(CACHE_BUCKET),
        }
    }

    /// Enable or disable remote notebooks. Disabled remote links stay links.
    #[must_use]
    pub fn with_download_remote(mut self, enabled: bool) -> Self {
        self.download_remote = enabled;
        self
    }

    /// Set the freshness window for cached downloads.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the cache bucket for downloaded notebooks.
    #[must_use]
    pub fn with_cache(mut self, cache: Box<dyn CacheBucket>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl NotebookFetcher + 'static) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl ResourceSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    #[must_use]
    pub fn with_chain(mut self, chain: ResolverChain) -> Self {
        self.chain = chain;
        self
    }

    /// Whether `target` links to a notebook.
    #[must_use]
    pub fn matches(target: &str) -> bool {
        target_path(target)
            .to_ascii_lowercase()
            .ends_with(".ipynb")
    }

    /// Load a remote notebook from the cache or the fetcher. Only content that
    /// parses is written to the cache.
    fn load_remote(&self, url: &str) -> Result<Notebook, NotebookError> {
        let key = cache_key(url);
        if let Some(bytes) = self.cache.get(&key, Some(self.max_age)) {
            match Notebook::from_slice(&bytes) {
                Ok(notebook) => {
                    tracing::debug!(url, key = %key, "Using cached notebook");
                    return Ok(notebook);
                }
                Err(e) => tracing::debug!(url, error = %e, "Ignoring unparsable cached notebook"),
            }
        }
        let bytes = self.fetcher.fetch(url).ok_or(NotebookError::Unavailable)?;
        let notebook = Notebook::from_slice(&bytes)?;
        self.cache.set(&key, &bytes);
        Ok(notebook)
    }

    fn load_local(
        &self,
        lookup: &LookupContext<'_>,
        target: &str,
    ) -> Result<(String, Notebook), NotebookError> {
        let (path, bytes) = self
            .chain
            .resolve_with(lookup, target, |path| self.source.read(path).ok())
            .ok_or(NotebookError::NotFound)?;
        Ok((file_stem(&path), Notebook::from_slice(&bytes)?))
    }
}

impl Default for NotebookEmbed {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for NotebookEmbed {
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
            let Some(target) = node.destination().filter(|t| node.is_link() && Self::matches(t))
            else {
                return Rewrite::Keep;
            };

            let loaded = if is_remote(target) {
                if !self.download_remote {
                    tracing::debug!(url = target, "Remote notebooks disabled, keeping link");
                    return Rewrite::Keep;
                }
                self.load_remote(target)
                    .map(|notebook| (url_name(target), notebook))
            } else {
                self.load_local(&lookup, target)
            };

            match loaded.map(|(name, notebook)| render_notebook(&name, &notebook)) {
                Ok(html) => Rewrite::Embed(html),
                Err(e) => {
                    ctx.report(Diagnostic::new(PLUGIN, target, e.kind(), e.to_string()));
                    Rewrite::Keep
                }
            }
        })
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Display name for a remote notebook: the decoded last path segment
/// without extension.
fn url_name(url: &str) -> String {
    let path = target_path(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    file_stem(Path::new(decoded.as_ref()))
}
