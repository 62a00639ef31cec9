//! Ordered lookup of embedded resources.
//!
//! An embed target such as `boards/My%20Board.canvas` can live in several
//! places. A [`ResolverChain`] lists the candidate locations in priority
//! order; the first candidate a loader accepts wins. Each resolver is tried
//! with the raw target first and then with its percent-decoded form.
//!
//! Reading goes through [`ResourceSource`] so the lookup policy can be tested
//! against an in-memory [`MemorySource`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Locations a resolver may anchor a target to.
#[derive(Clone, Copy, Debug)]
pub struct LookupContext<'a> {
    /// Directory of the document containing the embed.
    pub document_dir: &'a Path,
    /// Root of the content tree.
    pub content_root: &'a Path,
    /// Media subfolder of the content tree.
    pub media_dir: &'a Path,
}

/// Maps a target to one candidate path, or `None` if it does not apply.
pub type Resolver = fn(&LookupContext<'_>, &str) -> Option<PathBuf>;

/// Resolve relative to the directory of the current document.
///
/// Absolute targets are not file-relative and yield `None`.
pub fn file_relative(ctx: &LookupContext<'_>, target: &str) -> Option<PathBuf> {
    if target.starts_with('/') {
        return None;
    }
    Some(ctx.document_dir.join(target))
}

/// Resolve relative to the content root. A leading `/` is stripped.
pub fn root_relative(ctx: &LookupContext<'_>, target: &str) -> Option<PathBuf> {
    Some(ctx.content_root.join(target.trim_start_matches('/')))
}

/// Resolve inside the media directory. A leading `/` is stripped.
pub fn media_relative(ctx: &LookupContext<'_>, target: &str) -> Option<PathBuf> {
    Some(ctx.media_dir.join(target.trim_start_matches('/')))
}

/// Strip `#fragment` and `?query` from a link target.
#[must_use]
pub fn target_path(target: &str) -> &str {
    target
        .find(['#', '?'])
        .map_or(target, |end| &target[..end])
}

/// Whether `target` is an `http://` or `https://` URL.
#[must_use]
pub fn is_remote(target: &str) -> bool {
    let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// An ordered list of named resolvers.
#[derive(Clone, Debug, Default)]
pub struct ResolverChain {
    resolvers: Vec<(&'static str, Resolver)>,
}

impl ResolverChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver.
    #[must_use]
    pub fn with(mut self, name: &'static str, resolver: Resolver) -> Self {
        self.resolvers.push((name, resolver));
        self
    }

    /// File-relative, then root-relative, then media folder.
    #[must_use]
    pub fn with_media() -> Self {
        Self::new()
            .with("file", file_relative)
            .with("root", root_relative)
            .with("media", media_relative)
    }

    /// File-relative, then root-relative.
    #[must_use]
    pub fn local() -> Self {
        Self::new()
            .with("file", file_relative)
            .with("root", root_relative)
    }

    /// Resolver names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|(name, _)| *name).collect()
    }

    /// All candidate paths for `target`, in priority order, without duplicates.
    #[must_use]
    pub fn candidates(&self, ctx: &LookupContext<'_>, target: &str) -> Vec<PathBuf> {
        let target = target_path(target);
        let decoded = percent_decode_str(target)
            .decode_utf8()
            .ok()
            .filter(|decoded| decoded.as_ref() != target);

        let mut candidates = Vec::new();
        for (_, resolver) in &self.resolvers {
            let forms = std::iter::once(target).chain(decoded.as_deref());
            for form in forms {
                if let Some(path) = resolver(ctx, form)
                    && !candidates.contains(&path)
                {
                    candidates.push(path);
                }
            }
        }
        candidates
    }

    /// Return the first candidate `load` accepts, with its loaded value.
    pub fn resolve_with<T>(
        &self,
        ctx: &LookupContext<'_>,
        target: &str,
        mut load: impl FnMut(&Path) -> Option<T>,
    ) -> Option<(PathBuf, T)> {
        self.candidates(ctx, target).into_iter().find_map(|path| {
            let value = load(&path)?;
            Some((path, value))
        })
    }
}

/// Read access to resource bytes.
pub trait ResourceSource: Send + Sync {
    /// Read the full contents of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads resources from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSource;

impl ResourceSource for FsSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// In-memory resources keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl ResourceSource for MemorySource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup() -> LookupContext<'static> {
        LookupContext {
            document_dir: Path::new("content/notes"),
            content_root: Path::new("content"),
            media_dir: Path::new("content/media"),
        }
    }

    #[test]
    fn test_candidates_order_raw_then_decoded() {
        let candidates = ResolverChain::with_media().candidates(&lookup(), "My%20Board.canvas");
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("content/notes/My%20Board.canvas"),
                PathBuf::from("content/notes/My Board.canvas"),
                PathBuf::from("content/My%20Board.canvas"),
                PathBuf::from("content/My Board.canvas"),
                PathBuf::from("content/media/My%20Board.canvas"),
                PathBuf::from("content/media/My Board.canvas"),
            ]
        );
    }

    #[test]
    fn test_candidates_skip_identical_decoded_form() {
        let candidates = ResolverChain::local().candidates(&lookup(), "board.canvas");
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("content/notes/board.canvas"),
                PathBuf::from("content/board.canvas"),
            ]
        );
    }

    #[test]
    fn test_absolute_target_is_root_relative() {
        let candidates = ResolverChain::with_media().candidates(&lookup(), "/boards/b.canvas");
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("content/boards/b.canvas"),
                PathBuf::from("content/media/boards/b.canvas"),
            ]
        );
    }

    #[test]
    fn test_candidates_strip_fragment_and_query() {
        let candidates = ResolverChain::local().candidates(&lookup(), "b.canvas#node?x=1");
        assert_eq!(candidates[0], PathBuf::from("content/notes/b.canvas"));
    }

    #[test]
    fn test_candidates_deduplicate() {
        let ctx = LookupContext {
            document_dir: Path::new("content"),
            content_root: Path::new("content"),
            media_dir: Path::new("content/media"),
        };
        let candidates = ResolverChain::local().candidates(&ctx, "b.canvas");
        assert_eq!(candidates, vec![PathBuf::from("content/b.canvas")]);
    }

    #[test]
    fn test_resolve_with_first_success_wins() {
        let source = MemorySource::new()
            .with_file("content/b.canvas", "root")
            .with_file("content/media/b.canvas", "media");

        let (path, contents) = ResolverChain::with_media()
            .resolve_with(&lookup(), "b.canvas", |p| source.read(p).ok())
            .unwrap();

        assert_eq!(path, PathBuf::from("content/b.canvas"));
        assert_eq!(contents, b"root");
    }

    #[test]
    fn test_resolve_with_loader_rejection_moves_on() {
        let source = MemorySource::new()
            .with_file("content/notes/b.canvas", "not json")
            .with_file("content/b.canvas", "{}");

        let (path, _) = ResolverChain::with_media()
            .resolve_with(&lookup(), "b.canvas", |p| {
                let bytes = source.read(p).ok()?;
                serde_json::from_slice::<serde_json::Value>(&bytes).ok()
            })
            .unwrap();

        assert_eq!(path, PathBuf::from("content/b.canvas"));
    }

    #[test]
    fn test_resolve_with_nothing_found() {
        let source = MemorySource::new();
        let result = ResolverChain::with_media()
            .resolve_with(&lookup(), "missing.canvas", |p| source.read(p).ok());
        assert!(result.is_none());
    }

    #[test]
    fn test_custom_chain_order() {
        let chain = ResolverChain::new()
            .with("media", media_relative)
            .with("file", file_relative);
        assert_eq!(chain.names(), vec!["media", "file"]);
        assert_eq!(
            chain.candidates(&lookup(), "x.canvas")[0],
            PathBuf::from("content/media/x.canvas")
        );
    }

    #[test]
    fn test_target_path() {
        assert_eq!(target_path("a.canvas"), "a.canvas");
        assert_eq!(target_path("a.canvas#frag"), "a.canvas");
        assert_eq!(target_path("a.ipynb?raw=1"), "a.ipynb");
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/nb.ipynb"));
        assert!(is_remote("HTTP://example.com/nb.ipynb"));
        assert!(!is_remote("notes/nb.ipynb"));
        assert!(!is_remote("ftp://example.com/nb.ipynb"));
    }

    #[test]
    fn test_fs_source_reads_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("b.canvas");
        fs::write(&path, "{}").unwrap();

        assert_eq!(FsSource.read(&path).unwrap(), b"{}");
        assert!(FsSource.read(&tmp.path().join("missing")).is_err());
    }
}
