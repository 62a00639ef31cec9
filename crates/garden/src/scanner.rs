//! Content discovery by filesystem walking.
//!
//! The scanner only classifies files. Reading and rendering happen in
//! [`crate::site`].

use std::fs;
use std::path::{Path, PathBuf};

/// What a discovered file is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryKind {
    /// Markdown page to render.
    Page,
    /// Any other file, copied verbatim.
    Asset,
}

/// A file under the content root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ContentEntry {
    /// Path relative to the content root.
    pub rel_path: PathBuf,
    /// Absolute (or config-relative) source path.
    pub source_path: PathBuf,
    pub kind: EntryKind,
}

/// Walks the content root, skipping hidden entries and excluded directories.
pub(crate) struct Scanner {
    source_dir: PathBuf,
    excluded: Vec<PathBuf>,
}

impl Scanner {
    pub(crate) fn new(source_dir: PathBuf) -> Self {
        Self {
            source_dir,
            excluded: Vec::new(),
        }
    }

    /// Skip `dir` and everything below it (e.g. an output directory nested
    /// inside the content root).
    #[must_use]
    pub(crate) fn exclude(mut self, dir: PathBuf) -> Self {
        self.excluded.push(dir);
        self
    }

    /// Scan and return entries sorted by relative path.
    ///
    /// Returns an empty Vec if the source directory doesn't exist.
    pub(crate) fn scan(&self) -> Vec<ContentEntry> {
        let mut entries = Vec::new();
        if self.source_dir.is_dir() {
            self.scan_directory(&self.source_dir, Path::new(""), &mut entries);
        }
        entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        entries
    }

    fn scan_directory(&self, dir: &Path, rel_dir: &Path, entries: &mut Vec<ContentEntry>) {
        let Ok(read_dir) = fs::read_dir(dir) else {
            tracing::debug!(dir = %dir.display(), "Unreadable directory skipped");
            return;
        };

        for entry in read_dir.filter_map(Result::ok) {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            let rel_path = rel_dir.join(&name);

            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                if self.excluded.iter().any(|excluded| *excluded == path) {
                    continue;
                }
                self.scan_directory(&path, &rel_path, entries);
                continue;
            }

            let kind = if is_markdown(&path) {
                EntryKind::Page
            } else {
                EntryKind::Asset
            };
            entries.push(ContentEntry {
                rel_path,
                source_path: path,
                kind,
            });
        }
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn listing(entries: &[ContentEntry]) -> Vec<(String, EntryKind)> {
        entries
            .iter()
            .map(|e| (e.rel_path.to_string_lossy().replace('\\', "/"), e.kind))
            .collect()
    }

    #[test]
    fn test_scan_classifies_and_sorts() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "index.md");
        touch(tmp.path(), "notes/b.MD");
        touch(tmp.path(), "notes/a.md");
        touch(tmp.path(), "media/photo.png");

        let entries = Scanner::new(tmp.path().to_path_buf()).scan();

        assert_eq!(
            listing(&entries),
            vec![
                ("index.md".to_owned(), EntryKind::Page),
                ("media/photo.png".to_owned(), EntryKind::Asset),
                ("notes/a.md".to_owned(), EntryKind::Page),
                ("notes/b.MD".to_owned(), EntryKind::Page),
            ]
        );
        assert_eq!(entries[0].source_path, tmp.path().join("index.md"));
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), ".obsidian/workspace.json");
        touch(tmp.path(), ".draft.md");
        touch(tmp.path(), "page.md");

        let entries = Scanner::new(tmp.path().to_path_buf()).scan();
        assert_eq!(listing(&entries), vec![("page.md".to_owned(), EntryKind::Page)]);
    }

    #[test]
    fn test_scan_skips_excluded_dir() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "page.md");
        touch(tmp.path(), "public/page.html");

        let entries = Scanner::new(tmp.path().to_path_buf())
            .exclude(tmp.path().join("public"))
            .scan();
        assert_eq!(listing(&entries), vec![("page.md".to_owned(), EntryKind::Page)]);
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(Scanner::new(tmp.path().join("missing")).scan().is_empty());
    }
}
