//! Transform pipeline configured from `garden.toml`.

use garden_cache::{Cache, FileCache, NullCache};
use garden_config::Config;
use garden_plugins::notebook::CACHE_BUCKET;
use garden_plugins::{CanvasEmbed, ClickableImages, NotebookEmbed, Plugins, PythonBlocks};
use garden_renderer::{Pipeline, TransformContext};

/// Cache selected by `[cache] enabled`.
pub(crate) fn open_cache(config: &Config) -> Box<dyn Cache> {
    if config.cache_resolved.enabled {
        Box::new(FileCache::new(config.cache_resolved.dir.clone()))
    } else {
        Box::new(NullCache)
    }
}

/// Build the plugin pipeline from the configured plugin settings.
pub(crate) fn build_pipeline(config: &Config, cache: &dyn Cache) -> Pipeline {
    Plugins {
        canvas: CanvasEmbed::new().with_extensions(config.canvas.extensions.iter().cloned()),
        notebook: NotebookEmbed::new()
            .with_download_remote(config.notebooks.download_remote)
            .with_max_age(config.notebooks.cache_ttl())
            .with_cache(cache.bucket(CACHE_BUCKET)),
        images: ClickableImages::new(),
        python: PythonBlocks::new().with_marker(config.python.marker.clone()),
    }
    .into_pipeline()
}

/// Fresh per-document context for the configured content tree.
pub(crate) fn new_context(config: &Config) -> TransformContext {
    TransformContext::new(config.content_resolved.source_dir.clone())
        .with_media_dir(config.content_resolved.media_dir.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_config::CliSettings;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn load(dir: &Path, toml: &str) -> Config {
        let path = dir.join("garden.toml");
        std::fs::write(&path, toml).unwrap();
        Config::load(Some(&path), None).unwrap()
    }

    #[test]
    fn test_pipeline_order() {
        let tmp = TempDir::new().unwrap();
        let config = load(tmp.path(), "");
        let pipeline = build_pipeline(&config, &NullCache);

        assert_eq!(
            pipeline.transform_names(),
            vec!["canvas", "notebook", "clickable-images", "python-blocks"]
        );
    }

    #[test]
    fn test_configured_marker_used() {
        let tmp = TempDir::new().unwrap();
        let config = load(tmp.path(), "[python]\nmarker = \"pyrun\"\n");
        let pipeline = build_pipeline(&config, &NullCache);

        let mut ctx = new_context(&config);
        let html = pipeline
            .render_markdown(tmp.path().join("content/p.md"), "```pyrun\nx\n```\n", &mut ctx)
            .html;
        assert!(html.contains("python-block"));
    }

    #[test]
    fn test_context_uses_configured_dirs() {
        let tmp = TempDir::new().unwrap();
        let config = load(tmp.path(), "[content]\nsource_dir = \"notes\"\nmedia_dir = \"files\"\n");
        let ctx = new_context(&config);

        assert_eq!(ctx.content_root(), tmp.path().join("notes"));
        assert_eq!(ctx.media_dir(), tmp.path().join("notes/files"));
    }

    #[test]
    fn test_disabled_cache_is_null() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("garden.toml");
        std::fs::write(&path, "").unwrap();
        let settings = CliSettings {
            cache_enabled: Some(false),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        let cache = open_cache(&config);
        let bucket = cache.bucket(CACHE_BUCKET);
        bucket.set("k", b"v");
        assert_eq!(bucket.get("k", None), None);
        assert!(!config.cache_resolved.dir.exists());
    }
}
