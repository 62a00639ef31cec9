//! Transform plugins for Garden pages.
//!
//! - [`CanvasEmbed`]: links and images to canvas files (`.canvas`, `.json`) become embedded canvases
//! - [`NotebookEmbed`]: links to `.ipynb` files become rendered notebooks
//! - [`ClickableImages`]: images open in a modal when clicked
//! - [`PythonBlocks`]: marked fenced blocks become runnable Python blocks
//!
//! The emitted HTML relies on the browser script and styles in [`companion`].
//!
//! # Order
//!
//! [`CanvasEmbed`] must run before [`ClickableImages`], otherwise canvas
//! images would be wrapped as ordinary images. [`Plugins::into_pipeline`] is
//! the one place the order is fixed.
//!
//! # Example
//!
//! ```
//! use garden_plugins::{Plugins, PythonBlocks};
//! use garden_renderer::TransformContext;
//!
//! let pipeline = Plugins {
//!     python: PythonBlocks::new().with_marker("pyrun"),
//!     ..Plugins::default()
//! }
//! .into_pipeline();
//!
//! let mut ctx = TransformContext::new("content");
//! let result = pipeline.render_markdown("content/page.md", "![alt](photo.png)", &mut ctx);
//! assert!(result.html.contains("clickable-image-container"));
//! ```

mod canvas;
mod clickable_image;
pub mod companion;
pub mod notebook;
mod python_block;
pub mod resolve;

use garden_renderer::Pipeline;
use rand::RngExt;

pub use canvas::{CanvasEmbed, render_canvas};
pub use clickable_image::ClickableImages;
pub use notebook::{NotebookEmbed, NotebookError, NotebookFetcher, StubFetcher};
pub use python_block::{DEFAULT_MARKER, PythonBlocks, escape_template_literal};

/// The full plugin set. Configure the individual plugins, then register them
/// with [`Plugins::into_pipeline`].
#[derive(Default)]
pub struct Plugins {
    pub canvas: CanvasEmbed,
    pub notebook: NotebookEmbed,
    pub images: ClickableImages,
    pub python: PythonBlocks,
}

impl Plugins {
    /// Register the plugins: canvas, notebook, clickable images, Python.
    #[must_use]
    pub fn into_pipeline(self) -> Pipeline {
        Pipeline::new()
            .with_transform(self.canvas)
            .with_transform(self.notebook)
            .with_transform(self.images)
            .with_transform(self.python)
    }
}

/// Random lowercase hex string of `len` (at most 16) characters.
pub(crate) fn random_hex(len: usize) -> String {
    debug_assert!(len <= 16);
    let value = rand::rng().random::<u64>();
    let hex = format!("{value:016x}");
    hex[..len.min(hex.len())].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_renderer::TransformContext;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_random_hex() {
        let hex = random_hex(8);
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_pipeline_order() {
        assert_eq!(
            Plugins::default().into_pipeline().transform_names(),
            vec!["canvas", "notebook", "clickable-images", "python-blocks"]
        );
    }

    #[test]
    fn test_configured_plugins_keep_order() {
        let pipeline = Plugins {
            canvas: CanvasEmbed::new().with_extensions(["excalidraw"]),
            python: PythonBlocks::new().with_marker("pyrun"),
            ..Plugins::default()
        }
        .into_pipeline();

        assert_eq!(
            pipeline.transform_names(),
            vec!["canvas", "notebook", "clickable-images", "python-blocks"]
        );

        let mut ctx = TransformContext::new("content");
        let html = pipeline
            .render_markdown("content/p.md", "```pyrun\nx = 1\n```\n", &mut ctx)
            .html;
        assert!(html.contains("python-block"));
    }

    #[test]
    fn test_canvas_image_not_wrapped_as_clickable() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("board.canvas"), r#"{"nodes":[],"edges":[]}"#).unwrap();

        let mut ctx = TransformContext::new(tmp.path());
        let result = Plugins::default().into_pipeline().render_markdown(
            tmp.path().join("page.md"),
            "![board](board.canvas) ![photo](photo.png)\n",
            &mut ctx,
        );

        assert_eq!(result.html.matches("canvas-embed").count(), 1);
        assert_eq!(result.html.matches("clickable-image-container").count(), 1);
    }

    #[test]
    fn test_end_to_end_scenarios() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut ctx = TransformContext::new(tmp.path());
        let markdown = concat!(
            "![alt](photo.png)\n\n",
            "[notes](notes.ipynb)\n\n",
            "```python-run\nprint(\"a`b$c\\d\")\n```\n",
        );
        let result = Plugins::default().into_pipeline().render_markdown(tmp.path().join("page.md"), markdown, &mut ctx);

        assert!(result.html.contains(r#"<img src="photo.png" alt="alt">"#));
        assert!(result.html.contains(r#"<a href="notes.ipynb">notes</a>"#));
        assert!(result.html.contains(r"print(&quot;a\`b\$c\\d&quot;)"));
        assert_eq!(result.diagnostics.len(), 1);
    }
}
