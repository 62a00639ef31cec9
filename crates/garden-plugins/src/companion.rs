//! Browser assets the plugin output depends on.
//!
//! The emitted HTML calls `openImageModal`, `copyCode` and `runPythonCode`
//! from inline handlers and leaves `.canvas-embed[data-canvas]` containers
//! for the script to draw.

use std::fs;
use std::io;
use std::path::Path;

/// Companion script.
pub const COMPANION_JS: &str = include_str!("../assets/garden.js");

/// Companion stylesheet.
pub const COMPANION_CSS: &str = include_str!("../assets/garden.css");

/// File name of the script in the output directory.
pub const JS_FILENAME: &str = "garden.js";

/// File name of the stylesheet in the output directory.
pub const CSS_FILENAME: &str = "garden.css";

/// Write the companion assets into `dir`, creating it if needed.
pub fn write_assets(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(JS_FILENAME), COMPANION_JS)?;
    fs::write(dir.join(CSS_FILENAME), COMPANION_CSS)?;
    tracing::debug!(dir = %dir.display(), "Wrote companion assets");
    Ok(())
}
