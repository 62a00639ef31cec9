//! `garden render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use garden_config::Config;

use crate::error::CliError;
use crate::output::Output;
use crate::plugins;
use crate::site::SiteBuilder;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover garden.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        if !self.file.is_file() {
            return Err(CliError::Validation(format!(
                "File not found: {}",
                self.file.display()
            )));
        }

        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let cache = plugins::open_cache(&config);
        let pipeline = plugins::build_pipeline(&config, cache.as_ref());

        let result = SiteBuilder::new(&config, pipeline).render_file(&self.file)?;
        for diagnostic in &result.diagnostics {
            output.diagnostic(None, diagnostic);
        }

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(result.html.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
