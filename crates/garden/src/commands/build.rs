//! `garden build` command implementation.

use std::path::PathBuf;

use clap::Args;
use garden_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;
use crate::plugins;
use crate::site::SiteBuilder;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Disable caching of downloaded notebooks.
    #[arg(long)]
    no_cache: bool,

    /// Path to configuration file (default: auto-discover garden.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            cache_enabled: self.no_cache.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Source: {}",
            config.content_resolved.source_dir.display()
        ));
        output.info(&format!(
            "Output: {}",
            config.content_resolved.output_dir.display()
        ));

        let cache = plugins::open_cache(&config);
        let pipeline = plugins::build_pipeline(&config, cache.as_ref());
        let summary = SiteBuilder::new(&config, pipeline).build()?;

        for entry in &summary.diagnostics {
            output.diagnostic(Some(&entry.page), &entry.diagnostic);
        }
        output.summary(&summary);
        Ok(())
    }
}
