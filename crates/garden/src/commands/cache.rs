//! `garden cache` command implementation.

use std::path::PathBuf;

use clap::Subcommand;
use garden_cache::FileCache;
use garden_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Cache management subcommands.
#[derive(Subcommand)]
pub(crate) enum CacheCommand {
    /// Delete the cache directory.
    Clear {
        /// Path to configuration file (default: auto-discover garden.toml).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl CacheCommand {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Clear { config } => clear(config),
        }
    }
}

fn clear(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let output = Output::new();
    let config = Config::load(config_path.as_deref(), None)?;
    let cache = FileCache::new(config.cache_resolved.dir.clone());

    if cache.clear()? {
        output.success(&format!("Removed {}", cache.root().display()));
    } else {
        output.info(&format!("Nothing to clear at {}", cache.root().display()));
    }
    Ok(())
}
