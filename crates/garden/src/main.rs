//! Garden CLI - digital garden builder.
//!
//! Provides commands for:
//! - `build`: Render every published page into the output directory
//! - `render`: Print the transformed HTML of a single file
//! - `cache clear`: Remove downloaded notebooks and other cached data

mod commands;
mod error;
mod output;
mod plugins;
mod scanner;
mod site;
mod template;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CacheCommand, RenderArgs};
use output::Output;

/// Garden - markdown to HTML with embedded canvases, notebooks and Python.
#[derive(Parser)]
#[command(name = "garden", version, about)]
struct Cli {
    /// Enable info-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site.
    Build(BuildArgs),
    /// Render one markdown file to stdout.
    Render(RenderArgs),
    /// Cache management commands.
    #[command(subcommand)]
    Cache(CacheCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Render(args) => args.execute(),
        Commands::Cache(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
