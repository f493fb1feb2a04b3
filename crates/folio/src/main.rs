//! Folio CLI - static site generator for a pages-and-blocks content API.
//!
//! Provides commands for:
//! - `build`: Assemble the content tree and write one HTML page per slug
//! - `inspect`: Assemble the content tree and print its pages

mod commands;
mod error;
mod output;
mod template;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, InspectArgs};
use output::Output;

/// Folio - static site generator.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site.
    Build(BuildArgs),
    /// Print the pages of the site.
    Inspect(InspectArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.site.verbose,
        Commands::Inspect(args) => args.site.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Inspect(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {}", err.report()));
        std::process::exit(1);
    }
}
