//! readthru - A read-through file cache for command output
//!
//! readthru provides:
//! - One JSON file per key under a cache directory
//! - A producer command that runs only on a miss
//! - Optional atomic entry writes

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over -v
    let default_directive = if cli.verbose {
        "readthru=debug"
    } else {
        "readthru=warn"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    cli::run(cli)
}
