//! uomulti binary entry point.
//!
//! Parses command-line arguments, initializes logging and runs the selected
//! subcommand. Errors are printed with their context chain and exit with
//! status 1.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use uomulti_cli::{Cli, run};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG takes precedence over -v
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    run(cli)
}
