//! Binary crate for the `vedrid` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and location menus
//! - Reconciling the core's view tree into terminal output

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;
mod terminal;

/// Logs go to stderr so they never mix with the rendered output.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "vedrid_core=debug,vedrid_cli=debug,warn",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}
