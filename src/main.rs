//! battmon: record laptop battery readings and report on them.
//!
//! Run with:  `battmon collect --interval 60` and later `battmon report --days 1`

mod cli;
mod collect;
mod report;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG controls verbosity unless -v asks for debug output.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("battmon v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.unwrap_or_else(battmon_config::default_path);
    match cli.command {
        Commands::Collect(args) => {
            collect::run(&args, &config_path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Report(args) => report::run(&args, &config_path),
    }
}
