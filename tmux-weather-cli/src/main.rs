//! Binary crate for the `tmux-weather` status widget.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Running location → weather → status line
//! - Reporting failures without breaking the status bar

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;
mod report;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

/// Logs go to stderr; stdout belongs to tmux.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "tmux_weather=debug,tmux_weather_core=debug,warn"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("TMUX_WEATHER_LOG").unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
