use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};
use tmux_weather_core::{Config, Dirs, EntryStore, LOCATION_KEY, WEATHER_KEY};

use crate::{app, report::Reporter};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tmux-weather", version, about = "Current weather for the tmux status line")]
pub struct Cli {
    /// Log cache and fetch decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the status line (the default).
    Show,

    /// Store the forecast service API key.
    Configure {
        /// Key to store; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Forget the cached location and weather.
    Clear,
}

impl Cli {
    pub async fn run(self) -> ExitCode {
        let dirs = match Dirs::resolve() {
            Ok(dirs) => dirs,
            Err(err) => {
                eprintln!("{err:?}");
                return ExitCode::FAILURE;
            }
        };

        let result = match self.command.unwrap_or(Command::Show) {
            Command::Show => show(&dirs, &mut io::stdout()).await,
            Command::Configure { api_key } => configure(&dirs, api_key),
            Command::Clear => clear(&dirs),
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err:?}");
                ExitCode::FAILURE
            }
        }
    }
}

/// Any failure is reported once here; `Err` means reporting itself failed.
async fn show(dirs: &Dirs, out: &mut impl Write) -> anyhow::Result<()> {
    let store = EntryStore::new(&dirs.cache_dir);
    // directories first, so anything failing after this can still be logged
    let config = dirs.ensure().and_then(|()| Config::load(&dirs.config_file()));
    let notifications = config.as_ref().map(|c| c.notifications).unwrap_or(true);
    let reporter = Arc::new(Reporter::new(dirs.clone(), store.clone(), notifications));

    let result = match config {
        Ok(config) => app::run(&config, store, reporter.clone()).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(line) => writeln!(out, "{line}").context("Failed to write to stdout"),
        Err(err) => reporter.fail(&err, out),
    }
}

fn configure(dirs: &Dirs, api_key: Option<String>) -> anyhow::Result<()> {
    let path = dirs.config_file();
    let mut config = Config::load(&path)?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("Forecast API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save(&path)?;

    // anything cached was fetched with the previous key
    EntryStore::new(&dirs.cache_dir).erase(WEATHER_KEY)?;

    println!("Saved API key to {}", dirs.tilde(&path));
    Ok(())
}

fn clear(dirs: &Dirs) -> anyhow::Result<()> {
    let store = EntryStore::new(&dirs.cache_dir);
    for key in [LOCATION_KEY, WEATHER_KEY] {
        store.erase(key)?;
    }

    println!("Cleared cached location and weather");
    Ok(())
}
