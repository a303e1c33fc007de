use anyhow::{Context, Result};
use chrono::Local;
use std::{
    error::Error as StdError,
    fs::OpenOptions,
    io::Write,
    process::{Command, Stdio},
};
use tmux_weather_core::{Dirs, EntryStore, ErrorSink, WEATHER_KEY, config::APP_NAME};

/// Sends failures to stderr, a desktop notification and `weather.log`.
#[derive(Debug)]
pub struct Reporter {
    dirs: Dirs,
    store: EntryStore,
    notifications: bool,
}

impl Reporter {
    pub fn new(dirs: Dirs, store: EntryStore, notifications: bool) -> Self {
        Self { dirs, store, notifications }
    }

    /// Report a failed run: log it, point the status line at the log and drop
    /// the cached weather. An error here means reporting itself failed.
    pub fn fail(&self, err: &anyhow::Error, out: &mut impl Write) -> Result<()> {
        eprintln!("{err:?}");
        self.notify(&format!("{err:#}"));

        self.append_log(&format!("{err:?}"))?;

        let log = self.dirs.tilde(&self.dirs.error_log());
        writeln!(out, "#[fg=red]{log}").context("Failed to write to stdout")?;

        self.store
            .erase(WEATHER_KEY)
            .context("Failed to remove cached weather")?;
        Ok(())
    }

    fn append_log(&self, detail: &str) -> Result<()> {
        let path = self.dirs.error_log();
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open error log: {}", path.display()))?;

        writeln!(log, "{}\n{}", Local::now().to_rfc2822(), detail)
            .with_context(|| format!("Failed to write error log: {}", path.display()))?;
        Ok(())
    }

    fn notify(&self, message: &str) {
        if !self.notifications {
            return;
        }

        match notification(message).stdout(Stdio::null()).stderr(Stdio::null()).status() {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::debug!(%status, "notification command failed"),
            Err(err) => tracing::debug!(error = %err, "notification command unavailable"),
        }
    }
}

impl ErrorSink for Reporter {
    fn submit(&self, err: &(dyn StdError + 'static)) {
        let detail = error_chain(err);
        eprintln!("{detail}");
        self.notify(&detail);

        if let Err(log_err) = self.append_log(&detail) {
            tracing::warn!(error = %log_err, "could not record error");
        }
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    std::iter::successors(Some(err), |&e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

#[cfg(target_os = "macos")]
fn notification(message: &str) -> Command {
    let script = format!(
        "display notification \"{}\" with title \"{APP_NAME}\"",
        message.replace('\\', "\\\\").replace('"', "\\\"")
    );
    let mut cmd = Command::new("osascript");
    cmd.arg("-e").arg(script);
    cmd
}

#[cfg(not(target_os = "macos"))]
fn notification(message: &str) -> Command {
    let mut cmd = Command::new("notify-send");
    cmd.arg(APP_NAME).arg(message);
    cmd
}
