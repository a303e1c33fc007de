use anyhow::{Context, Result, anyhow};
use chrono::Duration;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const APP_NAME: &str = "tmux-weather";
pub const DEFAULT_ENDPOINT: &str = "https://api.forecast.io/forecast";
pub const DEFAULT_LOCATION_COMMAND: &str = "latlon";
pub const DEFAULT_FRESHNESS_MINUTES: u32 = 20;

/// Per-user directories, resolved once at startup and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub home_dir: Option<PathBuf>,
}

impl Dirs {
    /// Platform locations, e.g. `~/.config/tmux-weather` and `~/.cache/tmux-weather`.
    pub fn resolve() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
            cache_dir: dirs.cache_dir().to_path_buf(),
            home_dir: BaseDirs::new().map(|b| b.home_dir().to_path_buf()),
        })
    }

    /// Create the config and cache directories if they are missing.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.cache_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn error_log(&self) -> PathBuf {
        self.cache_dir.join("weather.log")
    }

    /// `path` with the home directory shown as `~`.
    pub fn tilde(&self, path: &Path) -> String {
        match self.home_dir.as_deref().and_then(|home| path.strip_prefix(home).ok()) {
            Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
            Some(rest) => format!("~/{}", rest.display()),
            None => path.display().to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// location_command = "latlon"
/// freshness_minutes = 20
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Forecast service API key.
    pub api_key: Option<String>,

    /// Program printing `{"latitude": .., "longitude": ..}`.
    pub location_command: String,

    pub location_args: Vec<String>,

    pub endpoint: String,

    /// How long cached location and weather stay fresh.
    pub freshness_minutes: u32,

    /// Desktop notifications on failure.
    pub notifications: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            location_command: DEFAULT_LOCATION_COMMAND.to_string(),
            location_args: Vec::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            freshness_minutes: DEFAULT_FRESHNESS_MINUTES,
            notifications: true,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// The API key, or an error telling the user how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured for the forecast service.\n\
                 Hint: run `{APP_NAME} configure` and enter your API key."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn freshness(&self) -> Duration {
        Duration::minutes(i64::from(self.freshness_minutes))
    }
}
