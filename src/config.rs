use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::draft::DEFAULT_HISTORY_CAPACITY;
use crate::session::DEFAULT_AUTOSAVE_IDLE;

const APP_NAME: &str = "chronicle";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_PORT: u16 = 17020;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Port for the HTTP API
    pub port: u16,
    /// SQLite database file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Undo depth of an editing session
    pub history_capacity: usize,
    /// Idle time after the last edit before an autosave fires
    pub autosave_idle_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            autosave_idle_ms: DEFAULT_AUTOSAVE_IDLE.as_millis() as u64,
        }
    }
}

impl AppConfig {
    /// Load configuration from the user's config directory, then apply
    /// environment overrides.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply `CHRONICLE_PORT` and `CHRONICLE_DB`. Unparseable ports are ignored.
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = var("CHRONICLE_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Ignoring invalid CHRONICLE_PORT `{}`", port),
            }
        }
        if let Some(path) = var("CHRONICLE_DB") {
            self.database_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn autosave_idle(&self) -> Duration {
        Duration::from_millis(self.autosave_idle_ms)
    }

    /// The configured database file, or the platform default.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => crate::db::default_path(),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
