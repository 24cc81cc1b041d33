use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::app::View;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub refresh: RefreshConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub default_view: View,
    pub history_length: usize,
    pub disk_path: PathBuf,
    pub max_rows: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            default_view: View::Processes,
            history_length: 30,
            disk_path: PathBuf::from("/"),
            max_rows: 25,
        }
    }
}

/// Cadence per view, in milliseconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub processes_ms: u64,
    pub charts_ms: u64,
    pub graphs_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            processes_ms: 3000,
            charts_ms: 1000,
            graphs_ms: 1000,
        }
    }
}

impl RefreshConfig {
    pub fn period(&self, view: View) -> Duration {
        let ms = match view {
            View::Processes => self.processes_ms,
            View::Charts => self.charts_ms,
            View::Graphs => self.graphs_ms,
        };
        Duration::from_millis(ms.max(1))
    }

    pub fn set_all(&mut self, ms: u64) {
        self.processes_ms = ms;
        self.charts_ms = ms;
        self.graphs_ms = ms;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Log to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sysmon").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
