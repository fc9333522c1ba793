//! TOML configuration for the job monitor.
//!
//! Every section falls back to defaults, so a config file only needs the
//! values it changes. Lookup order for [`MonitorConfig::load_or_default`]:
//! the `JOB_MONITOR_CONFIG` environment variable, `./job-monitor.toml`,
//! then compiled-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::retention::DEFAULT_WINDOW_DAYS;

pub const CONFIG_ENV: &str = "JOB_MONITOR_CONFIG";
pub const LOCAL_CONFIG: &str = "job-monitor.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load from, in order:
    /// 1. The path in the `JOB_MONITOR_CONFIG` environment variable.
    /// 2. `./job-monitor.toml`, if it exists.
    /// 3. Compiled-in defaults.
    ///
    /// Nothing is logged here since this usually runs before tracing is set
    /// up; the caller reports [`LoadedConfig::skipped`] once it is.
    pub fn load_or_default() -> LoadedConfig {
        let mut candidates = Vec::new();
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(env_path));
        }
        let local_path = PathBuf::from(LOCAL_CONFIG);
        if local_path.exists() {
            candidates.push(local_path);
        }
        Self::load_first(candidates)
    }

    /// Use the first candidate that loads; remember the ones that did not.
    pub fn load_first(candidates: impl IntoIterator<Item = PathBuf>) -> LoadedConfig {
        let mut skipped = Vec::new();
        for path in candidates {
            match Self::load(&path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path),
                        skipped,
                    }
                }
                Err(error) => skipped.push(SkippedConfig { path, error }),
            }
        }

        LoadedConfig {
            config: Self::default(),
            source: None,
            skipped,
        }
    }
}

/// Outcome of config discovery.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: MonitorConfig,
    /// File the config came from, `None` for compiled-in defaults.
    pub source: Option<PathBuf>,
    /// Config files that were found but could not be used.
    pub skipped: Vec<SkippedConfig>,
}

impl LoadedConfig {
    /// Log how the config was resolved. Call once tracing is initialized.
    pub fn log(&self) {
        for skipped in &self.skipped {
            warn!(
                path = %skipped.path.display(),
                error = %format!("{:#}", skipped.error),
                "config file could not be loaded, falling back"
            );
        }
        match &self.source {
            Some(path) => info!(path = %path.display(), "loaded job monitor configuration"),
            None => debug!("no usable config file, using compiled-in defaults"),
        }
    }
}

#[derive(Debug)]
pub struct SkippedConfig {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

// ---------------------------------------------------------------------------
// Report header
// ---------------------------------------------------------------------------

/// Header fields written at the top of every report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub point_of_contact: String,
    /// Free text, e.g. what the job does and who consumes its output.
    pub header: String,
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Folder receiving `<yyyyMMdd_HHmmss>.log.*` reports and `current.*`.
    pub log_folder: PathBuf,
    /// Purge old reports after each save.
    pub purge: bool,
    pub purge_window_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_folder: PathBuf::from("logs"),
            purge: false,
            purge_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
