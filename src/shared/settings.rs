use serde::{Deserialize, Serialize};
use tokio::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use crate::shared::errors::{CommandError, CommandResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub monitoring: MonitoringSettings,
    pub clipboard: ClipboardSettings,
    pub history: HistorySettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    /// Monitoring state restored at startup; updated on every toggle
    pub enabled_on_start: bool,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardSettings {
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Keep history across restarts in the redb database
    pub persist: bool,
    /// Oldest entries beyond this count are dropped; `None` keeps everything
    pub max_entries: Option<usize>,
    /// Overrides the default database location in the data directory
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub timeout_ms: u64,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            enabled_on_start: true,
            poll_interval_ms: 500,
        }
    }
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self {
            read_timeout_ms: 250,
            write_timeout_ms: 1000,
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            persist: true,
            max_entries: None,
            database_path: None,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "antigravity", "clipboard-history")
}

impl AppSettings {
    pub fn get_settings_path() -> CommandResult<PathBuf> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| CommandError::IoFailure("Failed to determine config directory".to_string()))
    }

    /// Where the history database lives, unless persistence is off
    pub fn database_path(&self) -> Option<PathBuf> {
        if !self.history.persist {
            return None;
        }
        self.history.database_path.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_dir().join("clipboard_history.redb"))
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitoring.poll_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.clipboard.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.clipboard.write_timeout_ms)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export.timeout_ms)
    }

    pub fn validate(&self) -> CommandResult<()> {
        if self.monitoring.poll_interval_ms == 0 {
            return Err(CommandError::InvalidInput("poll_interval_ms must be greater than zero".to_string()));
        }
        if self.history.max_entries == Some(0) {
            return Err(CommandError::InvalidInput("max_entries must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Load settings from `path`, writing defaults there on first run
    pub async fn load_from(path: &Path) -> CommandResult<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path).await?;
            log::info!("[Settings] Created default settings at {}", path.display());
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await
            .map_err(|e| CommandError::IoFailure(format!("Failed to read settings file: {}", e)))?;

        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| CommandError::InvalidInput(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub async fn save_to(&self, path: &Path) -> CommandResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| CommandError::IoFailure(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(path, content).await
            .map_err(|e| CommandError::IoFailure(format!("Failed to write settings file: {}", e)))
    }
}
