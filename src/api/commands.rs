//! Command modules for the presentation layer
//!
//! Every operation the UI (or a tray controller) can request lives here as an
//! async function over a shared `AppState`.
//!
//! ## Architecture
//!
//! - `history`: list, add, clear, export, search and copy-back
//! - `monitoring`: status and toggling of clipboard capture
//! - `settings`: settings persistence

pub mod history;
pub mod monitoring;
pub mod settings;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::core::clipboard::{ClipboardHistory, ClipboardMonitor, ClipboardQuery, MonitoringState};
use crate::core::clipboard::state::lock_or_recover;
use crate::shared::emit::EventBus;
use crate::shared::errors::CommandResult;
use crate::shared::events::AppEvent;
use crate::shared::settings::AppSettings;
use crate::system::clipboard::ClipboardSource;

/// Everything the commands operate on
pub struct AppState {
    pub history: ClipboardHistory,
    pub monitor: ClipboardMonitor,
    pub query: ClipboardQuery,
    pub bus: EventBus,
    settings: Mutex<AppSettings>,
    /// Where settings are saved; `None` keeps them in memory only
    settings_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        settings: AppSettings,
        source: Arc<dyn ClipboardSource>,
        settings_path: Option<PathBuf>,
    ) -> CommandResult<Self> {
        settings.validate()?;
        let history = ClipboardHistory::open(&settings);
        Self::with_history(settings, source, settings_path, history)
    }

    /// Build the state over an existing history. Fails with `InvalidInput`
    /// when `settings` do not validate.
    pub fn with_history(
        settings: AppSettings,
        source: Arc<dyn ClipboardSource>,
        settings_path: Option<PathBuf>,
        history: ClipboardHistory,
    ) -> CommandResult<Self> {
        settings.validate()?;
        let bus = EventBus::new();
        let state = MonitoringState::new(settings.monitoring.enabled_on_start, bus.clone());
        let monitor = ClipboardMonitor::new(history.clone_arc(), Arc::clone(&source), state, bus.clone())
            .with_poll_interval(settings.poll_interval())
            .with_read_timeout(settings.read_timeout());
        let query = ClipboardQuery::new(history.clone_arc(), source, settings.write_timeout());

        Ok(Self {
            history,
            monitor,
            query,
            bus,
            settings: Mutex::new(settings),
            settings_path,
        })
    }

    pub fn monitoring(&self) -> &MonitoringState {
        self.monitor.state()
    }

    /// Subscribe to application events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AppEvent> {
        self.bus.subscribe()
    }

    pub(crate) fn settings_snapshot(&self) -> AppSettings {
        lock_or_recover(&self.settings, "AppState").clone()
    }

    pub(crate) fn replace_settings(&self, settings: AppSettings) {
        *lock_or_recover(&self.settings, "AppState") = settings;
    }

    pub(crate) fn settings_path(&self) -> Option<&PathBuf> {
        self.settings_path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::CommandError;
    use crate::system::clipboard::MemoryClipboard;

    #[test]
    fn invalid_settings_are_rejected() {
        let mut settings = AppSettings::default();
        settings.monitoring.poll_interval_ms = 0;

        let result = AppState::with_history(
            settings,
            Arc::new(MemoryClipboard::new()),
            None,
            ClipboardHistory::in_memory(),
        );

        assert!(matches!(result, Err(CommandError::InvalidInput(_))));
    }
}
