//! Monitoring command module
//!
//! Status and toggling of clipboard capture, for the UI and for external
//! controllers such as a tray menu.

use super::AppState;

pub async fn get_monitoring_status(state: &AppState) -> bool {
    state.monitoring().is_enabled()
}

/// Flip monitoring on/off; returns the new state
pub async fn toggle_monitoring(state: &AppState) -> bool {
    let enabled = state.monitoring().toggle();
    remember_monitoring(state, enabled).await;
    enabled
}

/// Force monitoring to `enabled`; returns the new state
pub async fn set_monitoring(state: &AppState, enabled: bool) -> bool {
    let enabled = state.monitoring().set(enabled);
    remember_monitoring(state, enabled).await;
    enabled
}

/// Persist the state so the next startup resumes it. Failures are logged only.
async fn remember_monitoring(state: &AppState, enabled: bool) {
    let mut settings = state.settings_snapshot();
    if settings.monitoring.enabled_on_start == enabled {
        return;
    }
    settings.monitoring.enabled_on_start = enabled;

    if let Some(path) = state.settings_path() {
        if let Err(e) = settings.save_to(path).await {
            log::warn!("[Settings] Failed to persist monitoring state: {}", e);
        }
    }
    state.replace_settings(settings);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clipboard::{ClipboardHistory, TickOutcome};
    use crate::shared::events::AppEvent;
    use crate::shared::settings::AppSettings;
    use crate::system::clipboard::MemoryClipboard;
    use std::sync::Arc;

    #[tokio::test]
    async fn toggle_round_trip_and_event() {
        let state = AppState::with_history(
            AppSettings::default(),
            Arc::new(MemoryClipboard::new()),
            None,
            ClipboardHistory::in_memory(),
        )
        .unwrap();
        let mut events = state.subscribe();

        assert!(get_monitoring_status(&state).await);
        assert!(!toggle_monitoring(&state).await);
        assert!(!get_monitoring_status(&state).await);
        assert!(set_monitoring(&state, true).await);

        assert_eq!(events.recv().await.unwrap(), AppEvent::MonitoringChanged(false));
        assert_eq!(events.recv().await.unwrap(), AppEvent::MonitoringChanged(true));
    }

    #[tokio::test]
    async fn toggle_is_persisted_for_next_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let state = AppState::with_history(
            AppSettings::default(),
            Arc::new(MemoryClipboard::new()),
            Some(path.clone()),
            ClipboardHistory::in_memory(),
        )
        .unwrap();

        toggle_monitoring(&state).await;

        let saved = AppSettings::load_from(&path).await.unwrap();
        assert!(!saved.monitoring.enabled_on_start);
    }

    #[tokio::test]
    async fn off_then_on_captures_only_when_enabled() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let state = AppState::with_history(
            AppSettings::default(),
            clipboard.clone(),
            None,
            ClipboardHistory::in_memory(),
        )
        .unwrap();

        toggle_monitoring(&state).await;
        clipboard.set("copied while paused");
        assert_eq!(state.monitor.poll_once().await, TickOutcome::Disabled);
        assert!(state.history.is_empty());

        toggle_monitoring(&state).await;
        clipboard.set("copied after resume");
        assert!(matches!(state.monitor.poll_once().await, TickOutcome::Captured(_)));
        assert_eq!(state.history.list()[0].text, "copied after resume");
    }
}
