//! Settings command module
//!
//! Handles application settings persistence. Saved values apply at the next
//! start, except monitoring state which the monitoring commands keep live.

use super::AppState;
use crate::shared::errors::CommandResult;
use crate::shared::settings::AppSettings;

/// Get current application settings
pub async fn get_settings(state: &AppState) -> AppSettings {
    state.settings_snapshot()
}

/// Save application settings
pub async fn save_settings(state: &AppState, settings: AppSettings) -> CommandResult<()> {
    settings.validate()?;
    if let Some(path) = state.settings_path() {
        settings.save_to(path).await?;
    }
    state.replace_settings(settings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clipboard::ClipboardHistory;
    use crate::shared::errors::CommandError;
    use crate::system::clipboard::MemoryClipboard;
    use std::sync::Arc;

    #[tokio::test]
    async fn saves_valid_and_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let state = AppState::with_history(
            AppSettings::default(),
            Arc::new(MemoryClipboard::new()),
            Some(path.clone()),
            ClipboardHistory::in_memory(),
        )
        .unwrap();

        let mut settings = get_settings(&state).await;
        settings.history.max_entries = Some(100);
        save_settings(&state, settings.clone()).await.unwrap();
        assert_eq!(get_settings(&state).await, settings);
        assert_eq!(AppSettings::load_from(&path).await.unwrap(), settings);

        let mut invalid = settings.clone();
        invalid.monitoring.poll_interval_ms = 0;
        let result = save_settings(&state, invalid).await;
        assert!(matches!(result, Err(CommandError::InvalidInput(_))));
        assert_eq!(get_settings(&state).await, settings);
    }
}
