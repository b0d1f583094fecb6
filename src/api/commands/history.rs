//! History command module
//!
//! Browse, add, clear, export, search and copy back clipboard entries.

use std::path::PathBuf;

use chrono::Local;

use super::AppState;
use crate::shared::emit::emit_event;
use crate::shared::errors::CommandResult;
use crate::shared::events::AppEvent;
use crate::shared::types::Entry;

/// Get all entries, newest first
pub async fn get_history(state: &AppState) -> Vec<Entry> {
    state.history.list()
}

/// Record `text` directly. `None` means the text was empty after trimming.
pub async fn add_to_history(state: &AppState, text: String) -> Option<Entry> {
    let entry = state.history.insert(text, Local::now())?;
    emit_event(&state.bus, AppEvent::ClipboardUpdated(entry.clone()));
    Some(entry)
}

pub async fn clear_history(state: &AppState) -> CommandResult<()> {
    let was_empty = state.history.is_empty();
    state.history.clear()?;
    if !was_empty {
        emit_event(&state.bus, AppEvent::HistoryCleared);
    }
    Ok(())
}

/// Export the history to `file_path`, replacing it atomically
pub async fn export_history(state: &AppState, file_path: PathBuf) -> CommandResult<()> {
    let timeout = state.settings_snapshot().export_timeout();
    state.history.export_with_timeout(file_path, timeout).await
}

pub async fn copy_entry(state: &AppState, entry: Entry) -> CommandResult<()> {
    state.query.copy_to_clipboard(&entry).await
}

pub async fn search_history(state: &AppState, query: String) -> Vec<Entry> {
    state.query.filter(&query)
}

pub async fn get_entry(state: &AppState, index: usize) -> Option<Entry> {
    state.query.entry_at(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clipboard::ClipboardHistory;
    use crate::shared::errors::CommandError;
    use crate::shared::settings::AppSettings;
    use crate::system::clipboard::MemoryClipboard;
    use std::sync::Arc;

    fn app() -> (AppState, Arc<MemoryClipboard>) {
        let clipboard = Arc::new(MemoryClipboard::new());
        let state = AppState::with_history(
            AppSettings::default(),
            clipboard.clone(),
            None,
            ClipboardHistory::in_memory(),
        )
        .unwrap();
        (state, clipboard)
    }

    #[tokio::test]
    async fn add_then_get() {
        let (state, _) = app();
        let mut events = state.subscribe();

        let entry = add_to_history(&state, "hello".to_string()).await.unwrap();
        assert_eq!(add_to_history(&state, "   ".to_string()).await, None);

        assert_eq!(get_history(&state).await, vec![entry.clone()]);
        assert_eq!(events.recv().await.unwrap(), AppEvent::ClipboardUpdated(entry));
    }

    #[tokio::test]
    async fn clear_notifies_once() {
        let (state, _) = app();
        add_to_history(&state, "x".to_string()).await;
        let mut events = state.subscribe();

        clear_history(&state).await.unwrap();
        clear_history(&state).await.unwrap();

        assert!(get_history(&state).await.is_empty());
        assert_eq!(events.recv().await.unwrap(), AppEvent::HistoryCleared);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn export_writes_file() {
        let (state, _) = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let entry = add_to_history(&state, "exported".to_string()).await.unwrap();

        export_history(&state, path.clone()).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("[{}] exported\n\n", entry.formatted_timestamp())
        );
    }

    #[tokio::test]
    async fn export_failure_is_io_failure() {
        let (state, _) = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("out.txt");

        let result = export_history(&state, path.clone()).await;

        assert!(matches!(result, Err(CommandError::IoFailure(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn copy_search_and_select() {
        let (state, clipboard) = app();
        add_to_history(&state, "alpha".to_string()).await;
        add_to_history(&state, "beta".to_string()).await;

        let found = search_history(&state, "ALP".to_string()).await;
        assert_eq!(found.len(), 1);

        copy_entry(&state, found[0].clone()).await.unwrap();
        assert_eq!(clipboard.get().as_deref(), Some("alpha"));

        assert_eq!(get_entry(&state, 0).await.unwrap().text, "beta");
        assert_eq!(get_entry(&state, 5).await, None);
    }
}
