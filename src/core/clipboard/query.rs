//! Read-side operations for the presentation layer

use std::sync::Arc;
use std::time::Duration;

use super::history::ClipboardHistory;
use crate::shared::errors::CommandResult;
use crate::shared::types::Entry;
use crate::system::clipboard::{write_with_timeout, ClipboardSource};

/// Case-insensitive substring match on text or formatted timestamp.
///
/// Order is preserved; an empty query returns everything.
pub fn filter_entries(entries: &[Entry], query: &str) -> Vec<Entry> {
    if query.is_empty() {
        return entries.to_vec();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            entry.text.to_lowercase().contains(&needle)
                || entry.formatted_timestamp().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub struct ClipboardQuery {
    history: ClipboardHistory,
    source: Arc<dyn ClipboardSource>,
    write_timeout: Duration,
}

impl ClipboardQuery {
    pub fn new(history: ClipboardHistory, source: Arc<dyn ClipboardSource>, write_timeout: Duration) -> Self {
        Self {
            history,
            source,
            write_timeout,
        }
    }

    pub fn filter(&self, query: &str) -> Vec<Entry> {
        filter_entries(&self.history.list(), query)
    }

    /// Entry currently at `index` (0 = most recent)
    pub fn entry_at(&self, index: usize) -> Option<Entry> {
        self.history.get(index)
    }

    /// Put the entry's text back on the clipboard
    pub async fn copy_to_clipboard(&self, entry: &Entry) -> CommandResult<()> {
        write_with_timeout(&self.source, entry.text.clone(), self.write_timeout).await
    }
}
