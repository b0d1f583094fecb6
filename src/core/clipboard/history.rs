use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, SubsecRound};

use super::export;
use super::state::lock_or_recover;
use super::storage::{InMemoryStorage, RedbStorage, Storage};
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::settings::AppSettings;
use crate::shared::types::{log_excerpt, normalize, Entry};

/// Authoritative, ordered record of captured entries (newest first).
///
/// The in-memory sequence is the source of truth; every mutation is mirrored
/// to `storage` while the lock is held, so readers never observe a torn
/// sequence and storage order matches insert completion order.
pub struct ClipboardHistory {
    entries: Arc<Mutex<Vec<Entry>>>,
    storage: Arc<dyn Storage>,
    max_entries: Option<usize>,
}

impl ClipboardHistory {
    /// Create a history over `storage`, loading what it already holds
    pub fn new(storage: Arc<dyn Storage>, max_entries: Option<usize>) -> Self {
        let mut entries = storage.load_entries().unwrap_or_else(|e| {
            log::error!("[ClipboardHistory] Failed to load stored entries: {}", e);
            Vec::new()
        });
        if let Some(max) = max_entries {
            entries.truncate(max);
        }
        log::info!("[ClipboardHistory] Loaded {} entries", entries.len());

        Self {
            entries: Arc::new(Mutex::new(entries)),
            storage,
            max_entries,
        }
    }

    /// History that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStorage::new()), None)
    }

    /// Open the history configured in `settings`.
    ///
    /// Falls back to in-memory storage if the database cannot be opened.
    pub fn open(settings: &AppSettings) -> Self {
        let max_entries = settings.history.max_entries;
        let storage: Arc<dyn Storage> = match settings.database_path() {
            Some(path) => match RedbStorage::open(&path) {
                Ok(storage) => {
                    log::info!("[ClipboardHistory] Using database at {}", path.display());
                    Arc::new(storage)
                }
                Err(e) => {
                    log::error!("[ClipboardHistory] Failed to initialize database: {}, using in-memory fallback", e);
                    Arc::new(InMemoryStorage::new())
                }
            },
            None => Arc::new(InMemoryStorage::new()),
        };
        Self::new(storage, max_entries)
    }

    /// Prepend a new entry.
    ///
    /// Whitespace-only text is a silent no-op and returns `None`. Repeats are
    /// accepted; consecutive-duplicate suppression belongs to the monitor.
    pub fn insert(&self, text: impl Into<String>, timestamp: DateTime<Local>) -> Option<Entry> {
        let text = text.into();
        if normalize(&text).is_empty() {
            log::debug!("[ClipboardHistory] Ignoring empty text");
            return None;
        }

        let mut entries = lock_or_recover(&self.entries, "ClipboardHistory");

        // Timestamps double as storage keys: keep them unique and increasing
        let mut timestamp = timestamp.trunc_subsecs(6);
        if let Some(head) = entries.first() {
            if timestamp <= head.timestamp {
                timestamp = head.timestamp + chrono::Duration::microseconds(1);
            }
        }

        let entry = Entry::new(text, timestamp);
        entries.insert(0, entry.clone());
        if let Err(e) = self.storage.save_entry(&entry) {
            log::error!("[ClipboardHistory] Failed to save entry: {}", e);
        }

        if let Some(max) = self.max_entries {
            if entries.len() > max {
                let dropped = entries.split_off(max);
                if let Err(e) = self.storage.remove_entries(&dropped) {
                    log::error!("[ClipboardHistory] Failed to drop {} old entries: {}", dropped.len(), e);
                }
            }
        }

        log::debug!("[ClipboardHistory] Added entry: \"{}\"", log_excerpt(&entry.text));
        Some(entry)
    }

    /// Snapshot of all entries, newest first
    pub fn list(&self) -> Vec<Entry> {
        lock_or_recover(&self.entries, "ClipboardHistory").clone()
    }

    /// Entry by position (0 = most recent)
    pub fn get(&self, index: usize) -> Option<Entry> {
        lock_or_recover(&self.entries, "ClipboardHistory").get(index).cloned()
    }

    pub fn len(&self) -> usize {
        lock_or_recover(&self.entries, "ClipboardHistory").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry. Clearing an empty history is a no-op.
    pub fn clear(&self) -> CommandResult<()> {
        let mut entries = lock_or_recover(&self.entries, "ClipboardHistory");
        if entries.is_empty() {
            return Ok(());
        }
        // Storage first: on failure both copies keep every entry
        self.storage.clear_all()?;
        entries.clear();
        log::info!("[ClipboardHistory] Cleared all entries");
        Ok(())
    }

    /// Write the current snapshot to `destination` (blocking)
    pub fn export(&self, destination: &Path) -> CommandResult<()> {
        export::write_export(&self.list(), destination)
    }

    /// Export on the blocking pool, failing with `IoFailure` after `timeout`.
    ///
    /// A timed-out export is cancelled before it can reach `destination`. If
    /// the rename had already started, its outcome is awaited and returned.
    pub async fn export_with_timeout(&self, destination: PathBuf, timeout: Duration) -> CommandResult<()> {
        let snapshot = self.list();
        let cancel = Arc::new(export::ExportCancel::new());
        let mut task = tokio::task::spawn_blocking({
            let cancel = Arc::clone(&cancel);
            move || export::write_export_cancellable(&snapshot, &destination, &cancel)
        });

        let joined = match tokio::time::timeout(timeout, &mut task).await {
            Ok(joined) => joined,
            Err(_) if cancel.cancel() => {
                return Err(CommandError::IoFailure(format!("Export timed out after {:?}", timeout)));
            }
            Err(_) => task.await,
        };
        joined.map_err(|e| CommandError::IoFailure(format!("Export task failed: {}", e)))?
    }

    /// Get a clone of the Arc for sharing across threads
    pub fn clone_arc(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            storage: Arc::clone(&self.storage),
            max_entries: self.max_entries,
        }
    }
}

impl Default for ClipboardHistory {
    fn default() -> Self {
        Self::in_memory()
    }
}
