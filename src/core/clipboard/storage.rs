use std::path::Path;
use std::sync::Mutex;

use redb::{Database, ReadableTable, TableDefinition};

use super::state::lock_or_recover;
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::Entry;

/// Redb table definition for clipboard history
/// Key: timestamp (microseconds since epoch), Value: serialized Entry
const CLIPBOARD_TABLE: TableDefinition<i64, &str> = TableDefinition::new("clipboard_history");

/// Storage trait for clipboard history persistence
pub trait Storage: Send + Sync {
    fn save_entry(&self, entry: &Entry) -> CommandResult<()>;
    /// All stored entries, newest first
    fn load_entries(&self) -> CommandResult<Vec<Entry>>;
    fn remove_entries(&self, entries: &[Entry]) -> CommandResult<()>;
    fn clear_all(&self) -> CommandResult<()>;
}

fn entry_key(entry: &Entry) -> i64 {
    entry.timestamp.timestamp_micros()
}

fn db_err(context: &str, e: impl std::fmt::Display) -> CommandError {
    CommandError::Storage(format!("{}: {}", context, e))
}

/// Redb-based storage implementation
pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    pub fn open(path: &Path) -> CommandResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CommandError::IoFailure(format!("Failed to create data directory: {}", e)))?;
            }
        }

        let db = Database::create(path).map_err(|e| db_err("Failed to create database", e))?;

        // Initialize table
        {
            let write_txn = db.begin_write().map_err(|e| db_err("Failed to begin write transaction", e))?;
            {
                let _table = write_txn.open_table(CLIPBOARD_TABLE).map_err(|e| db_err("Failed to open table", e))?;
            }
            write_txn.commit().map_err(|e| db_err("Failed to commit transaction", e))?;
        }

        Ok(Self { db })
    }
}

impl Storage for RedbStorage {
    fn save_entry(&self, entry: &Entry) -> CommandResult<()> {
        let serialized = serde_json::to_string(entry)?;

        let write_txn = self.db.begin_write().map_err(|e| db_err("Failed to begin write", e))?;
        {
            let mut table = write_txn.open_table(CLIPBOARD_TABLE).map_err(|e| db_err("Failed to open table", e))?;
            table
                .insert(entry_key(entry), serialized.as_str())
                .map_err(|e| db_err("Failed to insert", e))?;
        }
        write_txn.commit().map_err(|e| db_err("Failed to commit", e))?;

        Ok(())
    }

    fn load_entries(&self) -> CommandResult<Vec<Entry>> {
        let read_txn = self.db.begin_read().map_err(|e| db_err("Failed to begin read", e))?;
        let table = read_txn.open_table(CLIPBOARD_TABLE).map_err(|e| db_err("Failed to open table", e))?;

        let mut entries = Vec::new();
        // Keys are timestamps, so reverse key order is newest first
        for row in table.iter().map_err(|e| db_err("Failed to create iterator", e))?.rev() {
            let (_, value) = row.map_err(|e| db_err("Failed to read entry", e))?;
            let entry: Entry = serde_json::from_str(value.value())
                .map_err(|e| db_err("Failed to decode entry", e))?;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn remove_entries(&self, entries: &[Entry]) -> CommandResult<()> {
        let write_txn = self.db.begin_write().map_err(|e| db_err("Failed to begin write", e))?;
        {
            let mut table = write_txn.open_table(CLIPBOARD_TABLE).map_err(|e| db_err("Failed to open table", e))?;
            for entry in entries {
                table.remove(entry_key(entry)).map_err(|e| db_err("Failed to remove key", e))?;
            }
        }
        write_txn.commit().map_err(|e| db_err("Failed to commit", e))?;

        Ok(())
    }

    fn clear_all(&self) -> CommandResult<()> {
        let write_txn = self.db.begin_write().map_err(|e| db_err("Failed to begin write", e))?;
        write_txn.delete_table(CLIPBOARD_TABLE).map_err(|e| db_err("Failed to drop table", e))?;
        {
            let _table = write_txn.open_table(CLIPBOARD_TABLE).map_err(|e| db_err("Failed to recreate table", e))?;
        }
        write_txn.commit().map_err(|e| db_err("Failed to commit", e))?;

        Ok(())
    }
}

/// In-memory storage (persistence disabled, or database initialization failed)
#[derive(Default)]
pub struct InMemoryStorage {
    entries: Mutex<Vec<Entry>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStorage {
    fn save_entry(&self, entry: &Entry) -> CommandResult<()> {
        lock_or_recover(&self.entries, "InMemoryStorage").insert(0, entry.clone());
        Ok(())
    }

    fn load_entries(&self) -> CommandResult<Vec<Entry>> {
        Ok(lock_or_recover(&self.entries, "InMemoryStorage").clone())
    }

    fn remove_entries(&self, entries: &[Entry]) -> CommandResult<()> {
        lock_or_recover(&self.entries, "InMemoryStorage").retain(|kept| !entries.contains(kept));
        Ok(())
    }

    fn clear_all(&self) -> CommandResult<()> {
        lock_or_recover(&self.entries, "InMemoryStorage").clear();
        Ok(())
    }
}
