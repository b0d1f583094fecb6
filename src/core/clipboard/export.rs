//! Plain-text history export
//!
//! Each entry becomes `[YYYY-MM-DD HH:MM:SS] text` followed by a blank line,
//! newest first. The file is staged next to the destination and renamed into
//! place, so a failed export never leaves a partial file behind.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

use tempfile::NamedTempFile;

use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::Entry;

/// Render entries in export format, in the given order
pub fn format_export(entries: &[Entry]) -> String {
    let mut content = String::new();
    for entry in entries {
        content.push_str(&format!("[{}] {}\n\n", entry.formatted_timestamp(), entry.text));
    }
    content
}

const PENDING: u8 = 0;
const COMMITTING: u8 = 1;
const CANCELLED: u8 = 2;

/// Decides, exactly once, whether a staged export is renamed into place or
/// abandoned.
#[derive(Debug, Default)]
pub struct ExportCancel {
    phase: AtomicU8,
}

impl ExportCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon the export. Returns `false` when the rename has already begun,
    /// in which case the export's own result is final.
    pub fn cancel(&self) -> bool {
        match self.phase.compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => true,
            Err(phase) => phase == CANCELLED,
        }
    }

    fn begin_commit(&self) -> bool {
        self.phase
            .compare_exchange(PENDING, COMMITTING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Atomically write `entries` to `destination`, replacing any existing file
pub fn write_export(entries: &[Entry], destination: &Path) -> CommandResult<()> {
    write_export_cancellable(entries, destination, &ExportCancel::new())
}

/// Like `write_export`, but gives up without touching `destination` once
/// `cancel` has been triggered
pub fn write_export_cancellable(entries: &[Entry], destination: &Path, cancel: &ExportCancel) -> CommandResult<()> {
    let dir = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir)
        .map_err(|e| CommandError::IoFailure(format!("Failed to stage export in {}: {}", dir.display(), e)))?;

    staged
        .write_all(format_export(entries).as_bytes())
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| CommandError::IoFailure(format!("Failed to write export: {}", e)))?;

    if !cancel.begin_commit() {
        // Dropping the staged file deletes it
        log::warn!("[Export] Export to {} cancelled", destination.display());
        return Err(CommandError::IoFailure(format!("Export to {} was cancelled", destination.display())));
    }

    // On failure the PersistError drops the staged file, which deletes it
    staged
        .persist(destination)
        .map_err(|e| CommandError::IoFailure(format!("Failed to export history to {}: {}", destination.display(), e.error)))?;

    log::info!("[Export] Wrote {} entries to {}", entries.len(), destination.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn sample() -> Vec<Entry> {
        vec![
            Entry::new("newest".to_string(), Local.with_ymd_and_hms(2024, 1, 2, 10, 0, 5).unwrap()),
            Entry::new("multi\nline".to_string(), Local.with_ymd_and_hms(2024, 1, 2, 9, 59, 59).unwrap()),
        ]
    }

    #[test]
    fn formats_blocks_newest_first() {
        assert_eq!(
            format_export(&sample()),
            "[2024-01-02 10:00:05] newest\n\n[2024-01-02 09:59:59] multi\nline\n\n"
        );
        assert_eq!(format_export(&[]), "");
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        std::fs::write(&path, "old contents").unwrap();

        write_export(&sample(), &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), format_export(&sample()));
        // Only the destination is left in the directory
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("history.txt");

        let result = write_export(&sample(), &path);

        assert!(matches!(result, Err(CommandError::IoFailure(_))));
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_leaves_destination_and_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep.txt"), "keep").unwrap();

        let result = write_export(&sample(), &path);

        assert!(matches!(result, Err(CommandError::IoFailure(_))));
        assert_eq!(std::fs::read_to_string(path.join("keep.txt")).unwrap(), "keep");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn cancelled_export_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let cancel = ExportCancel::new();
        assert!(cancel.cancel());

        let result = write_export_cancellable(&sample(), &path, &cancel);

        assert!(matches!(result, Err(CommandError::IoFailure(_))));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn cancel_after_commit_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let cancel = ExportCancel::new();

        write_export_cancellable(&sample(), &path, &cancel).unwrap();

        assert!(!cancel.cancel());
        assert!(path.exists());
    }
}
