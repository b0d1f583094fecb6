//! OS clipboard access
//!
//! `ClipboardSource` is the seam between the core and the host clipboard.
//! Host calls are blocking, so the async helpers run them on the blocking
//! pool under a timeout and turn hangs into `ClipboardUnavailable`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::core::clipboard::state::lock_or_recover;
use crate::shared::errors::{CommandError, CommandResult};

/// Text-only clipboard access
pub trait ClipboardSource: Send + Sync {
    /// Current clipboard text; `None` when the clipboard holds no text
    fn read_text(&self) -> CommandResult<Option<String>>;

    fn write_text(&self, text: &str) -> CommandResult<()>;
}

/// Host clipboard through cli-clipboard.
///
/// A fresh context is opened per call so the source stays `Send + Sync`.
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> CommandResult<Option<String>> {
        use cli_clipboard::{ClipboardContext, ClipboardProvider};

        let contents = ClipboardContext::new()
            .and_then(|mut ctx| ctx.get_contents())
            .map_err(|e| CommandError::ClipboardUnavailable(e.to_string()))?;

        Ok(if contents.is_empty() { None } else { Some(contents) })
    }

    fn write_text(&self, text: &str) -> CommandResult<()> {
        use cli_clipboard::{ClipboardContext, ClipboardProvider};

        ClipboardContext::new()
            .and_then(|mut ctx| ctx.set_contents(text.to_string()))
            .map_err(|e| CommandError::ClipboardUnavailable(format!("Failed to write to clipboard: {}", e)))
    }
}

/// In-process clipboard, used by tests and hosts without a clipboard
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    unavailable: Mutex<bool>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate another application copying `text`
    pub fn set(&self, text: &str) {
        *lock(&self.contents) = Some(text.to_string());
    }

    pub fn get(&self) -> Option<String> {
        lock(&self.contents).clone()
    }

    /// While set, every read and write fails with `ClipboardUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        *lock(&self.unavailable) = unavailable;
    }

    fn check_available(&self) -> CommandResult<()> {
        if *lock(&self.unavailable) {
            Err(CommandError::ClipboardUnavailable("clipboard is locked".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ClipboardSource for MemoryClipboard {
    fn read_text(&self) -> CommandResult<Option<String>> {
        self.check_available()?;
        Ok(self.get().filter(|text| !text.is_empty()))
    }

    fn write_text(&self, text: &str) -> CommandResult<()> {
        self.check_available()?;
        self.set(text);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    lock_or_recover(mutex, "MemoryClipboard")
}

type ReadTask = JoinHandle<CommandResult<Option<String>>>;

/// Timeout-bounded clipboard reads with at most one host call outstanding.
///
/// A read that outlives its timeout keeps running on the blocking pool. Until
/// it returns, further reads fail fast instead of piling up blocked threads;
/// once it has returned, its result serves the next read.
#[derive(Clone)]
pub struct ClipboardReader {
    source: Arc<dyn ClipboardSource>,
    timeout: Duration,
    in_flight: Arc<Mutex<Option<ReadTask>>>,
}

impl ClipboardReader {
    pub fn new(source: Arc<dyn ClipboardSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a timed-out host read is still running
    #[cfg(test)]
    fn is_pending(&self) -> bool {
        matches!(&*lock_or_recover(&self.in_flight, "ClipboardReader"), Some(task) if !task.is_finished())
    }

    pub async fn read(&self) -> CommandResult<Option<String>> {
        let mut task = {
            let mut in_flight = lock_or_recover(&self.in_flight, "ClipboardReader");
            match in_flight.take() {
                Some(task) if !task.is_finished() => {
                    *in_flight = Some(task);
                    return Err(CommandError::ClipboardUnavailable(
                        "Previous clipboard read has not returned".to_string(),
                    ));
                }
                Some(task) => task,
                None => {
                    let source = Arc::clone(&self.source);
                    tokio::task::spawn_blocking(move || source.read_text())
                }
            }
        };

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(CommandError::ClipboardUnavailable(format!("Clipboard read task failed: {}", join_err))),
            Err(_) => {
                *lock_or_recover(&self.in_flight, "ClipboardReader") = Some(task);
                Err(CommandError::ClipboardUnavailable(format!("Clipboard read timed out after {:?}", self.timeout)))
            }
        }
    }
}

/// Write the clipboard on the blocking pool, bounded by `timeout`
pub async fn write_with_timeout(
    source: &Arc<dyn ClipboardSource>,
    text: String,
    timeout: Duration,
) -> CommandResult<()> {
    let source = Arc::clone(source);
    let task = tokio::task::spawn_blocking(move || source.write_text(&text));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(CommandError::ClipboardUnavailable(format!("Clipboard write task failed: {}", join_err))),
        Err(_) => Err(CommandError::ClipboardUnavailable(format!("Clipboard write timed out after {:?}", timeout))),
    }
}
