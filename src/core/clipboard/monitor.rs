use super::history::ClipboardHistory;
use super::state::{lock_or_recover, MonitoringState};
use crate::shared::emit::{emit_event, EventBus};
use crate::shared::events::AppEvent;
use crate::shared::types::{log_excerpt, normalize, Entry};
use crate::system::clipboard::{ClipboardReader, ClipboardSource};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use chrono::Local;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default time between clipboard samples
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Read failures are logged on the first occurrence and then every Nth
const ERROR_LOG_EVERY: u32 = 10;

/// What a single poll did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Monitoring is off; nothing was read
    Disabled,
    /// Clipboard could not be read this tick
    Unavailable,
    /// No text, or whitespace only
    Empty,
    /// Same as the last captured value
    Unchanged,
    Captured(Entry),
    /// New value, but the history declined it
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    Stopped,
    Running,
}

struct RunningTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Clipboard monitor that polls for changes
pub struct ClipboardMonitor {
    state: MonitoringState,
    last_content: Arc<Mutex<Option<String>>>,
    consecutive_errors: Arc<AtomicU32>,
    history: ClipboardHistory,
    reader: ClipboardReader,
    bus: EventBus,
    poll_interval: Duration,
    task: Arc<Mutex<Option<RunningTask>>>,
}

impl ClipboardMonitor {
    /// Create a stopped monitor.
    ///
    /// The comparison baseline starts at the newest stored entry so a restart
    /// does not record the current clipboard a second time.
    pub fn new(
        history: ClipboardHistory,
        source: Arc<dyn ClipboardSource>,
        state: MonitoringState,
        bus: EventBus,
    ) -> Self {
        let baseline = history.get(0).map(|entry| entry.text);
        Self {
            state,
            last_content: Arc::new(Mutex::new(baseline)),
            consecutive_errors: Arc::new(AtomicU32::new(0)),
            history,
            reader: ClipboardReader::new(source, Duration::from_millis(250)),
            bus,
            poll_interval: DEFAULT_POLL_INTERVAL,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the time between samples. A zero interval is rejected and the
    /// default is kept.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            log::warn!("[ClipboardMonitor] Ignoring zero poll interval, using {:?}", DEFAULT_POLL_INTERVAL);
            self.poll_interval = DEFAULT_POLL_INTERVAL;
        } else {
            self.poll_interval = interval;
        }
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.reader = self.reader.with_timeout(timeout);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn status(&self) -> MonitorStatus {
        match &*lock_or_recover(&self.task, "ClipboardMonitor") {
            Some(running) if !running.handle.is_finished() => MonitorStatus::Running,
            _ => MonitorStatus::Stopped,
        }
    }

    /// Start monitoring clipboard changes. No-op when already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut task = lock_or_recover(&self.task, "ClipboardMonitor");
        if matches!(&*task, Some(running) if !running.handle.is_finished()) {
            log::debug!("[ClipboardMonitor] Already running");
            return;
        }

        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let monitor = self.clone_arc();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            log::info!("[ClipboardMonitor] Started monitoring (every {:?})", poll_interval);
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        // A tick in flight always completes; shutdown is checked before the next one
                        monitor.poll_once().await;
                    }
                }
            }
            log::info!("[ClipboardMonitor] Stopped monitoring");
        });

        *task = Some(RunningTask { shutdown, handle });
    }

    /// Stop the polling loop and wait for it to exit.
    ///
    /// Once this returns no further tick runs. No-op when stopped.
    pub async fn stop(&self) {
        let running = lock_or_recover(&self.task, "ClipboardMonitor").take();
        if let Some(RunningTask { shutdown, handle }) = running {
            let _ = shutdown.send(());
            if let Err(e) = handle.await {
                log::error!("[ClipboardMonitor] Monitor task ended abnormally: {}", e);
            }
        }
    }

    /// Sample the clipboard once and record a new value if there is one
    pub async fn poll_once(&self) -> TickOutcome {
        if !self.state.is_enabled() {
            return TickOutcome::Disabled;
        }

        let current_content = match self.reader.read().await {
            Ok(Some(text)) => {
                self.consecutive_errors.store(0, Ordering::Relaxed);
                text
            }
            Ok(None) => {
                self.consecutive_errors.store(0, Ordering::Relaxed);
                return TickOutcome::Empty;
            }
            Err(e) => {
                let errors = self.consecutive_errors.fetch_add(1, Ordering::Relaxed) + 1;
                // Only log errors occasionally to avoid spam
                if errors == 1 || errors % ERROR_LOG_EVERY == 0 {
                    log::warn!("[ClipboardMonitor] Failed to read clipboard (error #{}): {}", errors, e);
                }
                return TickOutcome::Unavailable;
            }
        };

        if normalize(&current_content).is_empty() {
            return TickOutcome::Empty;
        }

        {
            let mut last = lock_or_recover(&self.last_content, "ClipboardMonitor");
            if last.as_deref().map(normalize) == Some(normalize(&current_content)) {
                return TickOutcome::Unchanged;
            }
            // Updated before the insert so a declined value does not retrigger
            *last = Some(current_content.clone());
        }

        match self.history.insert(current_content, Local::now()) {
            Some(entry) => {
                log::info!("[ClipboardMonitor] Clipboard updated: \"{}\"", log_excerpt(&entry.text));
                emit_event(&self.bus, AppEvent::ClipboardUpdated(entry.clone()));
                TickOutcome::Captured(entry)
            }
            None => TickOutcome::Ignored,
        }
    }

    pub fn state(&self) -> &MonitoringState {
        &self.state
    }

    /// Get a clone for sharing across threads
    pub fn clone_arc(&self) -> Self {
        Self {
            state: self.state.clone(),
            last_content: Arc::clone(&self.last_content),
            consecutive_errors: Arc::clone(&self.consecutive_errors),
            history: self.history.clone_arc(),
            reader: self.reader.clone(),
            bus: self.bus.clone(),
            poll_interval: self.poll_interval,
            task: Arc::clone(&self.task),
        }
    }
}
