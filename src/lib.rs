//! Clipboard history capture service
//!
//! Watches the system clipboard, keeps an ordered, deduplicated history of
//! copied text and exposes it through `api::commands` for a presentation
//! layer to browse, search, copy back, clear and export.

pub mod api;
pub mod core;
pub mod shared;
pub mod system;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use api::AppState;
use shared::errors::CommandResult;
use shared::events::AppEvent;
use shared::settings::AppSettings;
use shared::types::log_excerpt;
use system::clipboard::SystemClipboard;

/// Run the service on the system clipboard until Ctrl-C
pub async fn run(settings: AppSettings, settings_path: Option<PathBuf>) -> CommandResult<()> {
    let state = AppState::new(settings, Arc::new(SystemClipboard), settings_path)?;
    let mut events = state.subscribe();

    state.monitor.start();
    log::info!(
        "✅ Clipboard monitoring started ({} entries, every {:?}, monitoring {})",
        state.history.len(),
        state.monitor.poll_interval(),
        if state.monitoring().is_enabled() { "on" } else { "off" }
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    log::error!("Failed to listen for shutdown signal: {}", e);
                }
                break;
            }
            event = events.recv() => match event {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => log::warn!("Event log lagged, skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    log::info!("Shutting down...");
    state.monitor.stop().await;
    Ok(())
}

fn log_event(event: &AppEvent) {
    match event {
        AppEvent::MonitoringChanged(enabled) => {
            log::info!("{} monitoring {}", event.name(), if *enabled { "enabled" } else { "disabled" })
        }
        AppEvent::ClipboardUpdated(entry) => {
            log::info!("{} [{}] {}", event.name(), entry.formatted_timestamp(), log_excerpt(&entry.preview()))
        }
        AppEvent::HistoryCleared => log::info!("{}", event.name()),
    }
}
