use std::sync::{Arc, Mutex, MutexGuard};

use crate::shared::emit::{emit_event, EventBus};
use crate::shared::events::AppEvent;

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("[{}] Mutex poisoned, recovering...", context);
            poisoned.into_inner()
        }
    }
}

/// Thread-safe monitoring on/off flag.
///
/// Every flip, whatever triggered it, is published as
/// `AppEvent::MonitoringChanged`.
#[derive(Clone)]
pub struct MonitoringState {
    enabled: Arc<Mutex<bool>>,
    bus: EventBus,
}

impl MonitoringState {
    pub fn new(enabled: bool, bus: EventBus) -> Self {
        Self {
            enabled: Arc::new(Mutex::new(enabled)),
            bus,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *lock_or_recover(&self.enabled, "MonitoringState")
    }

    /// Set the flag; returns the new state
    pub fn set(&self, enabled: bool) -> bool {
        let mut guard = lock_or_recover(&self.enabled, "MonitoringState");
        if *guard != enabled {
            *guard = enabled;
            log::info!("[MonitoringState] Monitoring {}", if enabled { "enabled" } else { "disabled" });
            // Sent under the lock so events arrive in the order the flag changed
            emit_event(&self.bus, AppEvent::MonitoringChanged(enabled));
        }
        enabled
    }

    /// Flip the flag; returns the new state
    pub fn toggle(&self) -> bool {
        let mut guard = lock_or_recover(&self.enabled, "MonitoringState");
        *guard = !*guard;
        let new_state = *guard;
        log::info!("[MonitoringState] Toggled to {}", new_state);
        emit_event(&self.bus, AppEvent::MonitoringChanged(new_state));
        new_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toggle_flips_and_notifies() {
        let bus = EventBus::new();
        let mut events = bus.subscribe();
        let state = MonitoringState::new(true, bus);

        assert!(!state.toggle());
        assert!(!state.is_enabled());
        assert!(state.toggle());

        assert_eq!(events.recv().await.unwrap(), AppEvent::MonitoringChanged(false));
        assert_eq!(events.recv().await.unwrap(), AppEvent::MonitoringChanged(true));
    }

    #[test]
    fn set_only_notifies_on_change() {
        let bus = EventBus::new();
        let mut events = bus.subscribe();
        let state = MonitoringState::new(false, bus);

        assert!(!state.set(false));
        assert!(events.try_recv().is_err());

        assert!(state.set(true));
        assert_eq!(events.try_recv().unwrap(), AppEvent::MonitoringChanged(true));
    }

    #[test]
    fn clones_share_the_flag() {
        let state = MonitoringState::new(true, EventBus::new());
        let other = state.clone();
        other.set(false);
        assert!(!state.is_enabled());
    }

    #[test]
    fn last_event_matches_state_under_contention() {
        use tokio::sync::broadcast::error::TryRecvError;

        let bus = EventBus::new();
        let mut events = bus.subscribe();
        let state = MonitoringState::new(true, bus);

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        if i % 2 == 0 {
                            state.toggle();
                        } else {
                            state.set(i % 4 == 1);
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let mut last = None;
        loop {
            match events.try_recv() {
                Ok(event) => last = Some(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        assert_eq!(last, Some(AppEvent::MonitoringChanged(state.is_enabled())));
    }
}
