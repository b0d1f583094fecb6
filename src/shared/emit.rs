use tokio::sync::broadcast;
use super::events::AppEvent;

/// Buffered events per subscriber before slow receivers start lagging
const EVENT_CAPACITY: usize = 64;

/// Fan-out channel for application events.
///
/// Subscribers are optional: emitting with nobody listening is not an error.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Register a new subscriber; it receives events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit an application event to all subscribers
pub fn emit_event(bus: &EventBus, event: AppEvent) {
    let name = event.name();
    match bus.sender.send(event) {
        Ok(count) => log::debug!("Emitted {} to {} subscriber(s)", name, count),
        Err(_) => log::trace!("No subscribers for {}", name),
    }
}
