use serde::{Serialize, Deserialize};
use super::types::Entry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")] // Tagged enum for easier frontend parsing
pub enum AppEvent {
    #[serde(rename = "monitoring://changed")]
    MonitoringChanged(bool),

    #[serde(rename = "clipboard://updated")]
    ClipboardUpdated(Entry),

    #[serde(rename = "history://cleared")]
    HistoryCleared,
}

impl AppEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::MonitoringChanged(_) => "monitoring://changed",
            AppEvent::ClipboardUpdated(_) => "clipboard://updated",
            AppEvent::HistoryCleared => "history://cleared",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_name() {
        let json = serde_json::to_value(AppEvent::MonitoringChanged(false)).unwrap();
        assert_eq!(json["event"], "monitoring://changed");
        assert_eq!(json["payload"], false);
        assert_eq!(AppEvent::MonitoringChanged(false).name(), "monitoring://changed");
    }
}
