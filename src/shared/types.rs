use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Display and export format for entry timestamps (locale independent)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maximum preview length in characters
const PREVIEW_MAX_CHARS: usize = 300;

/// One captured clipboard snapshot.
///
/// `text` keeps the original formatting; trimming only applies when comparing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Entry {
    pub fn new(text: String, timestamp: DateTime<Local>) -> Self {
        Self { text, timestamp }
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Single-line preview for list display.
    ///
    /// Whitespace runs collapse to one space; long text is cut at
    /// `PREVIEW_MAX_CHARS` characters and suffixed with `...`.
    pub fn preview(&self) -> String {
        let collapsed = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() > PREVIEW_MAX_CHARS {
            let cut: String = collapsed.chars().take(PREVIEW_MAX_CHARS).collect();
            format!("{}...", cut)
        } else {
            collapsed
        }
    }
}

/// Trimmed form used for emptiness and duplicate checks
pub fn normalize(text: &str) -> &str {
    text.trim()
}

/// Short char-safe excerpt for log lines
pub fn log_excerpt(text: &str) -> String {
    if text.chars().count() > 20 {
        format!("{}...", text.chars().take(20).collect::<String>())
    } else {
        text.to_string()
    }
}
