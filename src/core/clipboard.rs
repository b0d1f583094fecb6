//! Clipboard module
//!
//! Provides clipboard history tracking and monitoring functionality.
//!
//! - `history`: ordered history store with persistence and capacity limits
//! - `monitor`: background task that polls the clipboard for changes
//! - `query`: search, selection and copy-back over the history
//! - `export`: atomic plain-text export
//! - `state`: shared monitoring on/off flag
//! - `storage`: redb and in-memory backends

pub mod export;
pub mod history;
pub mod monitor;
pub mod query;
pub mod state;
pub mod storage;

pub use history::ClipboardHistory;
pub use monitor::{ClipboardMonitor, MonitorStatus, TickOutcome};
pub use query::ClipboardQuery;
pub use state::MonitoringState;
