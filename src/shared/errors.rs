//! Strict error handling with CommandError enum
//!
//! Every operation exposed to the presentation layer returns a
//! `CommandResult`. All errors are serializable so they can cross an IPC
//! boundary unchanged.

use thiserror::Error;
use serde::Serialize;

/// Command execution errors
///
/// Failures are per operation: none of these variants terminates the
/// monitoring loop or the process.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CommandError {
    /// The OS clipboard could not be read or written (locked, non-textual, timed out)
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// A file (export destination, settings file) could not be written or read
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// Invalid input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backing history database failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::IoFailure(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::InvalidInput(format!("JSON error: {}", err))
    }
}

// Helper type alias for command results
pub type CommandResult<T> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_io_failure() {
        let err: CommandError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, CommandError::IoFailure(msg) if msg.contains("denied")));
    }

    #[test]
    fn serializes_with_type_tag() {
        let err = CommandError::ClipboardUnavailable("locked".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "ClipboardUnavailable");
        assert_eq!(json["message"], "locked");
    }
}
