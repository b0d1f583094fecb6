//! Host integration
//!
//! - `clipboard`: OS clipboard read/write behind the `ClipboardSource` trait

pub mod clipboard;
