//! MedChat Common - Shared types for the conversation exporter
//!
//! This crate provides the error type, export configuration, transcript
//! types and small helpers shared by the exporter library and its CLI host.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::{Colors, ExportConfig, Labels, PageGeometry, Rgb, Typography};
pub use error::{ExportError, Result};
pub use types::{ExportRequest, Message, Role, SearchResult, Transcript};
pub use utils::{export_filename, parse_timestamp, sanitize_title, truncate_chars};
