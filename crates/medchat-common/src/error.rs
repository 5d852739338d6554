//! MedChat exporter error types
//!
//! Centralized error handling for the exporter and its hosts

use std::fmt;

use crate::constants::messages;

/// Main error type for export operations
#[derive(Debug)]
pub enum ExportError {
    /// The transcript had no messages
    EmptyTranscript,
    /// Page geometry or layout could not be satisfied
    Layout(String),
    /// Drawing or document serialization failed
    Render(String),
    /// IO-related errors (saving the artifact, reading input)
    Io(std::io::Error),
    /// Transcript (de)serialization errors
    Serde(serde_json::Error),
    /// Configuration errors
    Config(String),
}

impl ExportError {
    /// Message that is safe to show to the end user.
    ///
    /// Only the empty-input case gets a specific notice; every other failure
    /// collapses to the generic retry message so internals never reach the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::EmptyTranscript => messages::NOTHING_TO_EXPORT,
            _ => messages::EXPORT_FAILED,
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::EmptyTranscript => write!(f, "Transcript contains no messages"),
            ExportError::Layout(msg) => write!(f, "Layout error: {}", msg),
            ExportError::Render(msg) => write!(f, "Render error: {}", msg),
            ExportError::Io(err) => write!(f, "IO error: {}", err),
            ExportError::Serde(err) => write!(f, "Serialization error: {}", err),
            ExportError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Serde(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serde(err)
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Config(err.to_string())
    }
}
