//! Common constants used across the exporter

/// Product label stamped into every page footer
pub const PRODUCT_LABEL: &str = "MedChat - Medical AI Assistant";

/// Prefix of every exported filename
pub const FILENAME_PREFIX: &str = "MedChat";

/// Extension of the exported artifact
pub const FILE_EXTENSION: &str = "pdf";

/// Fixed title printed in the first-page header band
pub const DOCUMENT_TITLE: &str = "MedChat Conversation";

/// Sender label for assistant turns
pub const ASSISTANT_LABEL: &str = "MedChat AI";

/// Sender label for user turns when no display name is supplied
pub const DEFAULT_USER_NAME: &str = "User";

/// Heading printed above a message's search results
pub const REFERENCES_LABEL: &str = "References";

/// Printed in place of a blank reference title
pub const UNTITLED_SOURCE: &str = "Untitled source";

/// Shown in the header band when the conversation has no title
pub const UNTITLED_CONVERSATION: &str = "Untitled conversation";

/// Used when a title sanitizes down to nothing
pub const FALLBACK_FILENAME_TITLE: &str = "Conversation";

/// Maximum characters of the sanitized title kept in a filename
pub const DEFAULT_FILENAME_TITLE_MAX: usize = 50;

/// Maximum characters of the conversation title shown in the header band
pub const DEFAULT_HEADER_TITLE_MAX: usize = 60;

/// Character that replaces anything outside `[A-Za-z0-9]` in filenames
pub const FILENAME_PLACEHOLDER: char = '_';

/// Millimetres per PostScript point
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// User-facing notices
pub mod messages {
    pub const NOTHING_TO_EXPORT: &str = "Nothing to export: this conversation has no messages.";
    pub const EXPORT_FAILED: &str = "Export failed. Please try again.";
    pub const EXPORT_SUCCEEDED: &str = "Conversation exported";
}

/// Date/time formats (chrono strftime)
pub mod formats {
    /// Filename date suffix
    pub const FILE_DATE: &str = "%Y-%m-%d";
    /// "Exported:" line in the header band
    pub const EXPORTED_AT: &str = "%B %-d, %Y %H:%M UTC";
    /// Right-aligned time in a message header
    pub const MESSAGE_TIME: &str = "%b %-d, %Y %H:%M";
    /// Footer date
    pub const SHORT_DATE: &str = "%-m/%-d/%Y";
}
