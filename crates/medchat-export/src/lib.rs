//! MedChat conversation exporter
//!
//! Turns a conversation transcript into a paginated PDF: a header band on
//! the first page, one coloured header per message, word-wrapped body text
//! with `**bold**` emphasis, numbered reference lists with clickable URLs,
//! and a `Page i/N` footer on every page.
//!
//! ```no_run
//! use medchat_common::{ExportRequest, Message};
//! use medchat_export::{DirectorySink, Exporter, LogNotifier};
//!
//! # async fn run() -> medchat_common::Result<()> {
//! let request = ExportRequest::new("Checkup", vec![Message::user("Is **this** normal?")]);
//! let saved = Exporter::new()
//!     .export_conversation(&request, &DirectorySink::new("."), &LogNotifier)
//!     .await?;
//! println!("{}", saved.location);
//! # Ok(())
//! # }
//! ```

pub mod decorate;
pub mod document;
pub mod exporter;
pub mod inline;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod sink;
pub mod wrap;

pub use document::{DrawOp, Page};
pub use exporter::{ExportedDocument, Exporter, SavedExport};
pub use inline::{StyledRun, parse_runs};
pub use layout::{LayoutEngine, RenderCursor};
pub use metrics::{Font, TextStyle};
pub use sink::{ArtifactSink, DirectorySink, LogNotifier, MemorySink, Notifier};
pub use wrap::{RunStyles, VisualLine, wrap_runs};
