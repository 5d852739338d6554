//! Conversation export entry point
//!
//! [`Exporter::render`] is the pure part: request in, named PDF bytes out.
//! [`Exporter::export_conversation`] wraps it for hosts, running the render
//! on a blocking worker and reporting through the sink and notifier seams.

use crate::decorate::{
    draw_document_header, draw_message_header, draw_references, message_time, stamp_footers,
};
use crate::document::Page;
use crate::inline::parse_runs;
use crate::layout::LayoutEngine;
use crate::metrics::TextStyle;
use crate::pdf::{DocumentInfo, write_pdf};
use crate::sink::{ArtifactSink, Notifier};
use crate::wrap::{RunStyles, wrap_runs};
use chrono::{DateTime, Utc};
use medchat_common::constants::messages;
use medchat_common::{
    ExportConfig, ExportError, ExportRequest, Message, Result, Role, export_filename,
};
use tracing::{debug, error, info};

/// A rendered document, not yet saved anywhere
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Laid-out pages, footers included
    pub pages: Vec<Page>,
}

impl ExportedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedExport {
    pub filename: String,
    /// Where the sink put the artifact
    pub location: String,
    pub page_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Lay out and serialize `request` as exported at `now`
    pub fn render(&self, request: &ExportRequest, now: DateTime<Utc>) -> Result<ExportedDocument> {
        if request.messages.is_empty() {
            return Err(ExportError::EmptyTranscript);
        }
        self.config.validate()?;

        info!(
            "Rendering {} messages from '{}'",
            request.messages.len(),
            request.conversation_title
        );

        let mut engine = LayoutEngine::new(self.config.page.clone());
        draw_document_header(&mut engine, &self.config, &request.conversation_title, now);

        for message in &request.messages {
            let sender = match message.role {
                Role::User => request.user_label(),
                Role::Assistant => self.config.labels.assistant.as_str(),
            };
            self.render_message(&mut engine, message, sender, now);
        }

        let mut pages = engine.finish();
        stamp_footers(&mut pages, &self.config, now);

        let title = request.conversation_title.trim();
        let info = DocumentInfo {
            title: if title.is_empty() {
                self.config.labels.document_title.clone()
            } else {
                title.to_string()
            },
            producer: self.config.labels.product.clone(),
            created_at: now,
        };
        let bytes = write_pdf(&pages, &self.config.page, &info)?;
        let filename = export_filename(
            &self.config.labels.filename_prefix,
            &request.conversation_title,
            self.config.filename_title_max,
            now,
        );

        info!(
            "Rendered {} ({} pages, {} bytes)",
            filename,
            pages.len(),
            bytes.len()
        );
        Ok(ExportedDocument {
            filename,
            bytes,
            pages,
        })
    }

    fn render_message(
        &self,
        engine: &mut LayoutEngine,
        message: &Message,
        sender: &str,
        now: DateTime<Utc>,
    ) {
        let page = &self.config.page;
        let time = message_time(message.created_at.as_deref(), now);
        draw_message_header(engine, &self.config, message.role, sender, &time);

        let size = self.config.typography.body;
        let color = self.config.colors.body;
        let styles = RunStyles::new(TextStyle::regular(size, color), TextStyle::bold(size, color));
        let x = page.margin + page.body_indent;
        let line_height = page.line_height;

        for logical in message.content.split('\n') {
            let logical = logical.strip_suffix('\r').unwrap_or(logical);
            let runs = parse_runs(logical);
            if runs.is_empty() {
                // Blank lines keep their vertical space
                engine.ensure_space(line_height);
                engine.advance(line_height);
                continue;
            }
            for line in wrap_runs(&runs, &styles, page.wrap_width()) {
                engine.emit_line(x, &line, &styles, line_height);
            }
        }

        draw_references(engine, &self.config, message.references());
        engine.advance(page.message_gap);
        debug!(
            "Laid out {} message, cursor at page {} y={:.1}",
            message.role,
            engine.cursor().page_index,
            engine.y()
        );
    }

    /// Render on a blocking worker, hand the bytes to `sink` and tell the
    /// user how it went. Failures are logged in full but only surface to the
    /// user as a generic notice.
    pub async fn export_conversation(
        &self,
        request: &ExportRequest,
        sink: &dyn ArtifactSink,
        notifier: &dyn Notifier,
    ) -> Result<SavedExport> {
        if request.messages.is_empty() {
            let err = ExportError::EmptyTranscript;
            notifier.failure(err.user_message());
            return Err(err);
        }

        match self.render_and_save(request, sink).await {
            Ok(saved) => {
                notifier.success(&format!(
                    "{}: {}",
                    messages::EXPORT_SUCCEEDED,
                    saved.filename
                ));
                Ok(saved)
            }
            Err(e) => {
                error!("Conversation export failed: {:?}", e);
                notifier.failure(e.user_message());
                Err(e)
            }
        }
    }

    async fn render_and_save(
        &self,
        request: &ExportRequest,
        sink: &dyn ArtifactSink,
    ) -> Result<SavedExport> {
        let exporter = self.clone();
        let request = request.clone();
        let now = Utc::now();
        let document = tokio::task::spawn_blocking(move || exporter.render(&request, now))
            .await
            .map_err(|e| ExportError::Render(format!("render task failed: {}", e)))??;

        let location = sink.save(&document.filename, &document.bytes).await?;
        info!("Saved {} to {}", document.filename, location);

        Ok(SavedExport {
            page_count: document.page_count(),
            filename: document.filename,
            location,
        })
    }
}
