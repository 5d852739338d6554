//! Page decoration: first-page header band, per-message header bands,
//! reference lists and the deferred page footers

use crate::document::{DrawOp, Page};
use crate::inline::StyledRun;
use crate::layout::{LayoutEngine, baseline};
use crate::metrics::TextStyle;
use crate::wrap::{RunStyles, wrap_runs};
use chrono::{DateTime, Utc};
use medchat_common::constants::{UNTITLED_CONVERSATION, UNTITLED_SOURCE, formats};
use medchat_common::{ExportConfig, Role, SearchResult, truncate_chars};

/// Inner horizontal padding of a message header band
const BAND_PADDING: f64 = 3.0;
/// Extra height of a message header band over one line
const BAND_EXTRA: f64 = 2.0;
const BAND_RADIUS: f64 = 2.0;
/// Space between a header band and the message body
const BAND_GAP: f64 = 2.0;
/// Space between the message body and its reference list
const REFERENCES_GAP: f64 = 2.0;
/// Indent of reference entries relative to body text
const REFERENCE_INDENT: f64 = 3.0;

/// Band across the top of page 1 with the document title, the conversation
/// title and the export time. Leaves the cursor below the band.
pub fn draw_document_header(
    engine: &mut LayoutEngine,
    config: &ExportConfig,
    conversation_title: &str,
    exported_at: DateTime<Utc>,
) {
    let page = &config.page;
    let colors = &config.colors;
    let typo = &config.typography;

    engine.draw(DrawOp::FilledRect {
        x: 0.0,
        y: 0.0,
        width: page.width,
        height: page.header_height,
        color: colors.header_band,
    });

    let title = conversation_title.trim();
    let title = if title.is_empty() {
        UNTITLED_CONVERSATION.to_string()
    } else {
        truncate_chars(title, config.header_title_max)
    };

    let rows = [
        (
            config.labels.document_title.clone(),
            TextStyle::bold(typo.document_title, colors.header_text),
            0.375,
        ),
        (
            title,
            TextStyle::regular(typo.conversation_title, colors.header_text),
            0.625,
        ),
        (
            format!("Exported: {}", exported_at.format(formats::EXPORTED_AT)),
            TextStyle::regular(typo.exported_at, colors.header_text),
            0.825,
        ),
    ];
    for (text, style, ratio) in rows {
        engine.draw(DrawOp::Text {
            x: page.margin,
            y: page.header_height * ratio,
            text,
            style,
        });
    }

    engine.start_at(page.header_height + page.header_gap);
}

/// Height a message header needs together with the first body line
pub fn message_header_reserve(config: &ExportConfig) -> f64 {
    let line = config.page.line_height;
    line + BAND_EXTRA + BAND_GAP + line
}

/// Rounded band with the sender label on the left and the message time
/// right-aligned against the right margin
pub fn draw_message_header(
    engine: &mut LayoutEngine,
    config: &ExportConfig,
    role: Role,
    sender: &str,
    time: &str,
) {
    let page = &config.page;
    let colors = &config.colors;
    let (band_color, label_color) = match role {
        Role::User => (colors.user_band, colors.user_label),
        Role::Assistant => (colors.assistant_band, colors.assistant_label),
    };

    engine.ensure_space(message_header_reserve(config));

    let top = engine.y();
    let band_height = page.line_height + BAND_EXTRA;
    engine.draw(DrawOp::RoundedRect {
        x: page.margin,
        y: top,
        width: page.content_width(),
        height: band_height,
        radius: BAND_RADIUS,
        color: band_color,
    });

    let text_y = baseline(top + BAND_EXTRA / 2.0, page.line_height);
    engine.draw(DrawOp::Text {
        x: page.margin + BAND_PADDING,
        y: text_y,
        text: sender.to_string(),
        style: TextStyle::bold(config.typography.sender_label, label_color),
    });

    if !time.is_empty() {
        let style = TextStyle::regular(config.typography.timestamp, colors.timestamp);
        let width = style.width(time);
        engine.draw(DrawOp::Text {
            x: page.content_right() - BAND_PADDING - width,
            y: text_y,
            text: time.to_string(),
            style,
        });
    }

    engine.advance(band_height + BAND_GAP);
}

/// Format a message's `createdAt` for its header. Missing values show the
/// export moment; values that do not parse are shown as given.
pub fn message_time(created_at: Option<&str>, exported_at: DateTime<Utc>) -> String {
    match created_at.map(str::trim) {
        Some(raw) if !raw.is_empty() => match medchat_common::parse_timestamp(raw) {
            Some(at) => at.format(formats::MESSAGE_TIME).to_string(),
            None => raw.to_string(),
        },
        _ => exported_at.format(formats::MESSAGE_TIME).to_string(),
    }
}

/// Numbered reference list under a message.
///
/// Space is reserved per title line and again for the URL line, so a title
/// and its URL can end up on different pages.
pub fn draw_references(engine: &mut LayoutEngine, config: &ExportConfig, results: &[SearchResult]) {
    if results.is_empty() {
        return;
    }

    let page = &config.page;
    let colors = &config.colors;
    let typo = &config.typography;
    let line_height = page.reference_line_height;
    let body_x = page.margin + page.body_indent;
    let entry_x = body_x + REFERENCE_INDENT;

    engine.advance(REFERENCES_GAP);
    let label = TextStyle::bold(typo.references_label, colors.references_label);
    engine.ensure_space(line_height);
    engine.draw(DrawOp::Text {
        x: body_x,
        y: baseline(engine.y(), line_height),
        text: config.labels.references.clone(),
        style: label,
    });
    engine.advance(line_height);

    let title_style = TextStyle::bold(typo.reference, colors.reference_title);
    let styles = RunStyles::new(title_style, title_style);
    let link_style = TextStyle::regular(typo.reference, colors.link);
    let max_width = page.wrap_width() - REFERENCE_INDENT;

    for (index, result) in results.iter().enumerate() {
        let title = result.title.trim();
        let title = if title.is_empty() { UNTITLED_SOURCE } else { title };
        // Titles are drawn literally, without emphasis parsing
        let runs = [StyledRun::emphasized(format!("{}. {}", index + 1, title))];
        for line in wrap_runs(&runs, &styles, max_width) {
            engine.emit_line(entry_x, &line, &styles, line_height);
        }

        let url = result.url.trim();
        if url.is_empty() {
            continue;
        }
        engine.ensure_space(line_height);
        let top = engine.y();
        let width = link_style.width(url).min(page.content_right() - entry_x);
        engine.draw(DrawOp::Text {
            x: entry_x,
            y: baseline(top, line_height),
            text: url.to_string(),
            style: link_style,
        });
        engine.draw(DrawOp::Link {
            x: entry_x,
            y: top,
            width,
            height: line_height,
            url: url.to_string(),
        });
        engine.advance(line_height);
    }
}

/// Second pass: stamp `Page i/N | product | date` centred on every page
pub fn stamp_footers(pages: &mut [Page], config: &ExportConfig, exported_at: DateTime<Utc>) {
    let total = pages.len();
    let style = TextStyle::regular(config.typography.footer, config.colors.footer);
    let date = exported_at.format(formats::SHORT_DATE).to_string();
    let y = config.page.height - config.page.footer_offset;

    for (index, page) in pages.iter_mut().enumerate() {
        let text = format!(
            "Page {}/{} | {} | {}",
            index + 1,
            total,
            config.labels.product,
            date
        );
        let x = (config.page.width - style.width(&text)) / 2.0;
        page.push(DrawOp::Text { x, y, text, style });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn exported_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 5, 0).unwrap()
    }

    fn text_ops(page: &Page) -> Vec<(f64, f64, String, TextStyle)> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, style } => Some((*x, *y, text.clone(), *style)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_document_header_rows_and_cursor() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        draw_document_header(&mut engine, &config, "Blood pressure questions", exported_at());
        assert_eq!(engine.y(), 50.0);

        let pages = engine.finish();
        let lines = pages[0].lines();
        assert_eq!(lines[0], "MedChat Conversation");
        assert_eq!(lines[1], "Blood pressure questions");
        assert_eq!(lines[2], "Exported: January 15, 2024 14:05 UTC");
        assert!(matches!(pages[0].ops[0], DrawOp::FilledRect { .. }));
    }

    #[test]
    fn test_document_header_truncates_title() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        let title = "x".repeat(200);
        draw_document_header(&mut engine, &config, &title, exported_at());
        let lines = engine.finish()[0].lines();
        assert_eq!(lines[1].chars().count(), config.header_title_max);
        assert!(lines[1].ends_with("..."));
    }

    #[test]
    fn test_document_header_untitled() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        draw_document_header(&mut engine, &config, "  ", exported_at());
        assert_eq!(engine.finish()[0].lines()[1], UNTITLED_CONVERSATION);
    }

    #[test]
    fn test_message_header_time_right_aligned() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        engine.start_at(50.0);
        draw_message_header(&mut engine, &config, Role::User, "Dana", "Jan 15, 2024 09:30");

        let expected_y = 50.0 + config.page.line_height + BAND_EXTRA + BAND_GAP;
        assert!((engine.y() - expected_y).abs() < 1e-9);

        let pages = engine.finish();
        let texts = text_ops(&pages[0]);
        assert_eq!(texts.len(), 2);
        let (label_x, _, label, label_style) = &texts[0];
        assert_eq!(label, "Dana");
        assert_eq!(*label_x, config.page.margin + BAND_PADDING);
        assert_eq!(label_style.color, config.colors.user_label);

        let (time_x, _, time, time_style) = &texts[1];
        let right = time_x + time_style.width(time);
        assert!((right - (config.page.content_right() - BAND_PADDING)).abs() < 1e-9);
    }

    #[test]
    fn test_message_header_colors_by_role() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        draw_message_header(&mut engine, &config, Role::Assistant, "MedChat AI", "");
        let pages = engine.finish();
        match &pages[0].ops[0] {
            DrawOp::RoundedRect { color, .. } => assert_eq!(*color, config.colors.assistant_band),
            other => panic!("expected band, got {other:?}"),
        }
        let texts = text_ops(&pages[0]);
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].3.color, config.colors.assistant_label);
    }

    #[test]
    fn test_message_header_not_orphaned() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        // Room for the band but not for the first body line under it
        engine.start_at(config.page.bottom_limit() - config.page.line_height - 1.0);
        draw_message_header(&mut engine, &config, Role::User, "User", "");
        assert_eq!(engine.page_count(), 2);
    }

    #[test]
    fn test_message_time() {
        assert_eq!(
            message_time(Some("2024-06-10T09:30:00+00:00"), exported_at()),
            "Jun 10, 2024 09:30"
        );
        assert_eq!(message_time(None, exported_at()), "Jan 15, 2024 14:05");
        assert_eq!(message_time(Some(" "), exported_at()), "Jan 15, 2024 14:05");
        assert_eq!(message_time(Some("last week"), exported_at()), "last week");
    }

    #[test]
    fn test_references_block() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        let results = vec![SearchResult {
            title: "Diabetes Overview".to_string(),
            url: "https://x".to_string(),
            snippet: Some("...".to_string()),
            date: Some("2024-01-15".to_string()),
        }];
        draw_references(&mut engine, &config, &results);

        let pages = engine.finish();
        assert_eq!(
            pages[0].lines(),
            vec![
                "References".to_string(),
                "1. Diabetes Overview".to_string(),
                "https://x".to_string(),
            ]
        );
        assert_eq!(pages[0].links().collect::<Vec<_>>(), vec!["https://x"]);
    }

    #[test]
    fn test_references_empty_draws_nothing() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        draw_references(&mut engine, &config, &[]);
        assert_eq!(engine.y(), config.page.margin);
        assert!(engine.finish()[0].ops.is_empty());
    }

    #[test]
    fn test_references_title_and_url_may_split() {
        let config = ExportConfig::default();
        let line = config.page.reference_line_height;
        let mut engine = LayoutEngine::new(config.page.clone());
        // Label and title fit, the URL line does not
        let start = config.page.bottom_limit() - REFERENCES_GAP - 2.0 * line - 0.5;
        engine.start_at(start);
        let results = vec![SearchResult {
            title: "Hypertension".to_string(),
            url: "https://example.org/htn".to_string(),
            ..Default::default()
        }];
        draw_references(&mut engine, &config, &results);

        let pages = engine.finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(
            pages[0].lines(),
            vec!["References".to_string(), "1. Hypertension".to_string()]
        );
        assert_eq!(pages[1].lines(), vec!["https://example.org/htn".to_string()]);
        assert_eq!(pages[1].links().count(), 1);
    }

    #[test]
    fn test_references_blank_title() {
        let config = ExportConfig::default();
        let mut engine = LayoutEngine::new(config.page.clone());
        let results = vec![SearchResult {
            url: "https://y".to_string(),
            ..Default::default()
        }];
        draw_references(&mut engine, &config, &results);
        assert_eq!(engine.finish()[0].lines()[1], "1. Untitled source");
    }

    #[test]
    fn test_footers_on_every_page() {
        let config = ExportConfig::default();
        let mut pages = vec![Page::default(), Page::default(), Page::default()];
        stamp_footers(&mut pages, &config, exported_at());

        for (index, page) in pages.iter().enumerate() {
            let texts = text_ops(page);
            assert_eq!(texts.len(), 1);
            let (x, y, text, style) = &texts[0];
            assert_eq!(
                text,
                &format!("Page {}/3 | MedChat - Medical AI Assistant | 1/15/2024", index + 1)
            );
            assert!((x + style.width(text) / 2.0 - config.page.width / 2.0).abs() < 1e-9);
            assert_eq!(*y, config.page.height - config.page.footer_offset);
        }
    }
}
