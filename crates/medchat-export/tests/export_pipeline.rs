use chrono::{DateTime, TimeZone, Utc};
use medchat_common::{ExportError, ExportRequest, Message, SearchResult, Transcript};
use medchat_export::{DirectorySink, Exporter, LogNotifier};
use tempfile::TempDir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 14, 5, 0).unwrap()
}

fn long_conversation() -> ExportRequest {
    let paragraph = "Regular exercise, a **balanced diet** and enough sleep all help \
                     keep blood pressure in a healthy range over the long term.";
    let messages = (0..30)
        .map(|i| {
            if i % 2 == 0 {
                Message::user(format!("Question {}: {}", i, paragraph))
            } else {
                Message::assistant(format!("{}\n\n{}", paragraph, paragraph))
            }
        })
        .collect();
    ExportRequest::new("Blood pressure", messages)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn test_multi_page_footers_count_every_page() {
    let document = Exporter::new().render(&long_conversation(), now()).unwrap();
    let total = document.page_count();
    assert!(total > 1);

    for (index, page) in document.pages.iter().enumerate() {
        let footer = page.lines().pop().unwrap();
        assert_eq!(
            footer,
            format!(
                "Page {}/{} | MedChat - Medical AI Assistant | 1/15/2024",
                index + 1,
                total
            )
        );
    }
    assert!(contains(
        &document.bytes,
        format!("/Count {}", total).as_bytes()
    ));
}

#[test]
fn test_render_is_repeatable_for_fixed_moment() {
    let exporter = Exporter::new();
    let first = exporter.render(&long_conversation(), now()).unwrap();
    let second = exporter.render(&long_conversation(), now()).unwrap();

    assert_eq!(first.page_count(), second.page_count());
    for (a, b) in first.pages.iter().zip(&second.pages) {
        assert_eq!(a.lines(), b.lines());
    }
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn test_body_text_stays_inside_bottom_limit() {
    let exporter = Exporter::new();
    let document = exporter.render(&long_conversation(), now()).unwrap();
    let geometry = &exporter.config().page;
    let footer_y = geometry.height - geometry.footer_offset;

    for page in &document.pages {
        for op in &page.ops {
            if let medchat_export::DrawOp::Text { y, .. } = op {
                if (*y - footer_y).abs() > 1e-9 {
                    assert!(*y <= geometry.bottom_limit());
                }
            }
        }
    }
}

#[test]
fn test_backend_payload_with_references() {
    let json = r#"{
        "title": "Diabetes",
        "messages": [
            {"id": "1", "conversationId": "c", "role": "user",
             "content": "What is diabetes?", "createdAt": "2024-01-15T09:00:00"},
            {"id": "2", "conversationId": "c", "role": "assistant",
             "content": "A chronic condition.", "createdAt": "2024-01-15T09:00:05",
             "citations": ["https://x"],
             "searchResults": [{"title": "Diabetes Overview", "url": "https://x", "snippet": "..."}]}
        ]
    }"#;
    let request = Transcript::from_json(json).unwrap().into_request(None, None);
    let document = Exporter::new().render(&request, now()).unwrap();

    let lines = document.pages[0].lines();
    let label = lines.iter().position(|l| l == "References").unwrap();
    assert_eq!(lines[label + 1], "1. Diabetes Overview");
    assert_eq!(lines[label + 2], "https://x");
    assert!(contains(&document.bytes, b"/URI (https://x)"));
}

#[test]
fn test_untitled_reference() {
    let request = ExportRequest::new(
        "t",
        vec![Message::assistant("ok").with_search_results(vec![SearchResult {
            url: "https://y".to_string(),
            ..Default::default()
        }])],
    );
    let document = Exporter::new().render(&request, now()).unwrap();
    assert!(document.pages[0].lines().contains(&"1. Untitled source".to_string()));
}

#[tokio::test]
async fn test_export_writes_sanitized_filename() {
    let temp = TempDir::new().unwrap();
    let sink = DirectorySink::new(temp.path());
    let request = ExportRequest::new("My / Chat: Notes?", vec![Message::user("hello")]);

    let saved = Exporter::new()
        .export_conversation(&request, &sink, &LogNotifier)
        .await
        .unwrap();

    let stem = saved.filename.strip_suffix(".pdf").unwrap();
    assert!(stem.starts_with("MedChat_My___Chat__Notes__"));
    assert!(stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));

    let bytes = std::fs::read(temp.path().join(&saved.filename)).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(contains(&bytes, b"/Count 1"));
}

#[tokio::test]
async fn test_empty_export_saves_nothing() {
    let temp = TempDir::new().unwrap();
    let sink = DirectorySink::new(temp.path().join("out"));
    let request = ExportRequest::new("Empty", Vec::new());

    let result = Exporter::new()
        .export_conversation(&request, &sink, &LogNotifier)
        .await;

    assert!(matches!(result, Err(ExportError::EmptyTranscript)));
    assert!(!temp.path().join("out").exists());
}
