//! In-memory page model
//!
//! Layout produces pages of draw operations. Every operation carries its own
//! style and geometry (millimetres, y measured down from the top edge), so
//! the PDF writer never tracks a "current" font or colour across operations.

use crate::metrics::TextStyle;
use medchat_common::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text whose baseline sits at `y`
    Text {
        x: f64,
        y: f64,
        text: String,
        style: TextStyle,
    },
    FilledRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    RoundedRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        color: Rgb,
    },
    /// Clickable region opening `url`
    Link {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        url: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Text drawn on each baseline, runs joined left to right in draw order
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<(f64, String)> = Vec::new();
        for op in &self.ops {
            let DrawOp::Text { y, text, .. } = op else {
                continue;
            };
            match lines.last_mut() {
                Some((last_y, line)) if (*last_y - *y).abs() < 1e-6 => line.push_str(text),
                _ => lines.push((*y, text.clone())),
            }
        }
        lines.into_iter().map(|(_, line)| line).collect()
    }

    /// Every text operation on the page
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every link target on the page
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Link { url, .. } => Some(url.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(x: f64, y: f64, text: &str) -> DrawOp {
        DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            style: TextStyle::regular(10.0, Rgb::BLACK),
        }
    }

    #[test]
    fn test_lines_group_by_baseline() {
        let mut page = Page::default();
        page.push(text(20.0, 30.0, "a "));
        page.push(text(23.0, 30.0, "b"));
        page.push(DrawOp::FilledRect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            color: Rgb::BLACK,
        });
        page.push(text(20.0, 36.0, "next"));
        assert_eq!(page.lines(), vec!["a b".to_string(), "next".to_string()]);
        assert_eq!(page.texts().count(), 3);
    }

    #[test]
    fn test_links() {
        let mut page = Page::default();
        page.push(DrawOp::Link {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 5.0,
            url: "https://x".to_string(),
        });
        assert_eq!(page.links().collect::<Vec<_>>(), vec!["https://x"]);
    }
}
