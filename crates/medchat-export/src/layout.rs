//! Vertical layout and pagination
//!
//! The engine owns the cursor and the pages produced so far. Content is laid
//! out in a single forward pass; callers reserve space with
//! [`LayoutEngine::ensure_space`] before drawing a block and move the cursor
//! with [`LayoutEngine::advance`] afterwards.

use crate::document::{DrawOp, Page};
use crate::wrap::{RunStyles, VisualLine};
use medchat_common::PageGeometry;
use tracing::debug;

/// Baseline position inside a line slot, as a fraction of the line height
const BASELINE_RATIO: f64 = 0.7;

/// Baseline of text drawn in a slot of `line_height` starting at `top`
pub fn baseline(top: f64, line_height: f64) -> f64 {
    top + line_height * BASELINE_RATIO
}

/// Write position within the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCursor {
    /// Distance from the top edge of the active page, in millimetres
    pub y: f64,
    /// 1-based index of the active page
    pub page_index: usize,
}

#[derive(Debug)]
pub struct LayoutEngine {
    geometry: PageGeometry,
    cursor: RenderCursor,
    pages: Vec<Page>,
}

impl LayoutEngine {
    /// Start a document with one blank page, cursor at the top margin
    pub fn new(geometry: PageGeometry) -> Self {
        let cursor = RenderCursor {
            y: geometry.margin,
            page_index: 1,
        };
        Self {
            geometry,
            cursor,
            pages: vec![Page::default()],
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn cursor(&self) -> RenderCursor {
        self.cursor
    }

    pub fn y(&self) -> f64 {
        self.cursor.y
    }

    /// Place the cursor below fixed first-page furniture
    pub fn start_at(&mut self, y: f64) {
        self.cursor.y = y;
    }

    /// Break to a new page if `required` would cross the usable bottom.
    ///
    /// Returns true when a break happened. A block taller than a whole page
    /// is not moved off a page that is still empty, since no page could hold
    /// it.
    pub fn ensure_space(&mut self, required: f64) -> bool {
        if self.cursor.y + required <= self.geometry.bottom_limit() {
            return false;
        }
        if self.cursor.y <= self.geometry.margin {
            return false;
        }
        self.new_page();
        true
    }

    pub fn advance(&mut self, height: f64) {
        self.cursor.y += height;
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = RenderCursor {
            y: self.geometry.margin,
            page_index: self.cursor.page_index + 1,
        };
        debug!("Page break, now on page {}", self.cursor.page_index);
    }

    /// Draw onto the active page
    pub fn draw(&mut self, op: DrawOp) {
        // `pages` is never empty: construction seeds the first page
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    /// Lay out one wrapped line: reserve a slot, draw each run in its own
    /// style starting at `x`, then move below the slot
    pub fn emit_line(&mut self, x: f64, line: &VisualLine, styles: &RunStyles, line_height: f64) {
        self.ensure_space(line_height);
        let y = baseline(self.cursor.y, line_height);
        let mut pen = x;
        for run in &line.runs {
            let style = *styles.for_run(run.emphasized);
            self.draw(DrawOp::Text {
                x: pen,
                y,
                text: run.text.clone(),
                style,
            });
            pen += style.width(&run.text);
        }
        self.advance(line_height);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Hand over the laid-out pages
    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}
