//! Greedy line wrapping of styled runs
//!
//! Runs are packed into visual lines word by word. A packing unit is a word
//! plus the whitespace that follows it, so joining every visual line gives
//! back the run text unchanged. Each unit is measured in the font its run
//! renders in. A unit wider than the whole line is never split; it gets a
//! line of its own and overflows.

use crate::inline::StyledRun;
use crate::metrics::TextStyle;

/// Plain and emphasized styles for one block of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStyles {
    pub plain: TextStyle,
    pub emphasized: TextStyle,
}

impl RunStyles {
    pub fn new(plain: TextStyle, emphasized: TextStyle) -> Self {
        Self { plain, emphasized }
    }

    pub fn for_run(&self, emphasized: bool) -> &TextStyle {
        if emphasized {
            &self.emphasized
        } else {
            &self.plain
        }
    }
}

/// One packed output line
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLine {
    pub runs: Vec<StyledRun>,
    /// Measured width including trailing whitespace
    pub width: f64,
}

impl VisualLine {
    pub fn text(&self) -> String {
        crate::inline::runs_text(&self.runs)
    }
}

/// Accumulates units for the visual line being built
#[derive(Debug, Default)]
struct LineBuilder {
    runs: Vec<StyledRun>,
    width: f64,
}

impl LineBuilder {
    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn push(&mut self, unit: &str, emphasized: bool, width: f64) {
        match self.runs.last_mut() {
            Some(last) if last.emphasized == emphasized => last.text.push_str(unit),
            _ => self.runs.push(StyledRun {
                text: unit.to_string(),
                emphasized,
            }),
        }
        self.width += width;
    }

    fn take(&mut self) -> VisualLine {
        let line = VisualLine {
            runs: std::mem::take(&mut self.runs),
            width: self.width,
        };
        self.width = 0.0;
        line
    }
}

/// Split text into words, each keeping its trailing whitespace. Leading
/// whitespace becomes a unit of its own.
fn units(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = text.chars().next().is_some_and(char::is_whitespace);

    for (idx, c) in text.char_indices() {
        if c.is_whitespace() {
            in_space = true;
        } else if in_space {
            if idx > start {
                out.push(&text[start..idx]);
            }
            start = idx;
            in_space = false;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Pack runs into visual lines no wider than `max_width`
pub fn wrap_runs(runs: &[StyledRun], styles: &RunStyles, max_width: f64) -> Vec<VisualLine> {
    let mut lines = Vec::new();
    let mut current = LineBuilder::default();

    for run in runs {
        let style = styles.for_run(run.emphasized);
        for unit in units(&run.text) {
            // Trailing whitespace may hang past the edge
            let visible = style.width(unit.trim_end());
            if !current.is_empty() && current.width + visible > max_width {
                lines.push(current.take());
            }
            current.push(unit, run.emphasized, style.width(unit));
        }
    }

    if !current.is_empty() {
        lines.push(current.take());
    }
    lines
}
