//! Inline emphasis tokenizer
//!
//! Splits one logical line of message content on `**...**` pairs into
//! alternating plain and emphasized runs. Pairs are matched non-greedily and
//! never nest; a marker without a partner is kept as literal text.

use regex::Regex;
use std::sync::LazyLock;

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid emphasis regex"));

/// The atomic unit of inline rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub emphasized: bool,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }

    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: true,
        }
    }
}

/// Tokenize one logical line.
///
/// Whitespace-only lines yield no runs; callers treat them as blank spacers.
pub fn parse_runs(line: &str) -> Vec<StyledRun> {
    if line.trim().is_empty() {
        return Vec::new();
    }

    let mut runs = Vec::new();
    let mut last = 0;

    for caps in EMPHASIS.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            runs.push(StyledRun::plain(&line[last..whole.start()]));
        }
        runs.push(StyledRun::emphasized(inner.as_str()));
        last = whole.end();
    }

    if last < line.len() {
        runs.push(StyledRun::plain(&line[last..]));
    }

    runs
}

/// Concatenated text of a run sequence, markers removed
pub fn runs_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}
