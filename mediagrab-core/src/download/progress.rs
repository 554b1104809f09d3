//! Progress extraction from yt-dlp output.
//!
//! yt-dlp reports progress as lines like `[download]  42.5% of 10.00MiB at ...`.
//! Everything else is ignored here; the orchestrator keeps stderr text for
//! error reporting on its own.

use once_cell::sync::Lazy;
use regex::Regex;

use super::status::Progress;

/// `[download]`, whitespace, a decimal number, `%`. Case-sensitive.
static PROGRESS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[download\]\s+(\d+\.?\d*)%").expect("progress pattern is valid")
});

/// Stateless line scanner for yt-dlp progress output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressParser;

impl ProgressParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses every line in `text`, in order.
    ///
    /// Lines may end in `\n`, `\r\n` or a bare `\r` (yt-dlp redraws its
    /// progress line with carriage returns when `--newline` is missing).
    pub fn parse(&self, text: &str) -> Vec<Progress> {
        text.split(&['\n', '\r'][..])
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    /// Parses a single line.
    pub fn parse_line(&self, line: &str) -> Option<Progress> {
        let caps = PROGRESS_REGEX.captures(line)?;
        let percent: f64 = caps.get(1)?.as_str().parse().ok()?;
        Some(Progress::new(percent.min(100.0)))
    }
}
