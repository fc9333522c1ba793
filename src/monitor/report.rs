//! Report line records and their text rendering.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

const TIME_FORMAT: &str = "%H:%M";

/// One entry of a run report. Rendered to text only when asked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLine {
    /// Free text, rendered verbatim.
    Text { text: String },
    /// `[HH:MM-HH:MM] text`
    Span {
        from: NaiveDateTime,
        to: NaiveDateTime,
        text: String,
    },
    /// `[HH:MM] text`
    At { at: NaiveDateTime, text: String },
    /// `text` indented by `depth` tabs.
    Detail { depth: usize, text: String },
}

impl ReportLine {
    pub fn text(text: impl Into<String>) -> Self {
        ReportLine::Text { text: text.into() }
    }

    pub fn detail(depth: usize, text: impl Into<String>) -> Self {
        ReportLine::Detail {
            depth,
            text: text.into(),
        }
    }

    pub fn render(&self) -> String {
        match self {
            ReportLine::Text { text } => text.clone(),
            ReportLine::Span { from, to, text } => format!(
                "[{}-{}] {}",
                from.format(TIME_FORMAT),
                to.format(TIME_FORMAT),
                text
            ),
            ReportLine::At { at, text } => format!("[{}] {}", at.format(TIME_FORMAT), text),
            ReportLine::Detail { depth, text } => format!("{}{}", "\t".repeat(*depth), text),
        }
    }
}

/// Render lines, each terminated by a newline.
pub fn render(lines: &[ReportLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.render());
        out.push('\n');
    }
    out
}

/// `HH:MM:SS`, hours unbounded. Negative spans clamp to zero.
pub fn format_duration(elapsed: TimeDelta) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
