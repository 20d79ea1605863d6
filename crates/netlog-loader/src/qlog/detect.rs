use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;

/// Record separator quic-go writes in front of each JSON-SEQ record.
pub(crate) const RECORD_SEPARATOR: char = '\u{1e}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QlogFormat {
    /// One JSON document with a top-level `traces` array.
    MultiTrace,
    /// One JSON object per line.
    LineDelimited,
}

type Predicate = fn(&str) -> bool;

/// Checked in order; the first match wins.
const PREDICATES: [(QlogFormat, Predicate); 2] = [
    (QlogFormat::MultiTrace, is_multi_trace),
    (QlogFormat::LineDelimited, is_line_delimited),
];

/// Pick the parser for `input` before committing to it.
pub fn detect_format(input: &str) -> Option<QlogFormat> {
    PREDICATES
        .iter()
        .find(|(_, matches)| matches(input))
        .map(|(format, _)| *format)
}

#[derive(Deserialize)]
struct TracesShape {
    #[allow(dead_code)]
    traces: Vec<IgnoredAny>,
}

fn is_multi_trace(input: &str) -> bool {
    input.trim_start().starts_with('{') && serde_json::from_str::<TracesShape>(input).is_ok()
}

pub(crate) fn strip_record(line: &str) -> &str {
    line.trim().trim_start_matches(RECORD_SEPARATOR).trim()
}

fn is_line_delimited(input: &str) -> bool {
    input
        .lines()
        .map(strip_record)
        .find(|line| !line.is_empty())
        .and_then(|line| serde_json::from_str::<Value>(line).ok())
        .is_some_and(|value| value.is_object())
}
