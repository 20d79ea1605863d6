//! `{"traces": [{"events": [...]}, ...]}` documents.
//!
//! Each trace is its own stream, zero-based on the first event in it that
//! carries a `time`, whatever its name.

use netlog_abstract::{EventStream, TimeScale};
use serde::Deserialize;
use serde_json::Value;

use super::{classify, timestamp};
use crate::error::SourceError;

#[derive(Deserialize)]
struct Document {
    traces: Vec<Trace>,
}

#[derive(Deserialize)]
struct Trace {
    #[serde(default)]
    events: Vec<Value>,
}

pub fn parse(input: &str) -> Result<Vec<EventStream>, SourceError> {
    let document: Document = serde_json::from_str(input)?;
    Ok(document.traces.iter().map(trace_stream).collect())
}

fn trace_stream(trace: &Trace) -> EventStream {
    let origin = trace.events.iter().find_map(timestamp).unwrap_or(0);
    let mut stream = EventStream::new(origin, TimeScale::MULTI_TRACE);
    stream
        .events
        .extend(trace.events.iter().filter_map(classify));
    stream
}
