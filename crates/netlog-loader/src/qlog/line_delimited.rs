//! One JSON record per line, optionally prefixed with a JSON-SEQ record
//! separator. Times are already session-relative, so the stream has no origin
//! offset.

use netlog_abstract::{EventStream, TimeScale};
use serde_json::Value;
use tracing::debug;

use super::classify;
use super::detect::strip_record;

pub fn parse(input: &str) -> EventStream {
    let mut stream = EventStream::new(0, TimeScale::LINE_DELIMITED);
    for (number, line) in input.lines().enumerate() {
        let record = strip_record(line);
        if record.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(record) {
            Ok(value) => stream.events.extend(classify(&value)),
            Err(err) => debug!("Skipping qlog line {}: {}", number + 1, err),
        }
    }
    stream
}
