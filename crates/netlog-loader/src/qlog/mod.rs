//! QUIC qlog traces, in the two shapes produced by different stacks.

mod detect;
pub mod line_delimited;
pub mod multi_trace;

pub use detect::{QlogFormat, detect_format};

use netlog_abstract::{Event, EventKind, EventStream, Payload};
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::SourceError;
use crate::source::EventSource;

/// Event names the aggregation understands. Everything else is ignored.
pub mod names {
    pub const PACKET_SENT: &str = "transport:packet_sent";
    /// Carries `data.lost_packets`.
    pub const PACKETS_LOST: &str = "loss:packets_lost";
    pub const PACKET_LOST: &str = "recovery:packet_lost";
    pub const METRICS_UPDATED: &str = "recovery:metrics_updated";
}

static NULL: Value = Value::Null;

/// Integer view of a qlog `time`; fractional times are truncated.
pub(crate) fn timestamp(event: &Value) -> Option<i64> {
    let time = event.get("time")?;
    time.as_i64()
        .or_else(|| time.as_f64().map(|t| t.trunc() as i64))
}

fn number(object: &Value, field: &str) -> Option<Number> {
    match object.get(field)? {
        Value::Number(number) => Some(number.clone()),
        _ => None,
    }
}

fn metrics(event: &Value, data: &Value) -> Payload {
    Payload {
        logged_time: number(event, "time"),
        bytes_in_flight: number(data, "bytes_in_flight"),
        congestion_window: number(data, "congestion_window"),
        latest_rtt: number(data, "latest_rtt"),
        min_rtt: number(data, "min_rtt"),
        smoothed_rtt: number(data, "smoothed_rtt"),
        ack_delay: number(data, "ack_delay"),
        ..Default::default()
    }
}

/// Map a raw qlog event onto an [`Event`].
///
/// Returns `None` for names outside the allow-list and for recognised events
/// missing a field they need.
pub fn classify(event: &Value) -> Option<Event> {
    let time = timestamp(event)?;
    let name = event.get("name")?.as_str()?;
    let data = event.get("data").unwrap_or(&NULL);

    match name {
        names::PACKET_SENT => Some(Event::sent(time)),
        names::PACKET_LOST => Some(Event::lost(time, 1)),
        names::PACKETS_LOST => match data.get("lost_packets").and_then(Value::as_u64) {
            Some(count) => Some(Event::lost(time, count)),
            None => {
                debug!("Skipping {} at {} without lost_packets", name, time);
                None
            }
        },
        names::METRICS_UPDATED => Some(Event::with_payload(
            time,
            EventKind::MetricsUpdated,
            metrics(event, data),
        )),
        _ => None,
    }
}

/// Loss events from a qlog file in either supported shape.
#[derive(Debug, Clone, Default)]
pub struct QlogSource;

impl QlogSource {
    pub const LABEL: &'static str = "QUIC";
}

impl EventSource for QlogSource {
    fn label(&self) -> &str {
        Self::LABEL
    }

    fn streams(&self, input: &str) -> Result<Vec<EventStream>, SourceError> {
        match detect_format(input) {
            Some(QlogFormat::MultiTrace) => multi_trace::parse(input),
            Some(QlogFormat::LineDelimited) => Ok(vec![line_delimited::parse(input)]),
            None => Err(SourceError::UnrecognizedFormat),
        }
    }
}
