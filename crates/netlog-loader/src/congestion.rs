//! Congestion window and RTT samples from `recovery:metrics_updated` events.

use csv::WriterBuilder;
use netlog_abstract::{EventKind, EventStream};
use serde_json::Number;
use std::io::{self, Write};
use tracing::debug;

/// Values are kept as logged, so `20.0` is written back as `20.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSample {
    pub time: Number,
    pub bytes_in_flight: Number,
    pub congestion_window: Number,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RttSample {
    pub time: Number,
    pub latest_rtt: Number,
    pub min_rtt: Number,
    pub smoothed_rtt: Number,
    pub ack_delay: Number,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CongestionSeries {
    pub window: Vec<WindowSample>,
    pub rtt: Vec<RttSample>,
}

fn write_rows<'a, W, I>(out: W, rows: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = Vec<&'a Number>>,
{
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    for row in rows {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    writer.flush()
}

impl CongestionSeries {
    /// `time,bytes_in_flight,congestion_window` per sample.
    pub fn write_window_csv<W: Write>(&self, out: W) -> io::Result<()> {
        write_rows(
            out,
            self.window
                .iter()
                .map(|s| vec![&s.time, &s.bytes_in_flight, &s.congestion_window]),
        )
    }

    /// `time,latest_rtt,min_rtt,smoothed_rtt,ack_delay` per sample.
    pub fn write_rtt_csv<W: Write>(&self, out: W) -> io::Result<()> {
        write_rows(
            out,
            self.rtt.iter().map(|s| {
                vec![&s.time, &s.latest_rtt, &s.min_rtt, &s.smoothed_rtt, &s.ack_delay]
            }),
        )
    }
}

/// `time - start`, integral when both are integers.
fn elapsed(time: &Number, start: &Number) -> Option<Number> {
    match (time.as_i64(), start.as_i64()) {
        (Some(time), Some(start)) => time.checked_sub(start).map(Number::from),
        _ => Number::from_f64(time.as_f64()? - start.as_f64()?),
    }
}

/// Collect metric samples across all streams, in order.
///
/// Times are native units relative to the first metrics event seen, taken
/// from the logged time without truncation. The two series are filled
/// independently: an event lacking RTT fields can still contribute a window
/// sample and vice versa.
pub fn extract_congestion(streams: &[EventStream]) -> CongestionSeries {
    let mut series = CongestionSeries::default();
    let mut start: Option<Number> = None;

    let metrics = streams
        .iter()
        .flat_map(|stream| &stream.events)
        .filter(|event| event.kind == EventKind::MetricsUpdated);

    for event in metrics {
        let Some(logged) = &event.payload.logged_time else {
            continue;
        };
        let origin: &Number = start.get_or_insert_with(|| logged.clone());
        let Some(time) = elapsed(logged, origin) else {
            debug!("Skipping metrics at {} relative to {}", logged, origin);
            continue;
        };

        if let Some((bytes_in_flight, congestion_window)) = event.payload.window() {
            series.window.push(WindowSample {
                time: time.clone(),
                bytes_in_flight: bytes_in_flight.clone(),
                congestion_window: congestion_window.clone(),
            });
        }
        if let Some([latest_rtt, min_rtt, smoothed_rtt, ack_delay]) = event.payload.rtt() {
            series.rtt.push(RttSample {
                time,
                latest_rtt: latest_rtt.clone(),
                min_rtt: min_rtt.clone(),
                smoothed_rtt: smoothed_rtt.clone(),
                ack_delay: ack_delay.clone(),
            });
        }
    }
    series
}
