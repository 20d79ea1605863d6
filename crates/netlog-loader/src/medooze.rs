//! Pipe-separated packet log written by the media transport.
//!
//! Every row is one transport packet. Columns are positional, see
//! [`columns`]. A receive time of `0` means the packet was never
//! acknowledged.

use csv::{ReaderBuilder, StringRecord};
use netlog_abstract::{Event, EventKind, EventStream, Payload, TimeScale};
use tracing::debug;

use crate::error::{RowError, SourceError};
use crate::source::EventSource;

pub const DELIMITER: u8 = b'|';

/// Column positions within one row.
pub mod columns {
    pub const FEEDBACK_TIME: usize = 0;
    pub const TRANSPORT_SEQ: usize = 1;
    pub const FEEDBACK_NUM: usize = 2;
    pub const SIZE: usize = 3;
    pub const SENT_TIME: usize = 4;
    pub const RECV_TIME: usize = 5;
    pub const DELTA_SENT: usize = 6;
    pub const DELTA_RECV: usize = 7;
    pub const DELTA: usize = 8;
    pub const BWE: usize = 9;
    pub const TARGET_BITRATE: usize = 10;
    pub const AVAILABLE_BITRATE: usize = 11;
    pub const RTT: usize = 12;
    pub const MIN_RTT: usize = 13;
    pub const MARK: usize = 14;
    pub const RTX: usize = 15;
    pub const PROBING: usize = 16;
}

/// One row of the packet log, kept as raw fields.
#[derive(Debug, Clone)]
pub struct PacketLogRow {
    record: StringRecord,
}

impl From<StringRecord> for PacketLogRow {
    fn from(record: StringRecord) -> Self {
        Self { record }
    }
}

impl PacketLogRow {
    pub fn record(&self) -> &StringRecord {
        &self.record
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    pub fn field(&self, column: usize) -> Result<&str, RowError> {
        self.record
            .get(column)
            .ok_or(RowError::MissingColumn { column })
    }

    pub fn int(&self, column: usize) -> Result<i64, RowError> {
        let value = self.field(column)?;
        value.trim().parse().map_err(|_| RowError::InvalidNumber {
            column,
            value: value.to_string(),
        })
    }

    pub fn float(&self, column: usize) -> Result<f64, RowError> {
        let value = self.field(column)?;
        value.trim().parse().map_err(|_| RowError::InvalidNumber {
            column,
            value: value.to_string(),
        })
    }

    /// `true` only for a literal `1`.
    pub fn flag(&self, column: usize) -> Result<bool, RowError> {
        Ok(self.field(column)?.trim() == "1")
    }

    pub fn sent_time(&self) -> Result<i64, RowError> {
        self.int(columns::SENT_TIME)
    }

    pub fn recv_time(&self) -> Result<i64, RowError> {
        self.int(columns::RECV_TIME)
    }

    /// Sent but never acknowledged.
    pub fn is_lost(&self) -> Result<bool, RowError> {
        Ok(self.sent_time()? != 0 && self.recv_time()? == 0)
    }
}

/// Rows of a packet log with their line numbers. Blank lines are skipped, and
/// rows may have any number of fields.
pub fn rows(input: &str) -> impl Iterator<Item = (u64, PacketLogRow)> + '_ {
    ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_bytes())
        .into_records()
        .filter_map(|record| match record {
            Ok(record) => {
                let line = record.position().map_or(0, |pos| pos.line());
                Some((line, PacketLogRow::from(record)))
            }
            Err(err) => {
                debug!("Skipping unreadable packet log record: {err}");
                None
            }
        })
}

/// Loss events from the packet log: every row is a sent packet, unacknowledged
/// rows are also a loss.
#[derive(Debug, Clone, Default)]
pub struct PacketLogSource;

impl PacketLogSource {
    pub const LABEL: &'static str = "Medooze";

    fn classify(row: &PacketLogRow) -> Result<Vec<Event>, RowError> {
        let sent = row.sent_time()?;
        let lost = row.is_lost()?;
        let payload = row
            .int(columns::SIZE)
            .ok()
            .and_then(|size| u64::try_from(size).ok())
            .map(Payload::with_size)
            .unwrap_or_default();

        let mut events = vec![Event::with_payload(sent, EventKind::PacketSent, payload)];
        if lost {
            events.push(Event::lost(sent, 1));
        }
        Ok(events)
    }
}

impl EventSource for PacketLogSource {
    fn label(&self) -> &str {
        Self::LABEL
    }

    fn streams(&self, input: &str) -> Result<Vec<EventStream>, SourceError> {
        let mut stream = EventStream::new(0, TimeScale::PACKET_LOG);
        for (number, row) in rows(input) {
            match Self::classify(&row) {
                Ok(events) => stream.events.extend(events),
                Err(err) => debug!("Skipping packet log line {number}: {err}"),
            }
        }
        Ok(vec![stream])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(fb: i64, size: u64, sent: i64, recv: i64, rtx: u8, probing: u8) -> String {
        format!("{fb}|1|1|{size}|{sent}|{recv}|0|0|0|0|500000|0|20|18|0|{rtx}|{probing}")
    }

    fn row(text: &str) -> PacketLogRow {
        rows(text).next().map(|(_, row)| row).unwrap()
    }

    #[test]
    fn reads_positional_fields() {
        let text = line(1_000_000, 1200, 5_000_000, 5_020_000, 0, 1);
        let row = row(&text);

        assert_eq!(row.len(), 17);
        assert_eq!(row.sent_time(), Ok(5_000_000));
        assert_eq!(row.recv_time(), Ok(5_020_000));
        assert_eq!(row.flag(columns::PROBING), Ok(true));
        assert_eq!(row.flag(columns::RTX), Ok(false));
        assert_eq!(row.float(columns::TARGET_BITRATE), Ok(500_000.0));
    }

    #[test]
    fn zero_receive_time_is_loss() {
        let text = line(0, 10, 100, 0, 0, 0);
        assert_eq!(row(&text).is_lost(), Ok(true));

        let never_sent = line(0, 10, 0, 0, 0, 0);
        assert_eq!(row(&never_sent).is_lost(), Ok(false));
    }

    #[test]
    fn short_row_reports_missing_column() {
        let row = row("1|2|3");
        assert_eq!(
            row.sent_time(),
            Err(RowError::MissingColumn {
                column: columns::SENT_TIME
            })
        );
    }

    #[test]
    fn every_row_is_sent_and_unacked_rows_are_lost() {
        let input = [
            line(1_000_000, 10, 100, 0, 0, 0),
            line(2_000_000, 20, 200, 250, 0, 0),
        ]
        .join("\n");

        let streams = PacketLogSource.streams(&input).unwrap();
        assert_eq!(streams.len(), 1);

        let kinds: Vec<_> = streams[0].events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::PacketSent,
                EventKind::PacketsLost { count: 1 },
                EventKind::PacketSent,
            ]
        );
        assert_eq!(streams[0].events[0].payload.size, Some(10));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let input = format!(
            "{}\nnot|a|row\n\n{}\n",
            line(0, 10, 3_000_000, 3_100_000, 0, 0),
            line(0, 10, 4_000_000, 0, 0, 0)
        );

        let streams = PacketLogSource.streams(&input).unwrap();
        assert_eq!(streams[0].events.len(), 3);
    }

    #[test]
    fn commas_and_quotes_stay_inside_one_field() {
        let text = "\"a|b\"|x,y|1|10|2000000|0|0|0|0|0|500000|0|20|18|0|0|0";
        let row = row(text);

        assert_eq!(row.len(), 17);
        assert_eq!(row.field(columns::FEEDBACK_TIME), Ok("a|b"));
        assert_eq!(row.field(columns::TRANSPORT_SEQ), Ok("x,y"));
        assert_eq!(row.sent_time(), Ok(2_000_000));
    }
}
