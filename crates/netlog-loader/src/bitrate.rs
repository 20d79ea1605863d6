//! Per-bucket bitrate breakdown of the packet log, joined back onto each row
//! together with per-feedback averages.

use csv::WriterBuilder;
use netlog_abstract::{BucketConfig, Clock, TimeScale};
use netlog_aggregator::BucketTable;
use netlog_aggregator::number::format_float;
use std::io::{self, Write};
use tracing::debug;

use crate::error::RowError;
use crate::medooze::{PacketLogRow, columns, rows};

/// Bitrate columns, all in bits.
pub mod category {
    /// Neither retransmission nor probing.
    pub const MEDIA: usize = 0;
    pub const PROBING: usize = 1;
    pub const RTX: usize = 2;
    /// Sent and acknowledged.
    pub const RECEIVED: usize = 3;
}

pub const BITRATE_CATEGORIES: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

/// Averages over one feedback report (a run of rows sharing column 0).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedbackMeans {
    pub target_bitrate: f64,
    /// Feedback time minus send time, divided by 1000.
    pub feedback_delay: f64,
    pub rtt: f64,
    pub min_rtt: f64,
}

#[derive(Debug, Default)]
struct FeedbackGroup {
    target_bitrate: Mean,
    feedback_delay: Mean,
    rtt: Mean,
    min_rtt: Mean,
}

impl FeedbackGroup {
    fn means(&self) -> FeedbackMeans {
        FeedbackMeans {
            target_bitrate: self.target_bitrate.value(),
            feedback_delay: self.feedback_delay.value(),
            rtt: self.rtt.value(),
            min_rtt: self.min_rtt.value(),
        }
    }
}

/// The fields of a row the extractor needs, parsed once.
#[derive(Debug, Clone)]
struct Sample {
    row: PacketLogRow,
    feedback: String,
    bucket: usize,
    bits: u64,
    received: bool,
    rtx: bool,
    probing: bool,
    feedback_delay: f64,
    target_bitrate: f64,
    rtt: f64,
    min_rtt: f64,
}

impl Sample {
    fn parse(row: PacketLogRow, clock: &Clock) -> Result<Option<Self>, RowError> {
        let sent = row.sent_time()?;
        let Some(bucket) = clock.bucket(sent) else {
            return Ok(None);
        };
        let size = row.int(columns::SIZE)?;
        let bits = u64::try_from(size)
            .ok()
            .and_then(|bytes| bytes.checked_mul(8))
            .ok_or_else(|| RowError::InvalidNumber {
                column: columns::SIZE,
                value: size.to_string(),
            })?;
        let feedback_time = row.float(columns::FEEDBACK_TIME)?;

        Ok(Some(Self {
            feedback: row.field(columns::FEEDBACK_TIME)?.to_string(),
            bucket,
            bits,
            received: sent != 0 && row.recv_time()? != 0,
            rtx: row.flag(columns::RTX)?,
            probing: row.flag(columns::PROBING)?,
            feedback_delay: (feedback_time - sent as f64) / 1000.0,
            target_bitrate: row.float(columns::TARGET_BITRATE)?,
            rtt: row.float(columns::RTT)?,
            min_rtt: row.float(columns::MIN_RTT)?,
            row,
        }))
    }
}

pub struct BitrateReport {
    samples: Vec<(Sample, usize)>,
    table: BucketTable<BITRATE_CATEGORIES>,
    groups: Vec<FeedbackMeans>,
}

impl BitrateReport {
    pub fn table(&self) -> &BucketTable<BITRATE_CATEGORIES> {
        &self.table
    }

    pub fn groups(&self) -> &[FeedbackMeans] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Each kept row: its raw fields, the four bitrate values of its bucket,
    /// then its feedback means (target, delay, rtt, min rtt).
    pub fn write_csv<W: Write>(&self, out: W) -> io::Result<()> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(out);
        for (sample, group) in &self.samples {
            let bucket = self
                .table
                .row(sample.bucket)
                .copied()
                .unwrap_or([0; BITRATE_CATEGORIES]);
            let means = self.groups.get(*group).copied().unwrap_or_default();

            let mut record = sample.row.record().clone();
            for value in bucket {
                record.push_field(&value.to_string());
            }
            for mean in [
                means.target_bitrate,
                means.feedback_delay,
                means.rtt,
                means.min_rtt,
            ] {
                record.push_field(&format_float(mean));
            }
            writer.write_record(&record)?;
        }
        writer.flush()
    }
}

pub fn extract_bitrate(input: &str, config: &BucketConfig) -> BitrateReport {
    let clock = Clock::absolute(TimeScale::PACKET_LOG, config);
    let mut table = BucketTable::new();
    let mut samples = Vec::new();
    let mut groups: Vec<FeedbackGroup> = Vec::new();
    let mut current: Option<String> = None;

    for (number, row) in rows(input) {
        let sample = match Sample::parse(row, &clock) {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                debug!("Skipping packet log line {number}: negative send time");
                continue;
            }
            Err(err) => {
                debug!("Skipping packet log line {number}: {err}");
                continue;
            }
        };

        let media = !sample.rtx && !sample.probing;
        table.record(sample.bucket, category::MEDIA, if media { sample.bits } else { 0 });
        table.record(sample.bucket, category::RTX, if sample.rtx { sample.bits } else { 0 });
        table.record(
            sample.bucket,
            category::PROBING,
            if sample.probing { sample.bits } else { 0 },
        );
        table.record(
            sample.bucket,
            category::RECEIVED,
            if sample.received { sample.bits } else { 0 },
        );

        if current.as_deref() != Some(sample.feedback.as_str()) {
            current = Some(sample.feedback.clone());
            groups.push(FeedbackGroup::default());
        }
        let index = groups.len() - 1;
        let group = &mut groups[index];
        group.target_bitrate.add(sample.target_bitrate);
        group.feedback_delay.add(sample.feedback_delay);
        group.rtt.add(sample.rtt);
        group.min_rtt.add(sample.min_rtt);

        samples.push((sample, index));
    }

    BitrateReport {
        samples,
        table,
        groups: groups.iter().map(FeedbackGroup::means).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(fb: i64, size: u64, sent: i64, recv: i64, rtx: u8, probing: u8, rtt: u32) -> String {
        format!("{fb}|1|1|{size}|{sent}|{recv}|0|0|0|0|500000|0|{rtt}|10|0|{rtx}|{probing}")
    }

    #[test]
    fn splits_bits_by_packet_type() {
        let input = [
            line(9_000_000, 100, 1_000_000, 1_050_000, 0, 0, 20),
            line(9_000_000, 50, 1_200_000, 0, 1, 0, 20),
            line(9_000_000, 10, 1_900_000, 1_950_000, 0, 1, 20),
            line(9_000_000, 10, 3_000_000, 3_010_000, 0, 0, 20),
        ]
        .join("\n");

        let report = extract_bitrate(&input, &BucketConfig::default());
        let table = report.table();
        assert_eq!(table.len(), 4);
        assert_eq!(table.row(1), Some(&[800, 80, 400, 880]));
        assert_eq!(table.row(2), Some(&[0, 0, 0, 0]));
        assert_eq!(table.row(3), Some(&[80, 0, 0, 80]));
    }

    #[test]
    fn averages_each_feedback_run() {
        let input = [
            line(2_000_000, 10, 1_000_000, 1_100_000, 0, 0, 20),
            line(2_000_000, 10, 1_500_000, 1_600_000, 0, 0, 30),
            line(4_000_000, 10, 3_000_000, 3_100_000, 0, 0, 40),
        ]
        .join("\n");

        let report = extract_bitrate(&input, &BucketConfig::default());
        assert_eq!(
            report.groups(),
            &[
                FeedbackMeans {
                    target_bitrate: 500_000.0,
                    feedback_delay: 750.0,
                    rtt: 25.0,
                    min_rtt: 10.0,
                },
                FeedbackMeans {
                    target_bitrate: 500_000.0,
                    feedback_delay: 1000.0,
                    rtt: 40.0,
                    min_rtt: 10.0,
                },
            ]
        );
    }

    #[test]
    fn rows_are_echoed_with_bucket_and_means() {
        let first = line(2_000_000, 10, 1_000_000, 1_100_000, 0, 0, 20);
        let input = format!("{first}\ngarbage\n");

        let report = extract_bitrate(&input, &BucketConfig::default());
        assert_eq!(report.len(), 1);

        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        let expected = format!(
            "{},80,0,0,80,500000.0,1000.0,20.0,10.0\n",
            first.replace('|', ",")
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn unusable_sizes_skip_the_row() {
        let input = [
            line(2_000_000, 3_000_000_000_000_000_000, 1_000_000, 1_100_000, 0, 0, 20),
            "2000000|1|1|-5|1000000|1100000|0|0|0|0|500000|0|20|10|0|0|0".to_string(),
            line(2_000_000, 10, 1_000_000, 1_100_000, 0, 0, 20),
        ]
        .join("\n");

        let report = extract_bitrate(&input, &BucketConfig::default());
        assert_eq!(report.len(), 1);
        assert_eq!(report.table().row(1), Some(&[80, 0, 0, 80]));
    }

    #[test]
    fn fields_with_commas_are_quoted_on_output() {
        let input = "\"2000000\"|a,b|1|10|1000000|1100000|0|0|0|0|500000|0|20|10|0|0|0";

        let report = extract_bitrate(input, &BucketConfig::default());
        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2000000,\"a,b\",1,10,1000000,1100000,0,0,0,0,500000,0,20,10,0,0,0,80,0,0,80,500000.0,1000.0,20.0,10.0\n"
        );
    }
}
