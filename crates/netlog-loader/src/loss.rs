//! Correlates packet-log losses with QUIC losses over the same run.

use netlog_abstract::BucketConfig;
use netlog_aggregator::{AggregationState, BucketTable, CategorySlot, LossSummary, SourceOutcome};
use std::io::{self, Write};
use std::path::Path;

use crate::medooze::PacketLogSource;
use crate::qlog::QlogSource;
use crate::source::feed_file;

pub const LOSS_CATEGORIES: usize = 4;

pub const PACKET_LOG_SLOT: CategorySlot = CategorySlot { sent: 0, lost: 1 };
pub const QLOG_SLOT: CategorySlot = CategorySlot { sent: 2, lost: 3 };

#[derive(Debug, Clone)]
pub struct LossReport {
    /// Columns: packet log sent, packet log lost, qlog sent, qlog lost.
    pub table: BucketTable<LOSS_CATEGORIES>,
    pub packet_log: SourceOutcome,
    pub qlog: SourceOutcome,
}

impl LossReport {
    pub fn summaries(&self) -> [LossSummary; 2] {
        [
            LossSummary::from_outcome(PacketLogSource::LABEL, &self.packet_log),
            LossSummary::from_outcome(QlogSource::LABEL, &self.qlog),
        ]
    }

    pub fn write_csv<W: Write>(&self, out: W) -> io::Result<()> {
        self.table.write_csv(out)
    }
}

/// Bucket both logs into one table. Either source may degrade without
/// affecting the other.
pub fn correlate_loss(packet_log: &Path, qlog: &Path, config: BucketConfig) -> LossReport {
    let mut state = AggregationState::<LOSS_CATEGORIES>::new(config);
    let packet_log = feed_file(&PacketLogSource, packet_log, &mut state, PACKET_LOG_SLOT);
    let qlog = feed_file(&QlogSource, qlog, &mut state, QLOG_SLOT);

    LossReport {
        table: state.into_table(),
        packet_log,
        qlog,
    }
}
