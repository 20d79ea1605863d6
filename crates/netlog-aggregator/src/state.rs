use netlog_abstract::{BucketConfig, Clock, Event, EventKind, TimeScale};
use tracing::debug;

use crate::table::BucketTable;

/// Columns one source writes its sent and lost counts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySlot {
    pub sent: usize,
    pub lost: usize,
}

/// Running per-source counters, kept independently of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub sent: u64,
    pub lost: u64,
}

impl Totals {
    pub fn new(sent: u64, lost: u64) -> Self {
        Self { sent, lost }
    }
}

/// Result of feeding one source into the aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Ok(Totals),
    /// The source could not be used; it contributes nothing.
    Degraded { reason: String },
}

impl SourceOutcome {
    pub fn degraded(reason: impl Into<String>) -> Self {
        SourceOutcome::Degraded {
            reason: reason.into(),
        }
    }

    pub fn totals(&self) -> Totals {
        match self {
            SourceOutcome::Ok(totals) => *totals,
            SourceOutcome::Degraded { .. } => Totals::default(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SourceOutcome::Degraded { .. })
    }
}

/// Everything accumulated so far across all sources of one run.
#[derive(Debug, Clone, Default)]
pub struct AggregationState<const N: usize> {
    config: BucketConfig,
    table: BucketTable<N>,
}

impl<const N: usize> AggregationState<N> {
    pub fn new(config: BucketConfig) -> Self {
        Self {
            config,
            table: BucketTable::new(),
        }
    }

    pub fn config(&self) -> &BucketConfig {
        &self.config
    }

    pub fn table(&self) -> &BucketTable<N> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut BucketTable<N> {
        &mut self.table
    }

    pub fn into_table(self) -> BucketTable<N> {
        self.table
    }

    /// Clock for a stream starting at `origin`, bucketed with this run's width.
    pub fn clock(&self, origin: i64, scale: TimeScale) -> Clock {
        Clock::new(origin, scale, &self.config)
    }

    /// Fold one classified event into the table and the source's totals.
    ///
    /// Events before the clock's origin are dropped. Metric snapshots carry
    /// no loss information and are ignored here.
    pub fn observe(
        &mut self,
        clock: &Clock,
        event: &Event,
        slot: CategorySlot,
        totals: &mut Totals,
    ) {
        let Some(bucket) = clock.bucket(event.timestamp) else {
            debug!(
                "Dropping event at {} before stream origin {}",
                event.timestamp,
                clock.origin()
            );
            return;
        };

        match event.kind {
            EventKind::PacketSent => {
                self.table.record_one(bucket, slot.sent);
                totals.sent = totals.sent.saturating_add(1);
            }
            EventKind::PacketsLost { count } => {
                self.table.record(bucket, slot.lost, count);
                totals.lost = totals.lost.saturating_add(count);
            }
            EventKind::MetricsUpdated => {}
        }
    }
}
