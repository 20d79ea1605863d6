use netlog_abstract::EventStream;
use netlog_aggregator::{AggregationState, CategorySlot, SourceOutcome, Totals};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::SourceError;

/// A log format that can be turned into classified event streams.
pub trait EventSource {
    /// Human-readable name used in logs and summaries.
    fn label(&self) -> &str;

    /// Parse the full text of one log file.
    ///
    /// Records that cannot be classified are skipped; an error means the
    /// input as a whole is unusable.
    fn streams(&self, input: &str) -> Result<Vec<EventStream>, SourceError>;
}

/// Fold every event of `input` into `state`, writing into the columns named
/// by `slot`. Returns the counts this source contributed.
pub fn feed<const N: usize>(
    source: &dyn EventSource,
    input: &str,
    state: &mut AggregationState<N>,
    slot: CategorySlot,
) -> Result<Totals, SourceError> {
    let mut totals = Totals::default();
    for stream in source.streams(input)? {
        let clock = state.clock(stream.origin, stream.scale);
        for event in &stream.events {
            state.observe(&clock, event, slot, &mut totals);
        }
    }
    Ok(totals)
}

pub fn read_source(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and feed one file. Failures degrade the source to an empty
/// contribution instead of aborting the run.
pub fn feed_file<const N: usize>(
    source: &dyn EventSource,
    path: &Path,
    state: &mut AggregationState<N>,
    slot: CategorySlot,
) -> SourceOutcome {
    let result = read_source(path).and_then(|input| feed(source, &input, state, slot));
    match result {
        Ok(totals) => {
            info!(
                "[{}] {}: {} sent, {} lost",
                source.label(),
                path.display(),
                totals.sent,
                totals.lost
            );
            SourceOutcome::Ok(totals)
        }
        Err(err) => {
            warn!("[{}] {}", source.label(), err);
            SourceOutcome::degraded(err.to_string())
        }
    }
}
