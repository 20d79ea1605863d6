use std::fmt;

use crate::number::format_float;
use crate::state::{SourceOutcome, Totals};

/// Percentage reported when a source saw no sent packets at all.
///
/// Kept at `1` rather than `0` or `100`: comparison scripts downstream match
/// on this literal.
pub const NO_DATA_PERCENT: f64 = 1.0;

/// Per-source loss ratio printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossSummary {
    pub label: String,
    pub sent: u64,
    pub lost: u64,
}

impl LossSummary {
    pub fn new(label: impl Into<String>, totals: Totals) -> Self {
        Self {
            label: label.into(),
            sent: totals.sent,
            lost: totals.lost,
        }
    }

    pub fn from_outcome(label: impl Into<String>, outcome: &SourceOutcome) -> Self {
        Self::new(label, outcome.totals())
    }

    /// `lost * 100 / sent`, or [`NO_DATA_PERCENT`] when nothing was sent.
    pub fn percent(&self) -> f64 {
        if self.sent > 0 {
            self.lost as f64 * 100.0 / self.sent as f64
        } else {
            NO_DATA_PERCENT
        }
    }
}

impl fmt::Display for LossSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = if self.sent > 0 {
            format_float(self.percent())
        } else {
            "1".to_string()
        };
        write!(
            f,
            "{} loss -> total: {} lost: {} percent: {}",
            self.label, self.sent, self.lost, percent
        )
    }
}
