pub mod number;
pub mod state;
pub mod summary;
pub mod table;

pub use state::{AggregationState, CategorySlot, SourceOutcome, Totals};
pub use summary::LossSummary;
pub use table::{BucketTable, CumulativeRow};
