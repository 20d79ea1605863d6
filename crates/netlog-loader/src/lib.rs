pub mod bitrate;
pub mod congestion;
pub mod error;
pub mod loss;
pub mod medooze;
pub mod qlog;
pub mod source;

pub use error::{RowError, SourceError};
pub use loss::{LossReport, correlate_loss};
pub use medooze::{PacketLogRow, PacketLogSource};
pub use qlog::{QlogFormat, QlogSource, detect_format};
pub use source::{EventSource, feed, feed_file, read_source};
