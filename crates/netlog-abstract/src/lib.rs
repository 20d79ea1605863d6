pub mod clock;
pub mod config;
pub mod event;

pub use clock::Clock;
pub use config::{BucketConfig, TimeScale};
pub use event::{Event, EventKind, EventStream, Payload};
