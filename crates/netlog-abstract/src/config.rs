/// Divisor turning a source's native timestamps into whole time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeScale {
    pub divisor: i64,
}

impl TimeScale {
    /// Packet log send times (nanosecond-scaled).
    pub const PACKET_LOG: Self = Self { divisor: 1_000_000 };
    /// Multi-trace qlog documents (nanosecond-scaled).
    pub const MULTI_TRACE: Self = Self { divisor: 1_000_000 };
    /// Line-delimited qlog records (microsecond-scaled).
    pub const LINE_DELIMITED: Self = Self { divisor: 1_000 };
    /// Native units, no scaling.
    pub const RAW: Self = Self { divisor: 1 };
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::RAW
    }
}

#[derive(Debug, Clone)]
pub struct BucketConfig {
    /// Width of one bucket, in scaled time units.
    pub bucket_width: u64,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self { bucket_width: 1 }
    }
}
