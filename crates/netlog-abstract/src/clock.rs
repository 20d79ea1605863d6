use crate::config::{BucketConfig, TimeScale};

/// Maps the native timestamps of one stream onto bucket indices.
///
/// Every stream carries its own origin; streams are never re-synchronized to
/// a shared clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    origin: i64,
    divisor: i64,
}

impl Clock {
    pub fn new(origin: i64, scale: TimeScale, config: &BucketConfig) -> Self {
        let width = i64::try_from(config.bucket_width.max(1)).unwrap_or(i64::MAX);
        Self {
            origin,
            divisor: scale.divisor.max(1).saturating_mul(width),
        }
    }

    /// Clock for a stream whose timestamps are already zero-based.
    pub fn absolute(scale: TimeScale, config: &BucketConfig) -> Self {
        Self::new(0, scale, config)
    }

    pub fn origin(&self) -> i64 {
        self.origin
    }

    /// Bucket index of `timestamp`, or `None` when it precedes the origin.
    pub fn bucket(&self, timestamp: i64) -> Option<usize> {
        let offset = timestamp.checked_sub(self.origin)?;
        if offset < 0 {
            return None;
        }
        usize::try_from(offset / self.divisor).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_match_across_formats() {
        let config = BucketConfig::default();
        let packet_log = Clock::absolute(TimeScale::PACKET_LOG, &config);
        let line_delimited = Clock::absolute(TimeScale::LINE_DELIMITED, &config);

        assert_eq!(packet_log.bucket(5_000_000), Some(5));
        assert_eq!(line_delimited.bucket(5_000), Some(5));
    }

    #[test]
    fn origin_zero_bases_the_stream() {
        let clock = Clock::new(1_700_000_000, TimeScale::MULTI_TRACE, &BucketConfig::default());
        assert_eq!(clock.bucket(1_700_000_000), Some(0));
        assert_eq!(clock.bucket(1_702_999_999), Some(2));
        assert_eq!(clock.bucket(1_699_999_999), None);
    }

    #[test]
    fn bucket_width_widens_intervals() {
        let config = BucketConfig { bucket_width: 10 };
        let clock = Clock::absolute(TimeScale::LINE_DELIMITED, &config);
        assert_eq!(clock.bucket(9_999), Some(0));
        assert_eq!(clock.bucket(10_000), Some(1));
    }

    #[test]
    fn zero_width_is_treated_as_one() {
        let config = BucketConfig { bucket_width: 0 };
        let clock = Clock::absolute(TimeScale::RAW, &config);
        assert_eq!(clock.bucket(7), Some(7));
    }
}
