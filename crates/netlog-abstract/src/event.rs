use serde_json::Number;

use crate::config::TimeScale;

/// What an event reports. The set is closed; log records that map to none of
/// these are dropped by the adapters before they become events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// One packet left the sender.
    PacketSent,
    /// One or more packets were declared lost.
    PacketsLost { count: u64 },
    /// Congestion controller state snapshot.
    MetricsUpdated,
}

/// Optional fields carried by some events.
///
/// Metric values keep the number exactly as it was logged so exports can
/// reproduce it (`20.0` stays `20.0`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    /// Packet size in bytes
    pub size: Option<u64>,
    /// Untruncated native time of the record.
    pub logged_time: Option<Number>,
    pub bytes_in_flight: Option<Number>,
    pub congestion_window: Option<Number>,
    pub latest_rtt: Option<Number>,
    pub min_rtt: Option<Number>,
    pub smoothed_rtt: Option<Number>,
    pub ack_delay: Option<Number>,
}

impl Payload {
    pub fn with_size(size: u64) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    /// `(bytes_in_flight, congestion_window)` when both are present.
    pub fn window(&self) -> Option<(&Number, &Number)> {
        Some((self.bytes_in_flight.as_ref()?, self.congestion_window.as_ref()?))
    }

    /// `[latest, min, smoothed, ack_delay]` when all four are present.
    pub fn rtt(&self) -> Option<[&Number; 4]> {
        Some([
            self.latest_rtt.as_ref()?,
            self.min_rtt.as_ref()?,
            self.smoothed_rtt.as_ref()?,
            self.ack_delay.as_ref()?,
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Source-native timestamp, truncated to an integer.
    pub timestamp: i64,
    pub kind: EventKind,
    pub payload: Payload,
}

impl Event {
    pub fn new(timestamp: i64, kind: EventKind) -> Self {
        Self {
            timestamp,
            kind,
            payload: Payload::default(),
        }
    }

    pub fn with_payload(timestamp: i64, kind: EventKind, payload: Payload) -> Self {
        Self {
            timestamp,
            kind,
            payload,
        }
    }

    pub fn sent(timestamp: i64) -> Self {
        Self::new(timestamp, EventKind::PacketSent)
    }

    pub fn lost(timestamp: i64, count: u64) -> Self {
        Self::new(timestamp, EventKind::PacketsLost { count })
    }
}

/// Events of one stream, sharing one time origin and one native scale.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStream {
    pub origin: i64,
    pub scale: TimeScale,
    pub events: Vec<Event>,
}

impl EventStream {
    pub fn new(origin: i64, scale: TimeScale) -> Self {
        Self {
            origin,
            scale,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }
}
