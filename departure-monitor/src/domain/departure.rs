//! Normalized departures and the snapshot that carries them.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// A single departure, normalized from the upstream record.
///
/// Constructed fresh on every fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartureRecord {
    /// Line name as shown to passengers (e.g. "16"), `"?"` when unknown.
    pub line_number: String,

    /// Line designation (often identical to the name).
    pub line_designation: String,

    /// Direction/destination text.
    pub direction: String,

    /// Timetabled departure, `None` when upstream omitted or garbled it.
    pub planned_time: Option<DateTime<FixedOffset>>,

    /// Real-time estimate, falling back to `planned_time`.
    pub estimated_time: Option<DateTime<FixedOffset>>,

    /// `round(estimated - planned)` in minutes; negative when early.
    pub delay_minutes: i64,

    /// Platform or stand label, empty when unknown.
    pub track: String,

    pub is_cancelled: bool,

    /// Whether upstream supplied a real-time estimate.
    pub is_realtime: bool,
}

/// The complete result of one successful fetch.
///
/// Published as a whole; readers never see a partially updated snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Departures in upstream order.
    pub departures: Vec<DepartureRecord>,

    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot stamped with the current time.
    pub fn new(departures: Vec<DepartureRecord>) -> Self {
        Self::at(departures, Utc::now())
    }

    /// Create a snapshot with an explicit fetch time.
    pub fn at(departures: Vec<DepartureRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            departures,
            fetched_at,
        }
    }

    pub fn len(&self) -> usize {
        self.departures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }
}
