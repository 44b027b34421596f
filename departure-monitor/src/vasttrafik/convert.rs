//! Conversion from Västtrafik DTOs to domain types.
//!
//! Conversion never fails: each field that is missing or malformed falls back
//! to a documented default so that one odd record cannot sink a whole board.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::domain::DepartureRecord;

use super::types::RawDeparture;

/// Shown when upstream gives no line name.
const UNKNOWN_LINE: &str = "?";

/// Convert raw departures, preserving upstream order.
pub fn convert_departures(raw: &[RawDeparture]) -> Vec<DepartureRecord> {
    raw.iter().map(convert_departure).collect()
}

/// Convert a single raw departure.
pub fn convert_departure(raw: &RawDeparture) -> DepartureRecord {
    let journey = raw.service_journey.as_ref();
    let line = journey.and_then(|j| j.line.as_ref());

    let planned_time = raw.planned_time.as_deref().and_then(parse_time);
    let is_realtime = raw.estimated_time.is_some();
    let estimated_time = raw
        .estimated_time
        .as_deref()
        .and_then(parse_time)
        .or(planned_time);

    let delay_minutes = match (planned_time, estimated_time) {
        (Some(planned), Some(estimated)) => delay_minutes(planned, estimated),
        _ => 0,
    };

    let track = raw
        .stop_point
        .as_ref()
        .and_then(|s| s.platform.as_ref())
        .and_then(|p| p.label())
        .unwrap_or_default()
        .to_string();

    DepartureRecord {
        line_number: line
            .and_then(|l| l.name.clone())
            .unwrap_or_else(|| UNKNOWN_LINE.to_string()),
        line_designation: line.and_then(|l| l.designation.clone()).unwrap_or_default(),
        direction: journey.and_then(|j| j.direction.clone()).unwrap_or_default(),
        planned_time,
        estimated_time,
        delay_minutes,
        track,
        is_cancelled: raw.is_cancelled.unwrap_or(false),
        is_realtime,
    }
}

/// Difference between estimate and plan, rounded to whole minutes.
pub fn delay_minutes(planned: DateTime<FixedOffset>, estimated: DateTime<FixedOffset>) -> i64 {
    let seconds = (estimated - planned).num_seconds();
    (seconds as f64 / 60.0).round() as i64
}

/// Parse an RFC 3339 timestamp such as `2024-03-15T14:25:00.000+01:00`.
fn parse_time(s: &str) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!(time = s, error = %e, "ignoring unparseable departure time");
            None
        }
    }
}
