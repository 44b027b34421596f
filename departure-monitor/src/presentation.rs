//! Rendering of coordinator state for display.
//!
//! The presenter only reads [`CoordinatorState`]; it produces a one-line
//! summary plus an attribute set with both a legacy list of display strings
//! and structured entries for machine consumers. Texts are Swedish, as shown
//! on Västtrafik's own displays.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::config::MonitorConfig;
use crate::coordinator::CoordinatorState;
use crate::domain::{DepartureRecord, StopId};

/// At most this many departures are rendered.
pub const MAX_RENDERED: usize = 15;

/// One departure, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartureDetail {
    pub line: String,
    pub destination: String,
    /// Local clock time, `HH:MM`
    pub departure_time: String,
    /// "Nu", "1 min", "7 min"
    pub relative_time: String,
    pub minutes_until: i64,
    pub track: String,
    pub delay_minutes: i64,
    pub is_cancelled: bool,
    pub is_realtime: bool,
    pub planned_time: String,
    pub estimated_time: String,
}

/// Attributes published alongside the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopAttributes {
    pub station_name: String,
    pub station_gid: String,
    /// e.g. "Linje 16 → Bergsjön - 14:25 (2 min) Läge B"
    pub departures: Vec<String>,
    pub departures_json: Vec<DepartureDetail>,
    /// Total departures in the snapshot, rendered or not
    pub departure_count: usize,
    pub last_update: String,
}

/// Presents one stop's coordinator state.
#[derive(Debug, Clone)]
pub struct StopPresenter {
    stop_name: String,
    stop_id: StopId,
}

impl StopPresenter {
    pub fn new(stop_name: impl Into<String>, stop_id: StopId) -> Self {
        Self {
            stop_name: stop_name.into(),
            stop_id,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.stop_name.clone(), config.stop_id.clone())
    }

    pub fn stop_name(&self) -> &str {
        &self.stop_name
    }

    /// Consumers should show the data only while updates succeed.
    pub fn is_available(&self, state: &CoordinatorState) -> bool {
        state.last_update_success
    }

    /// One-line summary, `None` before the first successful fetch.
    pub fn summary(&self, state: &CoordinatorState) -> Option<String> {
        let snapshot = state.snapshot.as_ref()?;

        if snapshot.is_empty() {
            return Some("Inga avgångar".to_string());
        }

        Some(format!(
            "{} avgångar från {}",
            snapshot.len(),
            self.stop_name
        ))
    }

    /// Full attribute set relative to `now`, `None` before the first fetch.
    pub fn attributes(&self, state: &CoordinatorState, now: DateTime<Utc>) -> Option<StopAttributes> {
        let snapshot = state.snapshot.as_ref()?;

        let (departures, departures_json): (Vec<String>, Vec<DepartureDetail>) = snapshot
            .departures
            .iter()
            .take(MAX_RENDERED)
            .map(|d| {
                let detail = detail(d, now);
                (display_line(&detail), detail)
            })
            .unzip();

        Some(StopAttributes {
            station_name: self.stop_name.clone(),
            station_gid: self.stop_id.to_string(),
            departures,
            departures_json,
            departure_count: snapshot.len(),
            last_update: snapshot.fetched_at.to_rfc3339(),
        })
    }
}

fn detail(departure: &DepartureRecord, now: DateTime<Utc>) -> DepartureDetail {
    let (departure_time, relative_time, minutes_until) = match departure.estimated_time {
        Some(at) => {
            let minutes = (at.with_timezone(&Utc) - now).num_seconds() / 60;
            (at.format("%H:%M").to_string(), relative(minutes), minutes)
        }
        None => (String::new(), "?".to_string(), 0),
    };

    DepartureDetail {
        line: departure.line_number.clone(),
        destination: departure.direction.clone(),
        departure_time,
        relative_time,
        minutes_until,
        track: departure.track.clone(),
        delay_minutes: departure.delay_minutes,
        is_cancelled: departure.is_cancelled,
        is_realtime: departure.is_realtime,
        planned_time: rfc3339_or_empty(departure.planned_time),
        estimated_time: rfc3339_or_empty(departure.estimated_time),
    }
}

fn relative(minutes: i64) -> String {
    match minutes {
        m if m <= 0 => "Nu".to_string(),
        1 => "1 min".to_string(),
        m => format!("{m} min"),
    }
}

fn display_line(d: &DepartureDetail) -> String {
    let delay = match d.delay_minutes {
        0 => String::new(),
        m if m > 0 => format!(" (+{m})"),
        m => format!(" ({m})"),
    };
    let track = if d.track.is_empty() {
        String::new()
    } else {
        format!(" Läge {}", d.track)
    };
    let cancelled = if d.is_cancelled { " [INSTÄLLD]" } else { "" };

    format!(
        "Linje {} → {} - {} ({}){}{}{}",
        d.line, d.destination, d.departure_time, d.relative_time, delay, track, cancelled
    )
}

fn rfc3339_or_empty(t: Option<DateTime<FixedOffset>>) -> String {
    t.map(|t| t.to_rfc3339()).unwrap_or_default()
}
