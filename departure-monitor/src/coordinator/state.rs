//! Published coordinator state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::Snapshot;

/// Where the coordinator is within a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TickPhase {
    #[default]
    Idle,
    Fetching,
}

/// What a refresh request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new snapshot was published.
    Updated,
    /// Another tick was still running, so nothing was done.
    Skipped,
}

/// Read-only view of the coordinator, as seen by consumers.
///
/// Each published value is internally consistent: a snapshot is only ever
/// replaced as a whole, and a failed tick leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    pub phase: TickPhase,

    /// Last successfully fetched departures.
    pub snapshot: Option<Arc<Snapshot>>,

    /// Whether the most recent finished tick succeeded.
    pub last_update_success: bool,

    /// Error message of the most recent failed tick.
    pub last_error: Option<String>,

    /// Start of the most recent tick.
    pub last_attempt: Option<DateTime<Utc>>,
}
