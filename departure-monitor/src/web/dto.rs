//! Data transfer objects for web responses.

use serde::Serialize;

use crate::presentation::StopAttributes;

/// Response for `GET /departures`.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    /// Whether the last update succeeded
    pub available: bool,

    /// One-line summary, absent before the first successful fetch
    pub summary: Option<String>,

    /// Message of the last failed update
    pub last_error: Option<String>,

    /// Rendered departures, absent before the first successful fetch
    pub attributes: Option<StopAttributes>,
}
