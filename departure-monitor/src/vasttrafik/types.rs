//! Västtrafik API response DTOs.
//!
//! These types map onto the Planera Resa v4 JSON responses. Every optional
//! field is decoded leniently: a missing, `null` or oddly-shaped value becomes
//! `None` instead of failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Decode a field, turning any type mismatch into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a duration in seconds sent as an integer, a float or a numeric
/// string. Fractions are truncated; anything else becomes `None`.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| truncate(n.as_f64()?)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| truncate(s.parse::<f64>().ok()?))
        }
        _ => None,
    };
    Ok(seconds)
}

fn truncate(secs: f64) -> Option<i64> {
    // `as` saturates out-of-range values
    secs.is_finite().then(|| secs.trunc() as i64)
}

/// Response from `POST /token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token to present on API calls.
    pub access_token: String,

    /// Token lifetime in seconds.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<i64>,
}

/// Response from `GET /stop-areas/{gid}/departures`.
///
/// Entries are kept as raw JSON so that one malformed entry can be skipped
/// without rejecting the others.
#[derive(Debug, Clone, Deserialize)]
pub struct DeparturesResponse {
    pub results: Vec<serde_json::Value>,
}

/// A departure as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeparture {
    #[serde(default, deserialize_with = "lenient")]
    pub service_journey: Option<RawServiceJourney>,

    /// Timetabled time (RFC 3339).
    #[serde(default, deserialize_with = "lenient")]
    pub planned_time: Option<String>,

    /// Real-time estimate (RFC 3339); absent when no prediction exists.
    #[serde(default, deserialize_with = "lenient")]
    pub estimated_time: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub stop_point: Option<RawStopPoint>,

    #[serde(default, deserialize_with = "lenient")]
    pub is_cancelled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawServiceJourney {
    #[serde(default, deserialize_with = "lenient")]
    pub line: Option<RawLine>,

    #[serde(default, deserialize_with = "lenient")]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawLine {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub designation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStopPoint {
    #[serde(default, deserialize_with = "lenient")]
    pub platform: Option<RawPlatform>,
}

/// Platform/stand field, sent either as `"C"` or as `{"name": "C"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPlatform {
    Label(String),
    Named {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
    },
}

impl RawPlatform {
    /// The platform label, if one is present.
    pub fn label(&self) -> Option<&str> {
        match self {
            RawPlatform::Label(label) => Some(label),
            RawPlatform::Named { name } => name.as_deref(),
        }
    }
}

/// Response from `GET /locations/by-text`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub results: Vec<RawLocation>,
}

/// A location search hit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocation {
    #[serde(default, deserialize_with = "lenient")]
    pub gid: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    /// e.g. "stoparea", "stoppoint", "address".
    #[serde(default, deserialize_with = "lenient")]
    pub location_type: Option<String>,
}
