//! Stop-area identifier type.

use std::fmt;

/// Error returned when parsing an invalid stop-area identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// A Västtrafik stop-area identifier ("gid"), e.g. `9021014001760000`.
///
/// The identifier is opaque to us, but it is interpolated into a URL path,
/// so only non-empty ASCII alphanumeric strings are accepted.
///
/// # Examples
///
/// ```
/// use departure_monitor::domain::StopId;
///
/// let stop = StopId::parse("9021014001760000").unwrap();
/// assert_eq!(stop.as_str(), "9021014001760000");
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("../token").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidStopId {
                reason: "must be ASCII letters and digits only",
            });
        }

        Ok(StopId(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
