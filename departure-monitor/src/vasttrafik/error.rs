//! Västtrafik client error types.

use std::fmt;

/// Errors from the Västtrafik HTTP client.
#[derive(Debug)]
pub enum ApiError {
    /// Request could not complete (timeout, DNS, connect, TLS, reset).
    Http(reqwest::Error),

    /// Credential or bearer token rejected.
    Unauthorized { status: u16, message: String },

    /// Reachable, authenticated endpoint returned an unexpected status.
    Upstream { status: u16, message: String },

    /// Response body was not the expected JSON document.
    Json {
        message: String,
        body: Option<String>,
    },
}

/// Coarse classification used by the update coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport-level failure; retry on the next tick.
    Network,
    /// Authorization denied; the token must be dropped.
    Auth,
    /// Unexpected status or shape; retry on the next tick.
    Upstream,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Http(_) => ErrorKind::Network,
            ApiError::Unauthorized { .. } => ErrorKind::Auth,
            ApiError::Upstream { .. } | ApiError::Json { .. } => ErrorKind::Upstream,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Build a JSON error, keeping a bounded excerpt of the body.
    pub(crate) fn json(err: impl fmt::Display, body: &str) -> Self {
        ApiError::Json {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "HTTP error: {e}"),
            ApiError::Unauthorized { status, message } => {
                write!(f, "unauthorized ({status}): {message}")
            }
            ApiError::Upstream { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            ApiError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}
