//! Coordinator error types.

use crate::vasttrafik::ApiError;

/// Why a tick failed. Never fatal; the next tick tries again.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Token acquisition failed; the token cache was not touched
    #[error("failed to obtain access token: {0}")]
    Token(#[source] ApiError),

    /// Departure fetch failed (an auth failure also drops the token)
    #[error("failed to fetch departures: {0}")]
    Departures(#[source] ApiError),
}

impl UpdateError {
    /// The underlying API error.
    pub fn api_error(&self) -> &ApiError {
        match self {
            UpdateError::Token(e) | UpdateError::Departures(e) => e,
        }
    }
}

/// Why the monitor could not be started.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// HTTP client could not be built
    #[error("failed to create API client: {0}")]
    Client(#[source] ApiError),

    /// The mandatory first refresh failed
    #[error("monitor not ready: {0}")]
    NotReady(#[source] UpdateError),

    /// The first refresh overlapped another one
    #[error("monitor not ready: a refresh was already in progress")]
    RefreshInProgress,
}
