//! The upstream operations the coordinator depends on.

use std::future::Future;
use std::sync::Arc;

use crate::domain::{Credential, StopId};

use super::error::ApiError;
use super::token::AccessToken;
use super::types::{RawDeparture, TokenResponse};

/// Upstream departure API.
///
/// This abstraction allows the token manager and the update coordinator to
/// be tested without network access.
pub trait DepartureApi: Send + Sync {
    /// Perform a client-credentials exchange.
    fn request_token(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<TokenResponse, ApiError>> + Send;

    /// Fetch the upcoming departures for a stop area.
    ///
    /// A 401-class response is reported as [`ApiError::Unauthorized`]; the
    /// caller decides what to do with the token.
    fn departures(
        &self,
        token: &AccessToken,
        stop: &StopId,
    ) -> impl Future<Output = Result<Vec<RawDeparture>, ApiError>> + Send;
}

impl<T: DepartureApi> DepartureApi for Arc<T> {
    fn request_token(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<TokenResponse, ApiError>> + Send {
        (**self).request_token(credential)
    }

    fn departures(
        &self,
        token: &AccessToken,
        stop: &StopId,
    ) -> impl Future<Output = Result<Vec<RawDeparture>, ApiError>> + Send {
        (**self).departures(token, stop)
    }
}
