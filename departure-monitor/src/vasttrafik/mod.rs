//! Västtrafik Planera Resa v4 client.
//!
//! This module provides the OAuth2 token manager, the HTTP client for the
//! departures and location-search endpoints, and the conversion of raw
//! departure records into domain types.
//!
//! Key characteristics of the API:
//! - Every call needs a bearer token from a client-credentials exchange
//! - Times are RFC 3339 with a local (Europe/Stockholm) offset
//! - The platform field is sometimes a string and sometimes an object

mod api;
mod client;
mod convert;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod token;
mod types;

pub use api::DepartureApi;
pub use client::{ClientConfig, StopArea, VasttrafikClient};
pub use convert::{convert_departure, convert_departures, delay_minutes};
pub use error::{ApiError, ErrorKind};
pub use token::{
    AccessToken, DEFAULT_EXPIRY_BUFFER_SECS, DEFAULT_FALLBACK_LIFETIME_SECS, TokenManager,
    TokenPolicy,
};
pub use types::{
    RawDeparture, RawLine, RawLocation, RawPlatform, RawServiceJourney, RawStopPoint,
    TokenResponse,
};
