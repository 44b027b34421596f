//! Västtrafik Planera Resa v4 HTTP client.
//!
//! Holds one long-lived connection pool. Every request carries its own
//! timeout, and a timed-out request surfaces as [`ApiError::Http`].

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};

use crate::domain::{Credential, StopId};

use super::api::DepartureApi;
use super::error::ApiError;
use super::token::AccessToken;
use super::types::{DeparturesResponse, LocationsResponse, RawDeparture, TokenResponse};

/// Default OAuth2 token endpoint.
const DEFAULT_TOKEN_URL: &str = "https://ext-api.vasttrafik.se/token";

/// Default base URL for the Planera Resa v4 API.
const DEFAULT_API_BASE: &str = "https://ext-api.vasttrafik.se/pr/v4";

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default look-ahead window for departures.
const DEFAULT_TIME_SPAN_MINS: u32 = 60;

/// Default cap on departures returned per line.
const DEFAULT_MAX_PER_LINE: u32 = 2;

/// Configuration for the Västtrafik client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Token endpoint URL
    pub token_url: String,
    /// Base URL for the API
    pub api_base: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// How far ahead to list departures (minutes)
    pub time_span_mins: u32,
    /// Maximum departures per line
    pub max_departures_per_line: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            time_span_mins: DEFAULT_TIME_SPAN_MINS,
            max_departures_per_line: DEFAULT_MAX_PER_LINE,
        }
    }
}

impl ClientConfig {
    /// Point both endpoints at a different host (for testing).
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.token_url = format!("{base}/token");
        self.api_base = format!("{base}/pr/v4");
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the departure look-ahead window.
    pub fn with_time_span(mut self, mins: u32) -> Self {
        self.time_span_mins = mins;
        self
    }

    /// Set the per-line departure cap.
    pub fn with_max_departures_per_line(mut self, n: u32) -> Self {
        self.max_departures_per_line = n;
        self
    }
}

/// A stop area found by name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopArea {
    pub gid: StopId,
    pub name: String,
}

/// Västtrafik API client.
#[derive(Debug, Clone)]
pub struct VasttrafikClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl VasttrafikClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search stop areas by free text (e.g. "Brunnsparken").
    ///
    /// Hits that are not stop areas, or that lack a usable gid, are dropped.
    pub async fn search_stop_areas(
        &self,
        token: &AccessToken,
        query: &str,
        limit: u32,
    ) -> Result<Vec<StopArea>, ApiError> {
        let url = format!("{}/locations/by-text", self.config.api_base);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.value())
            .query(&[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
                ("types", "stoparea".to_string()),
            ])
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let locations: LocationsResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::json(e, &body))?;

        Ok(stop_areas(locations))
    }
}

impl DepartureApi for VasttrafikClient {
    async fn request_token(&self, credential: &Credential) -> Result<TokenResponse, ApiError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .header(AUTHORIZATION, credential.basic_authorization())
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();

        // Any refusal from the token endpoint means the credential is unusable.
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "token request rejected");
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::json(e, &body))
    }

    async fn departures(
        &self,
        token: &AccessToken,
        stop: &StopId,
    ) -> Result<Vec<RawDeparture>, ApiError> {
        let url = format!(
            "{}/stop-areas/{}/departures",
            self.config.api_base,
            stop.as_str()
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.value())
            .query(&[
                ("timeSpanInMinutes", self.config.time_span_mins.to_string()),
                (
                    "maxDeparturesPerLine",
                    self.config.max_departures_per_line.to_string(),
                ),
            ])
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let departures = parse_departures(&body)?;

        debug!(stop = %stop, count = departures.len(), "fetched departures");
        Ok(departures)
    }
}

/// Map the response status to an error, or return the body text.
async fn read_success_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Unauthorized {
            status: status.as_u16(),
            message: body,
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Upstream {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response.text().await?)
}

/// Parse a departures document.
///
/// A body that is not JSON or has no `results` list is an error. Entries that
/// are not objects are skipped.
pub(crate) fn parse_departures(body: &str) -> Result<Vec<RawDeparture>, ApiError> {
    let response: DeparturesResponse =
        serde_json::from_str(body).map_err(|e| ApiError::json(e, body))?;

    let mut departures = Vec::with_capacity(response.results.len());

    for (index, entry) in response.results.into_iter().enumerate() {
        if !entry.is_object() {
            warn!(index, "skipping departure entry that is not an object");
            continue;
        }

        match serde_json::from_value::<RawDeparture>(entry) {
            Ok(departure) => departures.push(departure),
            Err(e) => warn!(index, error = %e, "skipping unreadable departure entry"),
        }
    }

    Ok(departures)
}

/// Keep stop-area hits with a valid gid.
fn stop_areas(locations: LocationsResponse) -> Vec<StopArea> {
    locations
        .results
        .into_iter()
        .filter(|l| l.location_type.as_deref() == Some("stoparea"))
        .filter_map(|l| {
            let gid = StopId::parse(l.gid.as_deref()?).ok()?;
            Some(StopArea {
                gid,
                name: l.name.unwrap_or_default(),
            })
        })
        .collect()
}
