//! Scripted `DepartureApi` for tests.
//!
//! Replays queued token and departure responses, falling back to a fresh
//! token and an empty board once the queues run dry, and counts every call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::domain::{Credential, StopId};

use super::api::DepartureApi;
use super::error::ApiError;
use super::token::AccessToken;
use super::types::{RawDeparture, RawLine, RawServiceJourney, TokenResponse};

#[derive(Default)]
pub(crate) struct MockApi {
    tokens: Mutex<VecDeque<Result<TokenResponse, ApiError>>>,
    departures: Mutex<VecDeque<Result<Vec<RawDeparture>, ApiError>>>,
    token_calls: AtomicUsize,
    departure_calls: AtomicUsize,
    tokens_seen: Mutex<Vec<String>>,
    /// Holds the next departures call until notified.
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn gated(self, gate: Arc<Notify>) -> Self {
        *self.gate.lock().unwrap() = Some(gate);
        self
    }

    pub(crate) fn push_token(&self, response: Result<TokenResponse, ApiError>) {
        self.tokens.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_departures(&self, response: Result<Vec<RawDeparture>, ApiError>) {
        self.departures.lock().unwrap().push_back(response);
    }

    pub(crate) fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn departure_calls(&self) -> usize {
        self.departure_calls.load(Ordering::SeqCst)
    }

    /// Bearer tokens presented to the departures endpoint, in order.
    pub(crate) fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

impl DepartureApi for MockApi {
    async fn request_token(&self, _credential: &Credential) -> Result<TokenResponse, ApiError> {
        let n = self.token_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.tokens.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(TokenResponse {
                access_token: format!("token-{n}"),
                expires_in: Some(3600),
            })
        })
    }

    async fn departures(
        &self,
        token: &AccessToken,
        _stop: &StopId,
    ) -> Result<Vec<RawDeparture>, ApiError> {
        self.departure_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen
            .lock()
            .unwrap()
            .push(token.value().to_string());

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let next = self.departures.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// A raw departure on `line` with the given times.
pub(crate) fn raw_departure(line: &str, planned: &str, estimated: Option<&str>) -> RawDeparture {
    RawDeparture {
        service_journey: Some(RawServiceJourney {
            line: Some(RawLine {
                name: Some(line.to_string()),
                designation: Some(line.to_string()),
            }),
            direction: Some("Bergsjön".to_string()),
        }),
        planned_time: Some(planned.to_string()),
        estimated_time: estimated.map(str::to_string),
        stop_point: None,
        is_cancelled: Some(false),
    }
}

pub(crate) fn unauthorized() -> ApiError {
    ApiError::Unauthorized {
        status: 401,
        message: "invalid_token".to_string(),
    }
}

pub(crate) fn upstream(status: u16) -> ApiError {
    ApiError::Upstream {
        status,
        message: "upstream failure".to_string(),
    }
}

/// A genuine transport-level error, built without touching the network.
pub(crate) fn network_error() -> ApiError {
    let err = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    ApiError::Http(err)
}
