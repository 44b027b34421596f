//! Unit tests for the update coordinator's tick state machine.

use std::sync::Arc;

use tokio::sync::Notify;

use super::*;
use crate::domain::{Credential, StopId};
use crate::vasttrafik::mock::{MockApi, network_error, raw_departure, unauthorized, upstream};
use crate::vasttrafik::{ApiError, ErrorKind, TokenPolicy, TokenResponse};

const PLANNED: &str = "2024-03-15T14:25:00.000+01:00";
const FIVE_LATE: &str = "2024-03-15T14:30:00.000+01:00";

fn coordinator(api: MockApi) -> UpdateCoordinator<MockApi> {
    UpdateCoordinator::new(
        api,
        Credential::from_client("id", "secret"),
        StopId::parse("9021014001760000").unwrap(),
        TokenPolicy::default(),
    )
}

#[tokio::test]
async fn successful_tick_publishes_snapshot() {
    let api = MockApi::new();
    api.push_departures(Ok(vec![
        raw_departure("16", PLANNED, Some(FIVE_LATE)),
        raw_departure("6", PLANNED, None),
    ]));
    let coordinator = coordinator(api);

    let outcome = coordinator.refresh().await.unwrap();
    assert_eq!(outcome, TickOutcome::Updated);

    let state = coordinator.state();
    assert_eq!(state.phase, TickPhase::Idle);
    assert!(state.last_update_success);
    assert!(state.last_error.is_none());
    assert!(state.last_attempt.is_some());

    let snapshot = state.snapshot.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.departures[0].line_number, "16");
    assert_eq!(snapshot.departures[0].delay_minutes, 5);
    assert!(snapshot.departures[0].is_realtime);
    assert_eq!(snapshot.departures[1].line_number, "6");
    assert!(!snapshot.departures[1].is_realtime);
}

#[tokio::test]
async fn state_before_first_tick() {
    let coordinator = coordinator(MockApi::new());
    let state = coordinator.state();

    assert!(state.snapshot.is_none());
    assert!(!state.last_update_success);
    assert_eq!(state.phase, TickPhase::Idle);
    assert!(coordinator.cached_token().await.is_none());
}

#[tokio::test]
async fn token_is_reused_across_ticks() {
    let coordinator = coordinator(MockApi::new());

    for _ in 0..5 {
        coordinator.refresh().await.unwrap();
    }

    assert_eq!(coordinator.api().token_calls(), 1);
    assert_eq!(coordinator.api().departure_calls(), 5);
    assert!(
        coordinator
            .api()
            .tokens_seen()
            .iter()
            .all(|t| t == "token-0")
    );
}

#[tokio::test]
async fn unauthorized_departures_drop_token_without_retry() {
    let coordinator = coordinator(MockApi::new());
    coordinator.refresh().await.unwrap();
    assert!(coordinator.cached_token().await.is_some());

    coordinator.api().push_departures(Err(unauthorized()));
    let err = coordinator.refresh().await.unwrap_err();

    assert!(matches!(err, UpdateError::Departures(ref e) if e.is_auth()));
    assert!(coordinator.cached_token().await.is_none());
    // No inline retry within the failed tick
    assert_eq!(coordinator.api().token_calls(), 1);
    assert_eq!(coordinator.api().departure_calls(), 2);

    // Next tick re-authenticates
    coordinator.refresh().await.unwrap();
    assert_eq!(coordinator.api().token_calls(), 2);
    assert_eq!(
        coordinator.api().tokens_seen(),
        ["token-0", "token-0", "token-1"]
    );
}

#[tokio::test]
async fn unauthorized_on_first_use_clears_fresh_token() {
    let api = MockApi::new();
    api.push_departures(Err(unauthorized()));
    let coordinator = coordinator(api);

    assert!(coordinator.refresh().await.is_err());
    assert!(coordinator.cached_token().await.is_none());
    assert_eq!(coordinator.api().token_calls(), 1);
}

#[tokio::test]
async fn failed_tick_keeps_previous_snapshot() {
    let api = MockApi::new();
    api.push_departures(Ok(vec![raw_departure("16", PLANNED, None)]));
    let coordinator = coordinator(api);
    coordinator.refresh().await.unwrap();
    let before = coordinator.snapshot().unwrap();

    coordinator.api().push_departures(Err(upstream(502)));
    let err = coordinator.refresh().await.unwrap_err();
    assert_eq!(err.api_error().kind(), ErrorKind::Upstream);

    let after = coordinator.snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(*before, *after);

    let state = coordinator.state();
    assert!(!state.last_update_success);
    assert!(state.last_error.unwrap().contains("502"));
    assert_eq!(state.phase, TickPhase::Idle);
}

#[tokio::test]
async fn recovery_after_failure_replaces_snapshot() {
    let api = MockApi::new();
    api.push_departures(Err(upstream(503)));
    api.push_departures(Ok(vec![raw_departure("11", PLANNED, None)]));
    let coordinator = coordinator(api);

    assert!(coordinator.refresh().await.is_err());
    assert!(coordinator.snapshot().is_none());

    coordinator.refresh().await.unwrap();
    let state = coordinator.state();
    assert!(state.last_update_success);
    assert!(state.last_error.is_none());
    assert_eq!(state.snapshot.unwrap().departures[0].line_number, "11");
}

#[tokio::test]
async fn upstream_error_keeps_token() {
    let coordinator = coordinator(MockApi::new());
    coordinator.refresh().await.unwrap();
    let token = coordinator.cached_token().await;

    coordinator.api().push_departures(Err(upstream(500)));
    assert!(coordinator.refresh().await.is_err());

    assert_eq!(coordinator.cached_token().await, token);
}

#[tokio::test]
async fn network_error_keeps_token() {
    let coordinator = coordinator(MockApi::new());
    coordinator.refresh().await.unwrap();
    let token = coordinator.cached_token().await;

    coordinator.api().push_departures(Err(network_error()));
    let err = coordinator.refresh().await.unwrap_err();

    assert_eq!(err.api_error().kind(), ErrorKind::Network);
    assert_eq!(coordinator.cached_token().await, token);
    assert!(!coordinator.last_update_success());
}

#[tokio::test]
async fn token_failure_skips_departures() {
    let api = MockApi::new();
    api.push_token(Err(ApiError::Unauthorized {
        status: 401,
        message: "invalid_client".to_string(),
    }));
    let coordinator = coordinator(api);

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, UpdateError::Token(_)));
    assert_eq!(coordinator.api().departure_calls(), 0);
    assert!(coordinator.snapshot().is_none());
    assert!(!coordinator.last_update_success());
}

#[tokio::test]
async fn token_without_lifetime_uses_fallback() {
    let api = MockApi::new();
    api.push_token(Ok(TokenResponse {
        access_token: "long-lived".to_string(),
        expires_in: None,
    }));
    let coordinator = coordinator(api);

    coordinator.refresh().await.unwrap();
    coordinator.refresh().await.unwrap();

    assert_eq!(coordinator.api().token_calls(), 1);
    assert_eq!(
        coordinator.cached_token().await.unwrap().value(),
        "long-lived"
    );
}

#[tokio::test]
async fn overlapping_refresh_is_skipped() {
    let gate = Arc::new(Notify::new());
    let coordinator = Arc::new(coordinator(MockApi::new().gated(Arc::clone(&gate))));

    let first = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.refresh().await }
    });

    while coordinator.api().departure_calls() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(coordinator.state().phase, TickPhase::Fetching);

    let second = coordinator.refresh().await.unwrap();
    assert_eq!(second, TickOutcome::Skipped);

    gate.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first, TickOutcome::Updated);
    assert_eq!(coordinator.api().departure_calls(), 1);

    // The in-progress flag is released once the tick finishes
    let third = coordinator.refresh().await.unwrap();
    assert_eq!(third, TickOutcome::Updated);
}

#[tokio::test]
async fn abandoned_tick_returns_to_idle() {
    let gate = Arc::new(Notify::new());
    let coordinator = Arc::new(coordinator(MockApi::new().gated(gate)));

    let tick = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.refresh().await }
    });

    while coordinator.api().departure_calls() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(coordinator.state().phase, TickPhase::Fetching);

    tick.abort();
    assert!(tick.await.unwrap_err().is_cancelled());

    let state = coordinator.state();
    assert_eq!(state.phase, TickPhase::Idle);
    assert!(state.snapshot.is_none());

    // The busy flag was released too
    assert_eq!(coordinator.refresh().await.unwrap(), TickOutcome::Updated);
}

#[tokio::test]
async fn subscribers_observe_updates() {
    let coordinator = coordinator(MockApi::new());
    let mut rx = coordinator.subscribe();

    coordinator.refresh().await.unwrap();

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert!(state.last_update_success);
    assert!(state.snapshot.is_some());
}

#[tokio::test]
async fn first_refresh_success() {
    let coordinator = coordinator(MockApi::new());
    assert!(coordinator.first_refresh().await.is_ok());
    assert!(coordinator.last_update_success());
}

#[tokio::test]
async fn first_refresh_auth_failure_is_not_ready() {
    let api = MockApi::new();
    api.push_token(Err(unauthorized()));
    let coordinator = coordinator(api);

    let err = coordinator.first_refresh().await.unwrap_err();
    assert!(matches!(
        err,
        SetupError::NotReady(UpdateError::Token(ref e)) if e.is_auth()
    ));
}
