//! The update coordinator.
//!
//! One coordinator serves one stop. Each tick obtains a token (refreshing it
//! only when the cached one has expired), fetches departures, and either
//! publishes a complete new snapshot or records the failure while keeping
//! the previous snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::domain::{Credential, Snapshot, StopId};
use crate::vasttrafik::{AccessToken, DepartureApi, TokenManager, TokenPolicy, convert_departures};

use super::error::{SetupError, UpdateError};
use super::state::{CoordinatorState, TickOutcome, TickPhase};

/// Marks a tick as in progress for as long as it is alive.
///
/// Dropping the guard also returns a published `Fetching` phase to `Idle`,
/// including when the tick's future is dropped mid-flight.
struct TickGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a watch::Sender<CoordinatorState>,
}

impl<'a> TickGuard<'a> {
    fn acquire(flag: &'a AtomicBool, state: &'a watch::Sender<CoordinatorState>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickGuard { flag, state })
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            if s.phase == TickPhase::Fetching {
                s.phase = TickPhase::Idle;
                true
            } else {
                false
            }
        });
        self.flag.store(false, Ordering::Release);
    }
}

/// Fetches departures for one stop and publishes them.
pub struct UpdateCoordinator<A> {
    api: A,
    stop: StopId,
    tokens: Mutex<TokenManager>,
    in_progress: AtomicBool,
    state: watch::Sender<CoordinatorState>,
}

impl<A: DepartureApi> UpdateCoordinator<A> {
    pub fn new(api: A, credential: Credential, stop: StopId, policy: TokenPolicy) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());

        Self {
            api,
            stop,
            tokens: Mutex::new(TokenManager::new(credential, policy)),
            in_progress: AtomicBool::new(false),
            state,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn stop_id(&self) -> &StopId {
        &self.stop
    }

    /// Current published state.
    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    /// Last successfully fetched snapshot.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.borrow().snapshot.clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.state.borrow().last_update_success
    }

    /// The token currently held by the token manager.
    pub async fn cached_token(&self) -> Option<AccessToken> {
        self.tokens.lock().await.cached().cloned()
    }

    /// Run one tick now.
    ///
    /// Returns [`TickOutcome::Skipped`] without doing anything if another
    /// tick is still in flight.
    pub async fn refresh(&self) -> Result<TickOutcome, UpdateError> {
        let Some(_guard) = TickGuard::acquire(&self.in_progress, &self.state) else {
            debug!(stop = %self.stop, "previous tick still running, skipping");
            return Ok(TickOutcome::Skipped);
        };

        self.state.send_modify(|s| {
            s.phase = TickPhase::Fetching;
            s.last_attempt = Some(Utc::now());
        });

        match self.fetch().await {
            Ok(snapshot) => {
                debug!(stop = %self.stop, departures = snapshot.len(), "published new snapshot");
                let snapshot = Arc::new(snapshot);
                self.state.send_modify(|s| {
                    s.phase = TickPhase::Idle;
                    s.snapshot = Some(snapshot);
                    s.last_update_success = true;
                    s.last_error = None;
                });
                Ok(TickOutcome::Updated)
            }
            Err(err) => {
                warn!(stop = %self.stop, error = %err, "update failed");
                let message = err.to_string();
                self.state.send_modify(|s| {
                    s.phase = TickPhase::Idle;
                    s.last_update_success = false;
                    s.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Mandatory first tick during setup.
    ///
    /// Any failure is returned as [`SetupError`] so the caller can refuse to
    /// start.
    pub async fn first_refresh(&self) -> Result<(), SetupError> {
        match self.refresh().await {
            Ok(TickOutcome::Updated) => {
                info!(stop = %self.stop, "initial refresh succeeded");
                Ok(())
            }
            Ok(TickOutcome::Skipped) => Err(SetupError::RefreshInProgress),
            Err(err) => Err(SetupError::NotReady(err)),
        }
    }

    async fn fetch(&self) -> Result<Snapshot, UpdateError> {
        let mut tokens = self.tokens.lock().await;

        let token = tokens
            .get_token(&self.api)
            .await
            .map_err(UpdateError::Token)?;

        match self.api.departures(&token, &self.stop).await {
            Ok(raw) => Ok(Snapshot::new(convert_departures(&raw))),
            Err(err) => {
                // No retry here: the next tick re-authenticates.
                if err.is_auth() {
                    tokens.invalidate();
                    info!(stop = %self.stop, "access token rejected, dropped cached token");
                }
                Err(UpdateError::Departures(err))
            }
        }
    }
}
