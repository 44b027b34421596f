//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::watch;

use crate::coordinator::CoordinatorState;
use crate::presentation::StopPresenter;

/// Shared application state.
///
/// Handlers only ever read the coordinator's published state.
#[derive(Clone)]
pub struct AppState {
    /// Latest coordinator state
    pub departures: watch::Receiver<CoordinatorState>,

    /// Renders the state for this stop
    pub presenter: Arc<StopPresenter>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(departures: watch::Receiver<CoordinatorState>, presenter: StopPresenter) -> Self {
        Self {
            departures,
            presenter: Arc::new(presenter),
        }
    }

    /// Copy of the current coordinator state.
    pub fn current(&self) -> CoordinatorState {
        self.departures.borrow().clone()
    }
}
