//! Periodic driver for the update coordinator.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::vasttrafik::DepartureApi;

use super::state::TickOutcome;
use super::update::UpdateCoordinator;

/// Handle to a running scheduler task.
///
/// Dropping the handle also stops the scheduler after its current tick.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop scheduling ticks.
    ///
    /// A tick that is already running is allowed to finish.
    pub async fn stop(self) {
        self.shutdown.send_replace(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "scheduler task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a task that refreshes `coordinator` every `every`.
///
/// The first tick happens one interval from now; the setup code has already
/// run the initial refresh.
pub fn spawn_scheduler<A>(coordinator: Arc<UpdateCoordinator<A>>, every: Duration) -> SchedulerHandle
where
    A: DepartureApi + 'static,
{
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // First tick is immediate, skip it

        info!(stop = %coordinator.stop_id(), every = ?every, "scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown_rx.changed() => break,
            }

            match coordinator.refresh().await {
                Ok(TickOutcome::Updated) => {}
                Ok(TickOutcome::Skipped) => debug!("tick skipped"),
                // Already logged by the coordinator; the next tick retries.
                Err(_) => {}
            }
        }

        info!(stop = %coordinator.stop_id(), "scheduler stopped");
    });

    SchedulerHandle { shutdown, task }
}
