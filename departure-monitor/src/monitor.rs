//! Monitor setup and teardown.

use std::sync::Arc;

use tracing::info;

use crate::config::MonitorConfig;
use crate::coordinator::{SchedulerHandle, SetupError, UpdateCoordinator, spawn_scheduler};
use crate::vasttrafik::{DepartureApi, VasttrafikClient};

/// A running monitor: a coordinator plus the task that drives it.
pub struct Monitor<A = VasttrafikClient> {
    coordinator: Arc<UpdateCoordinator<A>>,
    scheduler: SchedulerHandle,
}

impl Monitor<VasttrafikClient> {
    /// Start monitoring the configured stop against the live API.
    pub async fn start(config: &MonitorConfig) -> Result<Self, SetupError> {
        let client = VasttrafikClient::new(config.client.clone()).map_err(SetupError::Client)?;
        Self::start_with(client, config).await
    }
}

impl<A: DepartureApi + 'static> Monitor<A> {
    /// Start monitoring with the given API implementation.
    ///
    /// Runs one refresh before returning. If it fails, nothing is scheduled
    /// and the error is returned.
    pub async fn start_with(api: A, config: &MonitorConfig) -> Result<Self, SetupError> {
        let coordinator = Arc::new(UpdateCoordinator::new(
            api,
            config.credential.clone(),
            config.stop_id.clone(),
            config.token_policy,
        ));

        info!(stop = %config.stop_id, name = %config.stop_name, "starting departure monitor");
        coordinator.first_refresh().await?;

        let scheduler = spawn_scheduler(Arc::clone(&coordinator), config.update_interval);

        Ok(Self {
            coordinator,
            scheduler,
        })
    }

    pub fn coordinator(&self) -> &Arc<UpdateCoordinator<A>> {
        &self.coordinator
    }

    /// Stop scheduling further ticks.
    pub async fn stop(self) {
        self.scheduler.stop().await;
        info!(stop = %self.coordinator.stop_id(), "departure monitor stopped");
    }
}
