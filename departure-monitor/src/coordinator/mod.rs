//! Update coordination.
//!
//! The coordinator owns the access token and the last good snapshot for one
//! stop. A scheduler task drives it on a fixed interval; consumers read the
//! published [`CoordinatorState`] through a watch channel and never write it.

mod error;
mod scheduler;
mod state;
mod update;

#[cfg(test)]
mod update_tests;

pub use error::{SetupError, UpdateError};
pub use scheduler::{SchedulerHandle, spawn_scheduler};
pub use state::{CoordinatorState, TickOutcome, TickPhase};
pub use update::UpdateCoordinator;
