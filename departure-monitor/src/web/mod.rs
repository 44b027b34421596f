//! Web layer for the departure monitor.
//!
//! Exposes the presented state of the monitored stop over HTTP.

mod dto;
mod routes;
mod state;

pub use dto::DeparturesResponse;
pub use routes::create_router;
pub use state::AppState;
