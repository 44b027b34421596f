//! Domain types for the departure monitor.
//!
//! Identifier types enforce their invariants at construction time, so code
//! that receives them can trust their validity. Departure records are plain
//! immutable values produced by the normalizer.

mod credential;
mod departure;
mod stop;

pub use credential::{Credential, InvalidCredential};
pub use departure::{DepartureRecord, Snapshot};
pub use stop::{InvalidStopId, StopId};
