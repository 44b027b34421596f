//! Västtrafik departure monitor.
//!
//! Polls the Planera Resa v4 API for upcoming departures at one stop area,
//! keeps the OAuth2 access token fresh, and publishes a snapshot of
//! normalized departures on a fixed schedule.

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod monitor;
pub mod presentation;
pub mod vasttrafik;
pub mod web;
