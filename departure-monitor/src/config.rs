//! Monitor configuration.
//!
//! Everything the core needs is supplied once, at construction, and never
//! mutated afterwards.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::{Credential, InvalidCredential, InvalidStopId, StopId};
use crate::vasttrafik::{ClientConfig, TokenPolicy};

/// Default refresh interval.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Default address for the status server.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Errors while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error(transparent)]
    Credential(#[from] InvalidCredential),

    #[error(transparent)]
    StopId(#[from] InvalidStopId),

    /// A variable has an unusable value
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Configuration for one monitored stop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// OAuth2 client credential
    pub credential: Credential,
    /// Stop area to monitor
    pub stop_id: StopId,
    /// Human-readable stop name used in summaries
    pub stop_name: String,
    /// HTTP client settings
    pub client: ClientConfig,
    /// Token lifetime handling
    pub token_policy: TokenPolicy,
    /// Time between scheduled refreshes
    pub update_interval: Duration,
    /// Address the status server binds to
    pub listen_addr: SocketAddr,
}

impl MonitorConfig {
    /// Create a config with defaults for everything but the credential and stop.
    pub fn new(credential: Credential, stop_id: StopId) -> Self {
        Self {
            stop_name: stop_id.to_string(),
            credential,
            stop_id,
            client: ClientConfig::default(),
            token_policy: TokenPolicy::default(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }

    /// Set the display name of the stop.
    pub fn with_stop_name(mut self, name: impl Into<String>) -> Self {
        self.stop_name = name.into();
        self
    }

    /// Set HTTP client settings.
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Set token lifetime handling.
    pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    /// Set the refresh interval.
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Set the status server address.
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Read configuration from the process environment.
    ///
    /// Required: `VASTTRAFIK_AUTH_KEY`, `VASTTRAFIK_STOP_ID`.
    /// Optional: `VASTTRAFIK_STOP_NAME`, `VASTTRAFIK_UPDATE_INTERVAL_SECS`,
    /// `VASTTRAFIK_TIMEOUT_SECS`, `DEPARTURE_MONITOR_ADDR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = credential_from_lookup(&lookup)?;

        let stop_id = lookup("VASTTRAFIK_STOP_ID").ok_or(ConfigError::Missing("VASTTRAFIK_STOP_ID"))?;
        let mut config = Self::new(credential, StopId::parse(&stop_id)?);

        if let Some(name) = lookup("VASTTRAFIK_STOP_NAME").filter(|n| !n.trim().is_empty()) {
            config.stop_name = name.trim().to_string();
        }

        if let Some(secs) = parse_secs(&lookup, "VASTTRAFIK_UPDATE_INTERVAL_SECS")? {
            config.update_interval = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_secs(&lookup, "VASTTRAFIK_TIMEOUT_SECS")? {
            config.client.timeout_secs = secs;
        }

        if let Some(addr) = lookup("DEPARTURE_MONITOR_ADDR") {
            config.listen_addr = addr.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "DEPARTURE_MONITOR_ADDR",
                value: addr,
            })?;
        }

        Ok(config)
    }
}

/// Read only the credential (for stop search, which needs no stop id).
pub fn credential_from_env() -> Result<Credential, ConfigError> {
    credential_from_lookup(&|var: &str| std::env::var(var).ok())
}

fn credential_from_lookup<F>(lookup: &F) -> Result<Credential, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let key = lookup("VASTTRAFIK_AUTH_KEY").ok_or(ConfigError::Missing("VASTTRAFIK_AUTH_KEY"))?;
    Ok(Credential::parse(&key)?)
}

/// Parse a positive number of seconds.
fn parse_secs<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(secs)),
        _ => Err(ConfigError::Invalid { var, value }),
    }
}
