//! OAuth2 access token caching.
//!
//! The manager holds at most one bearer token. A cached token is reused until
//! its (buffered) expiry; after that, or after [`TokenManager::invalidate`],
//! the next request performs a fresh client-credentials exchange.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace};

use crate::domain::Credential;

use super::api::DepartureApi;
use super::error::ApiError;
use super::types::TokenResponse;

/// Lifetime assumed when the token response has no `expires_in`.
pub const DEFAULT_FALLBACK_LIFETIME_SECS: i64 = 86_400;

/// Subtracted from the reported lifetime so tokens are renewed early.
pub const DEFAULT_EXPIRY_BUFFER_SECS: i64 = 300;

/// A bearer token and the instant after which it must not be reused.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A token is valid strictly before its expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// How token lifetimes are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Lifetime used when the server does not report one.
    pub fallback_lifetime_secs: i64,
    /// Safety margin subtracted from the lifetime.
    pub expiry_buffer_secs: i64,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            fallback_lifetime_secs: DEFAULT_FALLBACK_LIFETIME_SECS,
            expiry_buffer_secs: DEFAULT_EXPIRY_BUFFER_SECS,
        }
    }
}

impl TokenPolicy {
    /// Turn a token response received at `now` into a cached token.
    pub fn issue(&self, response: TokenResponse, now: DateTime<Utc>) -> AccessToken {
        let lifetime = response.expires_in.unwrap_or(self.fallback_lifetime_secs);
        let usable = lifetime.saturating_sub(self.expiry_buffer_secs);

        let expires_at = TimeDelta::try_seconds(usable)
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(if usable > 0 {
                DateTime::<Utc>::MAX_UTC
            } else {
                now
            });

        AccessToken::new(response.access_token, expires_at)
    }
}

/// Owns the cached token for one credential.
pub struct TokenManager {
    credential: Credential,
    policy: TokenPolicy,
    cached: Option<AccessToken>,
}

impl TokenManager {
    pub fn new(credential: Credential, policy: TokenPolicy) -> Self {
        Self {
            credential,
            policy,
            cached: None,
        }
    }

    /// The currently cached token, valid or not.
    pub fn cached(&self) -> Option<&AccessToken> {
        self.cached.as_ref()
    }

    /// Return a valid token, requesting a new one if needed.
    pub async fn get_token<A: DepartureApi>(&mut self, api: &A) -> Result<AccessToken, ApiError> {
        self.get_token_at(api, Utc::now()).await
    }

    /// Like [`get_token`](Self::get_token) with an explicit clock reading.
    ///
    /// On failure the cache is left as it was.
    pub async fn get_token_at<A: DepartureApi>(
        &mut self,
        api: &A,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, ApiError> {
        if let Some(token) = &self.cached
            && token.is_valid_at(now)
        {
            trace!(expires_at = %token.expires_at, "reusing cached access token");
            return Ok(token.clone());
        }

        let response = api.request_token(&self.credential).await?;
        let expires_in = response.expires_in;
        let token = self.policy.issue(response, now);

        debug!(
            expires_in = ?expires_in,
            expires_at = %token.expires_at,
            "obtained new access token"
        );

        self.cached = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token unconditionally.
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            debug!("invalidated cached access token");
        }
    }
}
