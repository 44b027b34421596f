//! Client credential type.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Error returned when an authentication key is not usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid authentication key: {reason}")]
pub struct InvalidCredential {
    reason: &'static str,
}

/// OAuth2 client credential: base64 of `client_id:client_secret`.
///
/// This is the "authentication key" shown in the Västtrafik developer portal.
/// It is sent verbatim as an HTTP Basic credential when requesting a token.
/// The `Debug` impl never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Parse a base64-encoded authentication key.
    ///
    /// The key must decode to `client_id:client_secret`.
    pub fn parse(auth_key: &str) -> Result<Self, InvalidCredential> {
        let auth_key = auth_key.trim();

        if auth_key.is_empty() {
            return Err(InvalidCredential {
                reason: "must not be empty",
            });
        }

        let decoded = STANDARD.decode(auth_key).map_err(|_| InvalidCredential {
            reason: "not valid base64",
        })?;

        if !decoded.contains(&b':') {
            return Err(InvalidCredential {
                reason: "must encode client_id:client_secret",
            });
        }

        Ok(Credential(auth_key.to_string()))
    }

    /// Build a credential from a client id and secret.
    pub fn from_client(client_id: &str, client_secret: &str) -> Self {
        Credential(STANDARD.encode(format!("{client_id}:{client_secret}")))
    }

    /// Value for the `Authorization` header of a token request.
    pub fn basic_authorization(&self) -> String {
        format!("Basic {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
