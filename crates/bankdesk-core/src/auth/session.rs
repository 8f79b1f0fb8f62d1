use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::store::CredentialStore;

/// Opaque bearer credential presented on each protected call.
/// Debug output never includes the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Longer-lived credential. Persisted alongside the access token; only the
/// `token-refresh` feature ever sends it to the backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access: AccessToken,
    pub refresh: RefreshToken,
}

/// The local notion of "currently logged in".
///
/// Derived solely from store contents: there is no expiry and no server-side
/// check, so `Authenticated` only means a token is on hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Unauthenticated,
    Authenticated(AccessToken),
}

impl Session {
    /// Read the session from the store. A read failure counts as no session.
    pub fn current(store: &dyn CredentialStore) -> Self {
        match store.access_token() {
            Ok(Some(token)) if !token.is_empty() => Session::Authenticated(token),
            Ok(_) => Session::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "Failed to read access token, treating session as absent");
                Session::Unauthenticated
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// Get the bearer token if a session exists
    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Session::Authenticated(token) => Some(token),
            Session::Unauthenticated => None,
        }
    }
}

/// True iff the store holds a present, non-empty access token.
pub fn is_authenticated(store: &dyn CredentialStore) -> bool {
    Session::current(store).is_authenticated()
}
