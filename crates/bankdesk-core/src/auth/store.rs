//! The credential store abstraction and its in-memory implementation.
//!
//! Sharing policy: a store's scope is its profile. Every handle that points at
//! the same backing storage (same file, same keychain service, or clones of the
//! same `MemoryStore`) observes the same session. Writes are last-write-wins
//! with no locking across processes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use super::session::{AccessToken, Credentials, RefreshToken};

/// Storage key for the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Credential store lock poisoned")]
    Poisoned,
}

/// Durable key/value persistence for the current session's tokens.
///
/// Implementations do not validate token shape. `save` overwrites both values,
/// `clear` removes both and succeeds on an already empty store.
pub trait CredentialStore: Send + Sync {
    /// Persist both tokens, replacing whatever was stored before.
    fn save(&self, access: &AccessToken, refresh: &RefreshToken) -> Result<(), StoreError>;

    /// The stored access token, or `None` if never set or cleared.
    fn access_token(&self) -> Result<Option<AccessToken>, StoreError>;

    /// The stored refresh token, or `None` if never set or cleared.
    fn refresh_token(&self) -> Result<Option<RefreshToken>, StoreError>;

    /// Remove both tokens unconditionally.
    fn clear(&self) -> Result<(), StoreError>;

    /// Both tokens, if both are present.
    fn credentials(&self) -> Result<Option<Credentials>, StoreError> {
        match (self.access_token()?, self.refresh_token()?) {
            (Some(access), Some(refresh)) => Ok(Some(Credentials { access, refresh })),
            _ => Ok(None),
        }
    }
}

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<&'static str, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding the given tokens
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(ACCESS_TOKEN_KEY, access.to_string());
        entries.insert(REFRESH_TOKEN_KEY, refresh.to_string());
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }
}

impl CredentialStore for MemoryStore {
    fn save(&self, access: &AccessToken, refresh: &RefreshToken) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(ACCESS_TOKEN_KEY, access.as_str().to_string());
        entries.insert(REFRESH_TOKEN_KEY, refresh.as_str().to_string());
        Ok(())
    }

    fn access_token(&self) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.get(ACCESS_TOKEN_KEY)?.map(AccessToken::new))
    }

    fn refresh_token(&self) -> Result<Option<RefreshToken>, StoreError> {
        Ok(self.get(REFRESH_TOKEN_KEY)?.map(RefreshToken::new))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        Ok(())
    }
}
