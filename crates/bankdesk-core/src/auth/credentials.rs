use std::collections::BTreeMap;
use std::sync::Arc;

use keyring::Entry;
use tracing::debug;

use super::session::{AccessToken, RefreshToken};
use super::store::{CredentialStore, StoreError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

const SERVICE_PREFIX: &str = "bankdesk";

/// Keychain account name holding the token pair
const SESSION_ACCOUNT: &str = "session";

/// Keeps tokens in the OS keychain.
///
/// Both tokens live in one entry under the service `bankdesk:<profile>`, so a
/// save replaces the pair in a single write and the profile is the sharing
/// scope just as with [`super::FileStore`]. Only durable when the crate is
/// built with the `native-keyring` feature; otherwise `keyring` falls back to
/// its in-process mock.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    entry: Arc<Entry>,
}

impl KeyringStore {
    pub fn new(profile: &str) -> Result<Self, StoreError> {
        let service = Self::service_name(profile);
        let entry = Entry::new(&service, SESSION_ACCOUNT)?;
        Ok(Self {
            service,
            entry: Arc::new(entry),
        })
    }

    pub fn service_name(profile: &str) -> String {
        format!("{}:{}", SERVICE_PREFIX, profile)
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match self.entry.get_password() {
            Ok(secret) => Ok(serde_json::from_str(&secret)?),
            Err(keyring::Error::NoEntry) => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStore for KeyringStore {
    fn save(&self, access: &AccessToken, refresh: &RefreshToken) -> Result<(), StoreError> {
        let entries = BTreeMap::from([
            (ACCESS_TOKEN_KEY, access.as_str()),
            (REFRESH_TOKEN_KEY, refresh.as_str()),
        ]);
        self.entry.set_password(&serde_json::to_string(&entries)?)?;
        debug!(service = %self.service, "Credentials stored in keychain");
        Ok(())
    }

    fn access_token(&self) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.read()?.remove(ACCESS_TOKEN_KEY).map(AccessToken::new))
    }

    fn refresh_token(&self) -> Result<Option<RefreshToken>, StoreError> {
        Ok(self.read()?.remove(REFRESH_TOKEN_KEY).map(RefreshToken::new))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, "Credentials removed from keychain");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
