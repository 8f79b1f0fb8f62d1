//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend base URL, which credential store to use, and the profile that scopes
//! the stored session.
//!
//! Configuration is stored at `~/.config/bankdesk/config.json`. The
//! `BANKDESK_API_URL`, `BANKDESK_PROFILE` and `BANKDESK_STORAGE` environment
//! variables override the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::{CredentialStore, FileStore, KeyringStore, MemoryStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "bankdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

const DEFAULT_PROFILE: &str = "default";

pub const ENV_API_URL: &str = "BANKDESK_API_URL";
pub const ENV_PROFILE: &str = "BANKDESK_PROFILE";
pub const ENV_STORAGE: &str = "BANKDESK_STORAGE";

/// Where the session tokens are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the per-profile data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Process memory only; the session ends with the process
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!(
                "unknown storage backend '{}', expected file, keyring or memory",
                other
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageBackend::File => "file",
            StorageBackend::Keyring => "keyring",
            StorageBackend::Memory => "memory",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub storage: StorageBackend,
    /// Session sharing scope. Same profile, same session.
    pub profile: String,
    pub request_timeout_secs: u64,
    /// Optional directory for a rolling log file
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage: StorageBackend::default(),
            profile: DEFAULT_PROFILE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Self = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides keyed by environment variable name. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(profile) = lookup(ENV_PROFILE) {
            self.profile = profile;
        }
        if let Some(storage) = lookup(ENV_STORAGE) {
            self.storage = storage
                .parse::<StorageBackend>()
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", ENV_STORAGE, e))?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            bail!(
                "api_base_url must start with http:// or https://, got '{}'",
                self.api_base_url
            );
        }
        validate_profile(&self.profile)?;
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding the file store for this profile
    pub fn credentials_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("profiles").join(&self.profile))
    }

    /// Open the configured credential store
    pub fn open_store(&self) -> Result<Arc<dyn CredentialStore>> {
        validate_profile(&self.profile)?;
        let store: Arc<dyn CredentialStore> = match self.storage {
            StorageBackend::File => Arc::new(FileStore::new(self.credentials_dir()?)),
            StorageBackend::Keyring => {
                if !cfg!(feature = "native-keyring") {
                    bail!("keyring storage needs a build with the native-keyring feature");
                }
                Arc::new(KeyringStore::new(&self.profile)?)
            }
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        debug!(storage = %self.storage, profile = %self.profile, "Credential store opened");
        Ok(store)
    }
}

/// Profiles become directory and keychain service names, so keep them plain.
fn validate_profile(profile: &str) -> Result<()> {
    if profile.is_empty() {
        bail!("profile must not be empty");
    }
    if !profile
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!(
            "profile '{}' may only contain letters, digits, '-' and '_'",
            profile
        );
    }
    Ok(())
}
