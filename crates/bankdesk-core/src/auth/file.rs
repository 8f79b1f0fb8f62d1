use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::session::{AccessToken, RefreshToken};
use super::store::{CredentialStore, StoreError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Credential file name inside the profile directory
const CREDENTIALS_FILE: &str = "credentials.json";

/// Stores tokens as a small JSON object on disk so the session survives restarts.
///
/// The file lives in a per-profile directory; every process pointed at that
/// directory shares the session.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store keeping its file in `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(CREDENTIALS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, entries: &BTreeMap<&str, &str>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) => parent,
            None => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let contents = serde_json::to_string_pretty(entries)?;

        // Each writer gets its own owner-only temp file, renamed over the old
        // file so readers never see a half-written one
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn save(&self, access: &AccessToken, refresh: &RefreshToken) -> Result<(), StoreError> {
        let entries = BTreeMap::from([
            (ACCESS_TOKEN_KEY, access.as_str()),
            (REFRESH_TOKEN_KEY, refresh.as_str()),
        ]);
        self.write(&entries)?;
        debug!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }

    fn access_token(&self) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.read()?.remove(ACCESS_TOKEN_KEY).map(AccessToken::new))
    }

    fn refresh_token(&self) -> Result<Option<RefreshToken>, StoreError> {
        Ok(self.read()?.remove(REFRESH_TOKEN_KEY).map(RefreshToken::new))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Credentials cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
