use super::TokenStore;
use crate::error::StoreError;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Key the session token is kept under inside the storage file.
pub const STORAGE_KEY: &str = "token";
/// File name used by [`FileTokenStore::in_dir`].
pub const STORAGE_FILE: &str = "storage.json";

/// Key/value storage file holding the token under a fixed key.
///
/// The file is a flat JSON object so other keys written next to the token
/// survive a save or clear.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: STORAGE_KEY.to_string(),
        }
    }

    /// Store backed by `<dir>/storage.json`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STORAGE_FILE))
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    /// Like `load`, but a file that is not a JSON object starts over empty.
    fn load_or_reset(&self) -> Result<Map<String, Value>, StoreError> {
        match self.load() {
            Err(StoreError::Json(err)) => {
                debug!("Resetting unreadable token storage {}: {err}", self.path.display());
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write next to the target and rename so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &SecretString) -> Result<(), StoreError> {
        let mut entries = self.load_or_reset()?;
        entries.insert(
            self.key.clone(),
            Value::String(token.expose_secret().to_string()),
        );
        self.persist(&entries)
    }

    fn read(&self) -> Option<SecretString> {
        let entries = match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Failed to read token storage {}: {err}", self.path.display());
                return None;
            }
        };

        entries
            .get(&self.key)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(|token| SecretString::from(token.to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.load_or_reset()?;

        if entries.remove(&self.key).is_none() {
            return Ok(());
        }

        self.persist(&entries)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
