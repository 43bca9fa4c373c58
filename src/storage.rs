//! Persistent token slot shared by the API client and the session store.
//!
//! DESIGN
//! ======
//! The browser build kept the bearer token in local storage under a fixed key.
//! Natively the same contract is a small JSON key/value file: every write
//! rewrites the file, every read parses it. Storage failures are logged and
//! treated as "no token" so a broken file degrades to an anonymous session
//! instead of aborting the client.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Storage key the token is persisted under.
pub const TOKEN_KEY: &str = "auth_token";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file {path} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single persisted token string.
pub trait TokenStorage: Send + Sync {
    /// Return the persisted token, if any.
    fn load(&self) -> Option<String>;

    /// Persist `token`, replacing any previous value.
    fn store(&self, token: &str);

    /// Remove the persisted token.
    fn clear(&self);
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage; does not survive restarts.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_owned())) }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn store(&self, token: &str) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
    }

    fn clear(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Token persisted as one entry of a JSON object on disk.
///
/// Other keys in the file are preserved across writes.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    key: String,
    write_lock: Mutex<()>,
}

impl FileTokenStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, TOKEN_KEY)
    }

    #[must_use]
    pub fn with_key(path: impl Into<PathBuf>, key: &str) -> Self {
        Self { path: path.into(), key: key.to_owned(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StorageError::Io { path: self.path.clone(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt { path: self.path.clone(), source })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
        }
        let body = serde_json::to_string_pretty(entries)
            .map_err(|source| StorageError::Corrupt { path: self.path.clone(), source })?;
        std::fs::write(&self.path, body).map_err(|source| StorageError::Io { path: self.path.clone(), source })
    }

    fn update(&self, value: Option<&str>) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = self.read_entries().unwrap_or_default();
        match value {
            Some(token) => {
                entries.insert(self.key.clone(), token.to_owned());
            }
            None => {
                if entries.remove(&self.key).is_none() && !self.path.exists() {
                    return Ok(());
                }
            }
        }
        self.write_entries(&entries)
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(&self.key).filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "token storage unreadable; treating as empty");
                None
            }
        }
    }

    fn store(&self, token: &str) {
        if let Err(e) = self.update(Some(token)) {
            tracing::warn!(error = %e, "failed to persist token");
        }
    }

    fn clear(&self) {
        if let Err(e) = self.update(None) {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
    }
}
