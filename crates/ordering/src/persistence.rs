//! Session persistence.
//!
//! The whole [`OrderSession`] is stored as one JSON record under
//! [`SESSION_KEY`]. Persistence is best-effort: write failures are logged
//! and otherwise ignored, and a missing or corrupt record loads as an empty
//! session.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, warn};

use crate::session::OrderSession;

/// Storage key of the session record. Bump the suffix when the stored
/// shape changes incompatibly.
pub const SESSION_KEY: &str = "order_session_v1";

/// Errors from a [`SessionStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("session could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage is unavailable")]
    Unavailable,
}

/// Durable key/value storage for session records.
pub trait SessionStore: Send + Sync {
    /// Read the record under `key`, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the record under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the storage cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the record under `key`. Deleting a missing record succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Serialize `session` and store it, overwriting the previous record.
///
/// Returns whether the write succeeded. Failures are logged, never raised.
pub fn save(store: &dyn SessionStore, session: &OrderSession) -> bool {
    let result = serde_json::to_string(session)
        .map_err(StoreError::from)
        .and_then(|json| store.write(SESSION_KEY, &json));

    match result {
        Ok(()) => {
            debug!(step = ?session.step, lines = session.cart.lines().len(), "Session saved");
            true
        }
        Err(e) => {
            warn!(error = %e, "Failed to save order session");
            false
        }
    }
}

/// Load the stored session, or an empty one when there is none or it
/// cannot be read.
#[must_use]
pub fn load(store: &dyn SessionStore) -> OrderSession {
    let json = match store.read(SESSION_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return OrderSession::default(),
        Err(e) => {
            warn!(error = %e, "Failed to read order session");
            return OrderSession::default();
        }
    };

    serde_json::from_str(&json).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring corrupt order session record");
        OrderSession::default()
    })
}

// =============================================================================
// FileStore
// =============================================================================

/// Stores each record as `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is then renamed over the record, so a
/// crash mid-write never leaves a truncated session behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store. Can be switched offline to exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
    offline: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

impl SessionStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_online()?;
        let records = self.records.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(records.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut records = self.records.lock().map_err(|_| StoreError::Unavailable)?;
        records.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut records = self.records.lock().map_err(|_| StoreError::Unavailable)?;
        records.remove(key);
        Ok(())
    }
}
