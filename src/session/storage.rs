//! Durable mirror of the session state.
//!
//! The session store keeps the authoritative copy in memory and mirrors it
//! here so a restarted process can restore the prior session. The mirror
//! holds exactly two keys, both strings:
//! - `user`: the identity record, JSON-serialized
//! - `token`: the opaque bearer credential
//!
//! ## Design
//! - Single writer (the session store); read back only at initialization
//!   and on explicit `resync`.
//! - Partial or malformed contents load as "no session" — the store never
//!   observes a user without a token or vice versa.
//! - `FileStorage` keeps both keys in one JSON file so they are written
//!   together; `MemoryStorage` backs tests and embedders with their own
//!   persistence.

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw key/value contents of the mirror. Either key may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedSession {
    /// JSON-serialized identity record, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Opaque bearer token, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl PersistedSession {
    /// Whether both keys are present (the only state worth restoring).
    pub fn is_complete(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// Durable key/value mirror for the session store.
pub trait SessionStorage: Send + Sync {
    /// Read the current mirror contents. Absence and corruption both load
    /// as an empty mirror.
    fn load(&self) -> PersistedSession;

    /// Write both keys together.
    fn store(&self, user_json: &str, token: &str) -> Result<()>;

    /// Remove both keys.
    fn clear(&self) -> Result<()>;
}

/// File name used inside the storage directory.
const SESSION_FILE: &str = "session.json";

/// File-backed mirror: one JSON file holding both keys.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Mirror sessions under the given directory (created by the caller).
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILE),
        }
    }

    /// Mirror sessions in the platform data directory
    /// (e.g. `~/.local/share/quackwallet` on Linux).
    ///
    /// Returns `None` when no home directory can be determined or the
    /// directory cannot be created.
    pub fn default_location() -> Option<Self> {
        let dirs = directories::ProjectDirs::from("com", "QuackWallet", "quackwallet")?;
        let dir = dirs.data_dir();
        std::fs::create_dir_all(dir).ok()?;
        Some(Self::new(dir))
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> PersistedSession {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return PersistedSession::default();
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    fn store(&self, user_json: &str, token: &str) -> Result<()> {
        let persisted = PersistedSession {
            user: Some(user_json.to_string()),
            token: Some(token.to_string()),
        };
        std::fs::write(&self.path, serde_json::to_string(&persisted)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory mirror for tests and embedders with external persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<PersistedSession>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> PersistedSession {
        self.contents.lock().clone()
    }

    fn store(&self, user_json: &str, token: &str) -> Result<()> {
        *self.contents.lock() = PersistedSession {
            user: Some(user_json.to_string()),
            token: Some(token.to_string()),
        };
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.contents.lock() = PersistedSession::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());

        storage.store(r#"{"id":"1"}"#, "tok123").unwrap();
        let loaded = storage.load();
        assert_eq!(loaded.user.as_deref(), Some(r#"{"id":"1"}"#));
        assert_eq!(loaded.token.as_deref(), Some("tok123"));
        assert!(loaded.is_complete());
    }

    #[test]
    fn file_storage_missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());

        let loaded = storage.load();
        assert_eq!(loaded, PersistedSession::default());
        assert!(!loaded.is_complete());
    }

    #[test]
    fn file_storage_corrupt_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(SESSION_FILE), "not json {{").unwrap();

        let storage = FileStorage::new(tmp.path());
        assert_eq!(storage.load(), PersistedSession::default());
    }

    #[test]
    fn file_storage_clear_removes_file() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());

        storage.store("{}", "tok").unwrap();
        assert!(tmp.path().join(SESSION_FILE).exists());

        storage.clear().unwrap();
        assert!(!tmp.path().join(SESSION_FILE).exists());

        // Clearing again is a no-op
        storage.clear().unwrap();
    }

    #[test]
    fn partial_contents_are_not_complete() {
        let partial = PersistedSession {
            user: None,
            token: Some("tok".into()),
        };
        assert!(!partial.is_complete());
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        storage.store(r#"{"id":"9"}"#, "t").unwrap();
        assert!(storage.load().is_complete());

        storage.clear().unwrap();
        assert_eq!(storage.load(), PersistedSession::default());
    }
}
