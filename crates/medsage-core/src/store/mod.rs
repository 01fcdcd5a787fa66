//! Persistence adapter for the MedSage client core.
//!
//! Browser-style key/value storage behind an explicit, injectable
//! interface: a session-scoped store ([`MemoryStore`]) that dies with the
//! process and a durable store ([`SqliteStore`]) that survives restarts.
//! Components receive a [`Storage`] handle instead of touching ambient
//! state, so tests can substitute a fake with controllable failure modes.
//!
//! All values are JSON text under keys namespaced `medsage:`. Malformed
//! or unreadable data never escapes this layer as an error: it is logged
//! and treated as absent. If multiple writers share one store, the last
//! writer wins; no cross-writer consistency is attempted.

mod memory;
mod session;
mod sqlite;

pub use memory::*;
pub use session::*;
pub use sqlite::*;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Key prefix for every entry the app owns. Bulk clears only touch
/// entries under this prefix.
pub const NAMESPACE: &str = "medsage:";

/// Well-known storage keys.
pub mod keys {
    /// Validated patient record written by intake.
    pub const PATIENT: &str = "patient_record";
    /// Serialized conversation turns.
    pub const CONVERSATION: &str = "conversation_turns";
    /// Prefix for named session blobs saved via [`super::SessionVault`].
    pub const SESSION_PREFIX: &str = "session:";
}

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw key/value store over JSON text. Object-safe so scopes can be
/// swapped behind `Arc<dyn Store>`.
pub trait Store: Send + Sync {
    /// Write serialized JSON under a fully namespaced key.
    fn put(&self, key: &str, json: &str) -> StoreResult<()>;

    /// Read the raw JSON under a key, `None` when absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Remove one entry. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Remove every entry under [`NAMESPACE`], leaving foreign keys alone.
    fn clear_namespace(&self) -> StoreResult<()>;
}

fn full_key(key: &str) -> String {
    format!("{NAMESPACE}{key}")
}

/// Typed view over a shared raw store.
///
/// Serializes values on the way in; on the way out, missing, unreadable,
/// or malformed entries all collapse to `None` with a diagnostic log,
/// never an error the caller must handle.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn Store>,
}

impl Storage {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Serialize and persist a value.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.store.put(&full_key(key), &json)
    }

    /// Load and deserialize a value, treating any read failure as absent.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let key = full_key(key);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "store read failed, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "malformed stored value, treating as absent");
                None
            }
        }
    }

    /// Remove one entry.
    pub fn clear(&self, key: &str) -> StoreResult<()> {
        self.store.remove(&full_key(key))
    }

    /// Remove every app-owned entry.
    pub fn clear_all(&self) -> StoreResult<()> {
        self.store.clear_namespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let storage = Storage::new(Arc::new(MemoryStore::new()));
        storage.save("answer", &42u32).unwrap();
        assert_eq!(storage.load::<u32>("answer"), Some(42));
    }

    #[test]
    fn test_load_absent_is_none() {
        let storage = Storage::new(Arc::new(MemoryStore::new()));
        assert_eq!(storage.load::<u32>("nothing"), None);
    }

    #[test]
    fn test_malformed_value_treated_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store.put(&full_key("broken"), "{not json").unwrap();

        let storage = Storage::new(store);
        assert_eq!(storage.load::<Vec<String>>("broken"), None);
    }

    #[test]
    fn test_read_failure_treated_as_absent() {
        let store = Arc::new(MemoryStore::new());
        let storage = Storage::new(store.clone());
        storage.save("k", &1u32).unwrap();

        store.set_failing(true);
        assert_eq!(storage.load::<u32>("k"), None);
    }

    #[test]
    fn test_clear_removes_entry() {
        let storage = Storage::new(Arc::new(MemoryStore::new()));
        storage.save("k", &"v").unwrap();
        storage.clear("k").unwrap();
        assert_eq!(storage.load::<String>("k"), None);
    }
}
