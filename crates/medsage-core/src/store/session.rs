//! Named session blobs in durable storage.
//!
//! A general-purpose save/load/clear utility over the durable store. It is
//! not part of the intake → chat → summary flow; hosts use it to stash an
//! arbitrary named JSON snapshot across restarts.

use serde_json::Value;

use super::{keys, Storage, StoreError, StoreResult};

/// Save/load/clear of opaque named JSON blobs.
pub struct SessionVault {
    storage: Storage,
}

impl SessionVault {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    fn blob_key(name: &str) -> String {
        format!("{}{}", keys::SESSION_PREFIX, name)
    }

    /// Save a blob under a name. The payload must be valid JSON; it is
    /// stored as-is otherwise.
    pub fn save(&self, name: &str, json: &str) -> StoreResult<()> {
        let value: Value = serde_json::from_str(json).map_err(StoreError::Json)?;
        self.storage.save(&Self::blob_key(name), &value)
    }

    /// Load a previously saved blob, `None` when absent or unreadable.
    pub fn load(&self, name: &str) -> Option<String> {
        self.storage
            .load::<Value>(&Self::blob_key(name))
            .map(|value| value.to_string())
    }

    /// Remove a named blob.
    pub fn clear(&self, name: &str) -> StoreResult<()> {
        self.storage.clear(&Self::blob_key(name))
    }
}
