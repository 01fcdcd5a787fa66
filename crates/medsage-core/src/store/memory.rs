//! In-memory store: session scope and test fake.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{Store, StoreError, StoreResult, NAMESPACE};

/// Session-scoped store. Entries live as long as the process; nothing
/// survives a restart. Doubles as the test fake: `set_failing` makes
/// every operation return [`StoreError::Unavailable`].
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the injected failure mode.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn put(&self, key: &str, json: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_available()?;
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn clear_namespace(&self) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.retain(|key, _| !key.starts_with(NAMESPACE));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let store = MemoryStore::new();
        store.put("medsage:k", "\"v\"").unwrap();
        assert_eq!(store.get("medsage:k").unwrap(), Some("\"v\"".into()));

        store.remove("medsage:k").unwrap();
        assert_eq!(store.get("medsage:k").unwrap(), None);
    }

    #[test]
    fn test_clear_namespace_leaves_foreign_keys() {
        let store = MemoryStore::new();
        store.put("medsage:mine", "1").unwrap();
        store.put("other_app:theirs", "2").unwrap();

        store.clear_namespace().unwrap();

        assert_eq!(store.get("medsage:mine").unwrap(), None);
        assert_eq!(store.get("other_app:theirs").unwrap(), Some("2".into()));
    }

    #[test]
    fn test_failure_mode() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(store.put("medsage:k", "1").is_err());
        assert!(store.get("medsage:k").is_err());

        store.set_failing(false);
        assert!(store.put("medsage:k", "1").is_ok());
    }
}
