//! In-memory session store
//!
//! Used as a test double and as the degraded fallback when no store
//! directory can be determined. Entries live only as long as the process.

use std::collections::HashMap;
use std::sync::Mutex;

use super::SessionStore;

/// Session store backed by a plain in-memory map
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates a new, empty MemoryStore
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_roundtrip() {
        let store = MemoryStore::new();

        store.set("key", "value");

        assert_eq!(store.get("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let store = MemoryStore::new();

        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_remove_deletes_entry() {
        let store = MemoryStore::new();

        store.set("key", "value");
        store.remove("key");

        assert!(store.get("key").is_none());
    }

    #[test]
    fn test_remove_missing_key_is_silent() {
        let store = MemoryStore::new();

        store.remove("never_written");
    }
}
