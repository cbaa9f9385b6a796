//! Session-scoped persisted storage
//!
//! This module provides the key/value store the session cache persists into,
//! so a cached user survives reconstruction of in-memory state. Writes are
//! fire-and-forget: storage failures are logged and swallowed, never allowed
//! to block the in-memory cache path.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// String key/value store scoped to the current session.
///
/// Implementations must handle errors gracefully without panicking.
pub trait SessionStore: Send + Sync {
    /// Retrieves a stored value for the given key.
    ///
    /// # Returns
    /// * `Some(String)` - The stored value if found
    /// * `None` - If the key doesn't exist or retrieval fails
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value under the given key.
    ///
    /// Storage failures are logged but not returned, to maintain
    /// fire-and-forget semantics.
    fn set(&self, key: &str, value: &str);

    /// Removes the value stored under the given key, if any.
    ///
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str);
}
