//! File-backed session store
//!
//! Persists each key as a small file in an XDG-compliant cache directory
//! (`~/.cache/authwho/session/` on Linux), so the cached session survives
//! process restarts until it is cleared.

use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::warn;

use super::SessionStore;

/// Session store that writes one file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where session entries are stored
    store_dir: PathBuf,
}

impl FileStore {
    /// Creates a new FileStore using an XDG-compliant cache directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home
    /// directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "authwho")?;
        let store_dir = project_dirs.cache_dir().join("session");
        Some(Self { store_dir })
    }

    /// Creates a new FileStore with a custom directory
    ///
    /// Useful for testing or when a specific store location is needed.
    pub fn with_dir(store_dir: PathBuf) -> Self {
        Self { store_dir }
    }

    /// Returns the path of the file holding the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.store_dir.join(key)
    }

    /// Ensures the store directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.store_dir)
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        let result = self
            .ensure_dir()
            .and_then(|_| fs::write(self.entry_path(key), value));
        if let Err(err) = result {
            warn!(key, error = %err, "failed to persist session entry");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(err) = fs::remove_file(self.entry_path(key)) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(key, error = %err, "failed to remove session entry");
            }
        }
    }
}
