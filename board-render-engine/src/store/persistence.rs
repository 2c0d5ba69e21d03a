//! Key-value persistence for the task list and filter.
//!
//! Storage failures never surface to the user: writes that fail are logged
//! and dropped, unreadable payloads load as empty.

use std::fs;
use std::path::PathBuf;

use super::StoreError;

/// Fixed storage keys.
pub const TASKS_KEY: &str = "board-tasks";
pub const FILTER_KEY: &str = "board-filter";

/// String key-value storage the store persists through. Implementations must
/// treat `read` of a missing key as `None`, not an error.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One file per key under a data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Storage rooted at the platform data directory, falling back to the
    /// working directory when none is available.
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("board-render-engine");
        Self::new(dir)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        fs::write(self.path_for(key), value)
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }
}

/// In-memory storage for tests and headless runs.
#[derive(Default)]
pub struct MemoryStorage {
    entries: std::collections::HashMap<String, String>,
    /// Number of successful writes, so tests can assert persistence activity.
    pub write_count: usize,
}

impl MemoryStorage {
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.entries.insert(key.to_owned(), value.to_owned());
        storage
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.write_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().to_path_buf());
        assert_eq!(storage.read(TASKS_KEY), None);
        storage.write(TASKS_KEY, "[]").unwrap();
        assert_eq!(storage.read(TASKS_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn memory_storage_counts_writes() {
        let mut storage = MemoryStorage::default();
        storage.write(FILTER_KEY, "done").unwrap();
        storage.write(FILTER_KEY, "all").unwrap();
        assert_eq!(storage.write_count, 2);
        assert_eq!(storage.read(FILTER_KEY).as_deref(), Some("all"));
    }
}
