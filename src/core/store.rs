//! Small key-value persistence

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored value is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Computes a replacement from the current value of a key
pub type Change<'a> = dyn FnMut(Option<String>) -> Result<String, StoreError> + 'a;

/// Whole-value reads and writes under string keys
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value. Readers never observe a partially written value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(key, &mut |_| Ok(value.to_string()))
    }

    /// Read, change and write back the value as one step. No other
    /// `update` on the same key, in this process or another, interleaves.
    fn update(&self, key: &str, change: &mut Change<'_>) -> Result<(), StoreError>;
}

/// One file per key inside a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Same directory as the target so the rename stays on one filesystem
    fn write_atomic(&self, path: &Path, value: &str) -> Result<(), StoreError> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(Self::io_error(&self.dir))?;
        tmp.write_all(value.as_bytes()).map_err(Self::io_error(path))?;
        tmp.as_file().sync_all().map_err(Self::io_error(path))?;
        tmp.persist(path).map_err(|e| Self::io_error(path)(e.error))?;
        Ok(())
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path)(e)),
        }
    }

    fn update(&self, key: &str, change: &mut Change<'_>) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(Self::io_error(&self.dir))?;

        // Advisory lock on a sibling file; the value file itself is replaced by rename.
        let lock_path = self.dir.join(format!("{}.lock", key));
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(Self::io_error(&lock_path))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write().map_err(Self::io_error(&lock_path))?;

        let value = change(self.get(key)?)?;
        self.write_atomic(&path, &value)
    }
}

/// Process-local store, used in tests and when no data directory is available
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn update(&self, key: &str, change: &mut Change<'_>) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let value = change(values.get(key).cloned())?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("history").unwrap(), None);
    }

    #[test]
    fn test_file_store_replaces_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.set("history", r#"["a","b"]"#).unwrap();
        store.set("history", r#"["c"]"#).unwrap();

        assert_eq!(store.get("history").unwrap().as_deref(), Some(r#"["c"]"#));
        let mut leftovers: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        leftovers.sort();
        assert_eq!(leftovers, vec!["history.json", "history.lock"]);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.set("../escape", "x"), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_update_sees_current_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("counter", "1").unwrap();

        store
            .update("counter", &mut |current| {
                let n: u32 = current.unwrap_or_default().parse().unwrap();
                Ok((n + 1).to_string())
            })
            .unwrap();

        assert_eq!(store.get("counter").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_failed_change_leaves_value() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();

        let result = store.update("k", &mut |_| Err(StoreError::InvalidKey("k".to_string())));

        assert!(result.is_err());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
