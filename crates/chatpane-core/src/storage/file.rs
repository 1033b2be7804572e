use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::store::KeyValueStore;
use crate::error::StorageError;

/// JSON object on disk, rewritten whole on every mutation.
///
/// A missing file reads as an empty store; parent directories are created on
/// first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| StorageError::io("reading", &self.path, e))?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&data).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("creating directory", parent, e))?;
        }
        let data =
            serde_json::to_string_pretty(entries).map_err(|source| StorageError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        std::fs::write(&self.path, data).map_err(|e| StorageError::io("writing", &self.path, e))?;
        debug!(path = %self.path.display(), entries = entries.len(), "store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("nope.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn set_creates_parent_dirs_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("store.json");
        let mut store = FileStore::new(&path);
        store.set("anthropic_api_key", "sk-ant-api-123").unwrap();

        assert!(path.exists());
        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("anthropic_api_key").unwrap().as_deref(),
            Some("sk-ant-api-123")
        );
    }

    #[test]
    fn value_is_stored_in_plaintext() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.json");
        let mut store = FileStore::new(&path);
        store.set("anthropic_api_key", "sk-ant-api-visible").unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("sk-ant-api-visible"));
    }

    #[test]
    fn delete_keeps_other_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(tmp.path().join("store.json"));
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn delete_without_file_does_not_create_it() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.json");
        let mut store = FileStore::new(&path);
        store.delete("a").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.get("a"), Err(StorageError::Parse { .. })));
    }
}
